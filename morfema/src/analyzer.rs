//! 形態素解析器
//!
//! このモジュールは、辞書とヒューリスティックユニットの列を束ねた
//! 解析パイプラインを提供します。単語はまず辞書で検索され、
//! 辞書が1件でも解釈を返した場合はその結果だけが返されます。
//! 辞書が空の場合、設定された順序でユニットが呼び出され、
//! 終端ユニットが結果を生成した時点でパイプラインは停止します。

use std::env;
use std::path::{Path, PathBuf};

use hashbrown::HashSet;

use crate::dictionary::{Dictionary, LoadMode};
use crate::errors::{MorfemaError, Result};
use crate::parse::{BoundParse, MethodKind, Parse, TagId};
use crate::units::{
    AnalyzerUnit, HyphenSeparatedParticleAnalyzer, HyphenatedWordsAnalyzer, KnownPrefixAnalyzer,
    KnownSuffixAnalyzer, LatinAnalyzer, PunctuationAnalyzer, SeenParses, SeenTags,
    UnknownPrefixAnalyzer,
};

/// 辞書バンドルのパスを指定する環境変数
pub const DICT_PATH_ENV: &str = "MORFEMA_DICT_PATH";

/// ローカルデータディレクトリ配下の既定のバンドル名
const DEFAULT_DICT_FILE: &str = "dict.bin";

/// 形状認識ユニットが参照するサービスタグのID
pub(crate) struct ServiceTags {
    pub(crate) pnct: TagId,
    pub(crate) latn: TagId,
    pub(crate) numb_intg: TagId,
    pub(crate) numb_real: TagId,
}

impl ServiceTags {
    fn resolve(dict: &Dictionary) -> Result<Self> {
        let find = |raw: &str| {
            dict.tag_set().find(raw).ok_or_else(|| {
                MorfemaError::invalid_format(
                    "dictionary",
                    format!("the service tag {raw:?} is missing from the tag table"),
                )
            })
        };
        Ok(Self {
            pnct: find("PNCT")?,
            latn: find("LATN")?,
            numb_intg: find("NUMB,intg")?,
            numb_real: find("NUMB,real")?,
        })
    }
}

/// 辞書とヒューリスティックユニットを束ねた形態素解析器
///
/// # 例
///
/// ```
/// use morfema::{Dictionary, DictionaryBuilder, MorphAnalyzer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = DictionaryBuilder::from_readers(
///     "NOUN,inan femn sing,nomn\nNOUN,inan femn plur,nomn".as_bytes(),
///     "POST,\nNOUN,POST".as_bytes(),
///     ",0,а;,1,и".as_bytes(),
///     "книг,0".as_bytes(),
///     None::<&[u8]>,
///     "demo",
/// )?;
/// let morph = MorphAnalyzer::from_dictionary(Dictionary::from_data(data))?;
///
/// let parses = morph.parse("книга");
/// assert_eq!(parses.len(), 1);
/// assert_eq!(parses[0].normal_form, "книга");
/// # Ok(())
/// # }
/// ```
pub struct MorphAnalyzer {
    dict: Dictionary,
    units: Vec<Box<dyn AnalyzerUnit>>,
    service: ServiceTags,
}

impl MorphAnalyzer {
    /// 既定の場所から辞書を読み込んで解析器を作成します。
    ///
    /// パスは環境変数[`DICT_PATH_ENV`]、次にローカルデータ
    /// ディレクトリの順で解決されます。
    ///
    /// # エラー
    ///
    /// パスが解決できない場合、または辞書の読み込みに失敗した場合に
    /// エラーを返します。
    pub fn new(mode: LoadMode) -> Result<Self> {
        Self::from_path(Self::resolve_path()?, mode)
    }

    /// ファイルパスから辞書を読み込んで解析器を作成します。
    pub fn from_path<P>(path: P, mode: LoadMode) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::from_dictionary(Dictionary::from_path(path, mode)?)
    }

    /// 読み込み済みの辞書から既定のユニット構成で解析器を作成します。
    pub fn from_dictionary(dict: Dictionary) -> Result<Self> {
        Self::with_units(dict, Self::default_units())
    }

    /// ユニット構成を指定して解析器を作成します。
    ///
    /// ユニットの順序と終端フラグはパイプラインの動作を決定します。
    /// 通常は[`MorphAnalyzer::default_units`]を使用してください。
    ///
    /// # エラー
    ///
    /// 同じ種類のユニットが複数含まれる場合にエラーを返します。
    /// レキシーム・正規形の再計算は導出チェーンの種類で生成元を
    /// 特定するため、種類はユニットごとに一意である必要があります。
    pub fn with_units(dict: Dictionary, units: Vec<Box<dyn AnalyzerUnit>>) -> Result<Self> {
        for (i, unit) in units.iter().enumerate() {
            if units[..i].iter().any(|u| u.kind() == unit.kind()) {
                return Err(MorfemaError::invalid_argument(
                    "units",
                    format!("more than one unit is registered for {:?}", unit.kind()),
                ));
            }
        }
        let service = ServiceTags::resolve(&dict)?;
        Ok(Self {
            dict,
            units,
            service,
        })
    }

    /// 既定のユニット構成を返します。
    ///
    /// 特異性の高い順に並んでいます。形状認識とハイフン処理は終端、
    /// 接辞推測は非終端です。
    pub fn default_units() -> Vec<Box<dyn AnalyzerUnit>> {
        vec![
            Box::new(PunctuationAnalyzer::default()),
            Box::new(LatinAnalyzer::default()),
            Box::new(HyphenSeparatedParticleAnalyzer::default()),
            Box::new(HyphenatedWordsAnalyzer::default()),
            Box::new(KnownPrefixAnalyzer::default()),
            Box::new(UnknownPrefixAnalyzer::default()),
            Box::new(KnownSuffixAnalyzer::default()),
        ]
    }

    fn resolve_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(DICT_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        if let Some(dir) = dirs::data_local_dir() {
            let path = dir.join("morfema").join(DEFAULT_DICT_FILE);
            if path.exists() {
                return Ok(path);
            }
        }
        Err(MorfemaError::configuration(format!(
            "no dictionary found: pass a path explicitly, set {DICT_PATH_ENV}, \
             or install a bundle into the local data directory"
        )))
    }

    /// この解析器が使用する辞書を取得します。
    #[inline(always)]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    #[inline(always)]
    pub(crate) fn service_tags(&self) -> &ServiceTags {
        &self.service
    }

    /// 単語を解析し、可能な解釈をすべて返します。
    ///
    /// 辞書が解釈を返した場合はそれがそのまま結果になります。
    /// 辞書の結果とヒューリスティックの結果が混ざることはありません。
    /// どのユニットも解釈を生成しなかった場合は空のベクターを
    /// 返します。これはエラーではありません。
    pub fn parse(&self, word: &str) -> Vec<Parse> {
        let res = self.dict.parse(word);
        if !res.is_empty() {
            return res;
        }
        let mut res = vec![];
        let mut seen = SeenParses::default();
        for unit in &self.units {
            let produced = unit.parse(self, word, &mut seen);
            let stop = !produced.is_empty() && unit.is_terminal();
            res.extend(produced);
            if stop {
                break;
            }
        }
        res
    }

    /// 単語の可能なタグをすべて返します。
    ///
    /// [`MorphAnalyzer::parse`]と同じ制御フローで、表層形と正規形の
    /// 再構築を省略した高速パスです。
    pub fn tag(&self, word: &str) -> Vec<TagId> {
        let res = self.dict.tag(word);
        if !res.is_empty() {
            return res;
        }
        let mut res = vec![];
        let mut seen = SeenTags::default();
        for unit in &self.units {
            let produced = unit.tag(self, word, &mut seen);
            let stop = !produced.is_empty() && unit.is_terminal();
            res.extend(produced);
            if stop {
                break;
            }
        }
        res
    }

    /// 単語の正規形を初出順・重複なしで返します。
    pub fn normal_forms(&self, word: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.parse(word)
            .into_iter()
            .filter(|p| seen.insert(p.normal_form.clone()))
            .map(|p| p.normal_form)
            .collect()
    }

    /// 解釈が属するレキシーム(全活用形)を取得します。
    ///
    /// 導出チェーンの最後のステップの生成元へ委譲します。
    ///
    /// # エラー
    ///
    /// チェーンが空の場合、または生成元のユニットがこの解析器に
    /// 設定されていない場合にエラーを返します。
    pub fn get_lexeme(&self, form: &Parse) -> Result<Vec<Parse>> {
        match self.owner_kind(form)? {
            MethodKind::Dictionary => self.dict.get_lexeme(form),
            kind => self.unit_for(kind)?.get_lexeme(self, form),
        }
    }

    /// 解釈を正規形(スロット0)の解釈へ変換します。
    pub fn normalized(&self, form: &Parse) -> Result<Parse> {
        match self.owner_kind(form)? {
            MethodKind::Dictionary => Ok(self.dict.normalized(form)),
            kind => self.unit_for(kind)?.normalized(self, form),
        }
    }

    /// 解釈を要求されたグラメーム集合へ屈折させます。
    ///
    /// 解釈のタグに要求を上書き適用したグラメーム集合を計算し、
    /// レキシーム内で要求をすべて含む候補のうち、上書き後の集合との
    /// 共通部分が最大のものを返します。同点の場合はスロット番号の
    /// 小さい候補が選ばれます。条件を満たす候補がなければ`None`を
    /// 返します。
    pub fn inflect(&self, form: &Parse, required: &HashSet<String>) -> Result<Option<Parse>> {
        let tag = self.dict.tag_set().get(form.tag_id);
        let grammemes = self.dict.tag_set().updated_grammemes(tag, required);
        let mut best: Option<(usize, Parse)> = None;
        for candidate in self.get_lexeme(form)? {
            let ctag = self.dict.tag_set().get(candidate.tag_id);
            if !ctag.contains_all(required) {
                continue;
            }
            let score = ctag.grammemes().intersection(&grammemes).count();
            // 同点では先に現れたスロットを保持する
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, candidate));
            }
        }
        Ok(best.map(|(_, p)| p))
    }

    /// 単語が辞書に登録されているかを判定します。
    #[inline(always)]
    pub fn word_is_known(&self, word: &str, strict: bool) -> bool {
        self.dict.word_is_known(word, strict)
    }

    /// 指定された接頭辞で始まる既知語の解釈を列挙します。
    #[inline(always)]
    pub fn iter_known_parses<'a>(&'a self, prefix: &str) -> impl Iterator<Item = Parse> + 'a {
        self.dict.iter_known_parses(prefix)
    }

    /// 解釈をこの解析器に束縛したリッチな値に変換します。
    #[inline(always)]
    pub fn bind(&self, parse: Parse) -> BoundParse<'_> {
        BoundParse::new(self, parse)
    }

    /// 単語を解析し、束縛済みの解釈を返します。
    pub fn parse_bound(&self, word: &str) -> Vec<BoundParse<'_>> {
        self.parse(word)
            .into_iter()
            .map(|p| BoundParse::new(self, p))
            .collect()
    }

    fn owner_kind(&self, form: &Parse) -> Result<MethodKind> {
        form.last_method().map(|step| step.kind).ok_or_else(|| {
            MorfemaError::invalid_state(
                "cannot recompute the parse",
                "the derivation chain of this parse is empty",
            )
        })
    }

    fn unit_for(&self, kind: MethodKind) -> Result<&dyn AnalyzerUnit> {
        self.units
            .iter()
            .map(|u| u.as_ref())
            .find(|u| u.kind() == kind)
            .ok_or_else(|| {
                MorfemaError::invalid_state(
                    "cannot recompute the parse",
                    format!("no configured unit handles {kind:?}"),
                )
            })
    }
}
