//! 形態素解析のための辞書モジュール
//!
//! このモジュールは、パラダイム圧縮された辞書バンドルの読み込み・
//! 書き出し・検索を行います。主な機能として以下を提供します:
//!
//! - rkyvアーカイブによるバイナリバンドルの読み書き
//! - 語彙ストアと組み合わせた単語レベルの解析操作
//! - 綴り補正（е→ё）を伴う近似一致検索
//! - レキシーム展開と正規形の再構築
//!
//! # 辞書の読み込み方法
//!
//! - [`Dictionary::from_path`]: ファイルパスから辞書を読み込む(推奨)
//! - [`Dictionary::read`]: リーダーから辞書を読み込む
//! - [`Dictionary::from_data`]: 構築済みの[`DictionaryData`]から作成する
//!
//! # 辞書のビルド
//!
//! [`DictionaryBuilder`]を使用して、プレーンテキストのソーステーブルから
//! 辞書を構築できます。

pub mod builder;
pub mod paradigm;
pub mod tag;
pub mod words;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use hashbrown::HashMap;
use memmap2::Mmap;
use rkyv::util::AlignedVec;
use rkyv::{access, access_unchecked, Archive, Deserialize, Serialize};

use crate::dictionary::paradigm::{ParadigmSet, ParadigmSlot};
use crate::dictionary::tag::{GrammemeLink, TagSet};
use crate::dictionary::words::{PredictionSuffixes, SubstitutionRules, WordMap};
use crate::errors::{MorfemaError, Result};
use crate::parse::{DerivationStep, MethodKind, ParadigmLoc, Parse, TagId};

pub use crate::dictionary::builder::DictionaryBuilder;

/// Morfema辞書バンドルを識別するマジックバイト
///
/// 末尾の"1"はバンドルフォーマットのバージョンを示しており、
/// クレートのセマンティックバージョンからは切り離されています。
pub const DICT_MAGIC: &[u8] = b"MorfemaDict 1\n";

const DICT_MAGIC_LEN: usize = DICT_MAGIC.len();
const RKYV_ALIGNMENT: usize = 16;
const PADDING_LEN: usize = (RKYV_ALIGNMENT - (DICT_MAGIC_LEN % RKYV_ALIGNMENT)) % RKYV_ALIGNMENT;
const DATA_START: usize = DICT_MAGIC_LEN + PADDING_LEN;

/// 辞書由来の解釈の信頼度
pub(crate) const DICTIONARY_ESTIMATE: f64 = 1.0;

/// 辞書の読み込みモード
///
/// バンドルを読み込む際の検証戦略を指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// 読み込み時にアーカイブの完全な検証を実行します(最も安全)。
    Validate,

    /// 検証をスキップします。
    ///
    /// 自分で構築した信頼できるバンドルに対してのみ使用してください。
    Unchecked,
}

/// 辞書バンドルのメタデータ
#[derive(Archive, Serialize, Deserialize, Clone, Debug)]
pub struct Meta {
    /// バンドルフォーマットのバージョン
    pub format_version: String,

    /// ソースコーパスのリビジョン
    pub source_revision: String,

    /// ビルド時刻(Unixエポック秒の文字列)
    pub compiled_at: String,
}

/// 辞書のすべてのテーブルを保持するデータ
///
/// バンドルにシリアライズされる単位です。起動時に一度だけ読み込まれ、
/// 以後プロセスの生存期間中は不変です。
#[derive(Archive, Serialize, Deserialize)]
pub struct DictionaryData {
    pub(crate) meta: Meta,
    pub(crate) gramtab: Vec<String>,
    pub(crate) grammemes: Vec<GrammemeLink>,
    pub(crate) paradigms: ParadigmSet,
    pub(crate) words: WordMap,
    pub(crate) prediction_prefixes: Vec<String>,
    pub(crate) prediction_suffixes: PredictionSuffixes,
}

impl DictionaryData {
    /// 辞書データを`rkyv`フォーマットを使用してライターにシリアライズします。
    ///
    /// この関数の出力バイナリは、[`Dictionary::from_path`]などの
    /// 読み込みメソッドが期待する形式です。
    ///
    /// # エラー
    ///
    /// ライターへの書き込みまたはシリアライゼーションに失敗した場合に
    /// エラーを返します。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(DICT_MAGIC)?;
        let padding = [0xFFu8; PADDING_LEN];
        wtr.write_all(&padding)?;
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(self)?;
        wtr.write_all(&bytes)?;
        Ok(())
    }
}

/// 単語レベルの解析操作を提供する読み取り専用の辞書
///
/// 語彙ストア、パラダイムストア、タグテーブルを組み合わせて、
/// 既知語に対する`parse`/`tag`/レキシーム/正規形の操作を提供します。
pub struct Dictionary {
    data: DictionaryData,
    tags: TagSet,
    substitutions: SubstitutionRules,
}

impl Dictionary {
    /// 構築済みの[`DictionaryData`]から辞書を作成します。
    pub fn from_data(data: DictionaryData) -> Self {
        let tags = TagSet::from_tables(&data.gramtab, &data.grammemes);
        Self {
            data,
            tags,
            substitutions: SubstitutionRules::yo(),
        }
    }

    /// ファイルパスから辞書を読み込みます。
    ///
    /// ファイルはメモリマップされ、マジックバイトの確認後に
    /// アーカイブが検証・デシリアライズされます。
    ///
    /// # エラー
    ///
    /// パスがディレクトリの場合、マジックバイトが一致しない場合、
    /// またはアーカイブの検証に失敗した場合にエラーを返します。
    pub fn from_path<P>(path: P, mode: LoadMode) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(MorfemaError::PathIsDirectory(path.to_path_buf()));
        }
        log::info!("Loading a dictionary from {}", path.display());
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let dict = Self::from_bytes(&mmap, mode)?;
        log::info!(
            "format: {}, revision: {}, compiled: {}",
            dict.meta().format_version,
            dict.meta().source_revision,
            dict.meta().compiled_at,
        );
        Ok(dict)
    }

    /// リーダーから辞書を読み込みます。
    ///
    /// 読み込んだバイト列は常に検証されます。
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut buf = vec![];
        rdr.read_to_end(&mut buf)?;
        Self::from_bytes(&buf, LoadMode::Validate)
    }

    fn from_bytes(bytes: &[u8], mode: LoadMode) -> Result<Self> {
        if bytes.len() < DATA_START || &bytes[..DICT_MAGIC_LEN] != DICT_MAGIC {
            return Err(MorfemaError::invalid_format(
                "dictionary",
                "unrecognized dictionary bundle: magic bytes do not match",
            ));
        }
        // rkyvのアーカイブは16バイト境界に揃っている必要があるため、
        // マジックの後のデータをアライメント済みバッファへ移す
        let mut aligned = AlignedVec::<RKYV_ALIGNMENT>::with_capacity(bytes.len() - DATA_START);
        aligned.extend_from_slice(&bytes[DATA_START..]);
        let archived = match mode {
            LoadMode::Validate => {
                access::<ArchivedDictionaryData, rkyv::rancor::Error>(&aligned)?
            }
            LoadMode::Unchecked => unsafe { access_unchecked::<ArchivedDictionaryData>(&aligned) },
        };
        let data =
            rkyv::deserialize::<DictionaryData, rkyv::rancor::Error>(archived)?;
        Ok(Self::from_data(data))
    }

    /// バンドルのメタデータを取得します。
    #[inline(always)]
    pub fn meta(&self) -> &Meta {
        &self.data.meta
    }

    /// タグテーブルを取得します。
    #[inline(always)]
    pub fn tag_set(&self) -> &TagSet {
        &self.tags
    }

    /// パラダイムストアを取得します。
    #[inline(always)]
    pub fn paradigms(&self) -> &ParadigmSet {
        &self.data.paradigms
    }

    /// 近似一致検索に使用される置換規則を取得します。
    #[inline(always)]
    pub fn substitution_rules(&self) -> &SubstitutionRules {
        &self.substitutions
    }

    /// 既知接頭辞のテーブルを取得します。
    #[inline(always)]
    pub(crate) fn prediction_prefixes(&self) -> &[String] {
        &self.data.prediction_prefixes
    }

    /// 接尾辞予測テーブルを取得します。
    #[inline(always)]
    pub(crate) fn prediction_suffixes(&self) -> &PredictionSuffixes {
        &self.data.prediction_suffixes
    }

    /// 指定されたパラダイムの全スロットを復号します。
    pub fn paradigm_info(&self, para_id: u16) -> Vec<ParadigmSlot<'_>> {
        self.data.paradigms.paradigm_info(para_id)
    }

    // ======== 単語レベルの解析操作 ========

    /// この辞書を使用して単語を解析します。
    ///
    /// 置換規則を適用した近似一致検索を行い、到達可能な各綴りの
    /// 各`(パラダイムID, スロット番号)`について解釈を生成します。
    /// 正規形は呼び出しごとのメモでパラダイム単位に一度だけ計算され、
    /// 同じパラダイムを共有する解釈の間で値が完全に一致します。
    pub fn parse(&self, word: &str) -> Vec<Parse> {
        let mut res = vec![];
        // パラダイムIDをキーとする正規形のメモ。この呼び出し内のみで
        // 有効であり、呼び出しをまたいで保持されることはない
        let mut normal_forms: HashMap<u16, String> = HashMap::new();
        for (fixed_word, values) in self.data.words.similar_items(word, &self.substitutions) {
            for value in values {
                let loc = ParadigmLoc::unpack(value);
                let normal_form = normal_forms
                    .entry(loc.para_id)
                    .or_insert_with(|| {
                        self.data
                            .paradigms
                            .normal_form(loc.para_id, loc.idx, &fixed_word)
                    })
                    .clone();
                res.push(Parse {
                    word: fixed_word.clone(),
                    tag_id: self.data.paradigms.tag_id_at(loc.para_id, loc.idx),
                    normal_form,
                    para: Some(loc),
                    estimate: DICTIONARY_ESTIMATE,
                    methods: vec![DerivationStep::new(MethodKind::Dictionary, fixed_word.clone())],
                });
            }
        }
        res
    }

    /// この辞書を使用して単語のタグのみを取得します。
    ///
    /// 表層形と正規形の再構築を省略した、割り当ての少ない高速パスです。
    pub fn tag(&self, word: &str) -> Vec<TagId> {
        let mut res = vec![];
        for values in self
            .data
            .words
            .similar_item_values(word, &self.substitutions)
        {
            for value in values {
                let loc = ParadigmLoc::unpack(value);
                res.push(self.data.paradigms.tag_id_at(loc.para_id, loc.idx));
            }
        }
        res
    }

    /// 解釈が属するレキシーム(全活用形)を取得します。
    ///
    /// 導出チェーンがこの辞書に所有されている(単一の辞書ステップである)
    /// 解釈のみを受け付けます。レキシーム展開は純粋な射影であり、
    /// 導出ステップを追加しません。
    ///
    /// # エラー
    ///
    /// 導出チェーンが別のコンポーネントに属する場合、契約違反として
    /// エラーを返します。
    pub fn get_lexeme(&self, form: &Parse) -> Result<Vec<Parse>> {
        let owned = match form.methods.as_slice() {
            [] => true,
            [step] => step.kind == MethodKind::Dictionary,
            _ => false,
        };
        if !owned {
            return Err(MorfemaError::invalid_state(
                "cannot expand the lexeme",
                "the derivation chain of this parse is not owned by the dictionary",
            ));
        }
        let loc = form.para.ok_or_else(|| {
            MorfemaError::invalid_state(
                "cannot expand the lexeme",
                "this parse carries no paradigm locator",
            )
        })?;
        Ok(self.expand_lexeme(form, loc))
    }

    /// パラダイムの全スロットへ解釈を射影します。
    ///
    /// 所有チェックは行いません。辞書パラダイムを参照する
    /// ヒューリスティックユニットからも使用されます。
    pub(crate) fn expand_lexeme(&self, form: &Parse, loc: ParadigmLoc) -> Vec<Parse> {
        let stem = self
            .data
            .paradigms
            .stem(loc.para_id, loc.idx, &form.word)
            .to_string();
        let slots = self.data.paradigms.paradigm_info(loc.para_id);
        let mut res = Vec::with_capacity(slots.len());
        for (idx, slot) in slots.iter().enumerate() {
            let mut word =
                String::with_capacity(slot.prefix.len() + stem.len() + slot.suffix.len());
            word.push_str(slot.prefix);
            word.push_str(&stem);
            word.push_str(slot.suffix);
            res.push(Parse {
                word,
                tag_id: slot.tag_id,
                normal_form: form.normal_form.clone(),
                para: Some(ParadigmLoc {
                    para_id: loc.para_id,
                    idx: idx as u16,
                }),
                estimate: form.estimate,
                methods: form.methods.clone(),
            });
        }
        res
    }

    /// 解釈を正規形(スロット0)の解釈へ変換します。
    ///
    /// すでにスロット0の解釈、またはパラダイムを持たない解釈は
    /// そのまま返されます。
    pub fn normalized(&self, form: &Parse) -> Parse {
        let Some(loc) = form.para else {
            return form.clone();
        };
        if loc.idx == 0 {
            return form.clone();
        }
        Parse {
            word: form.normal_form.clone(),
            tag_id: self.data.paradigms.tag_id_at(loc.para_id, 0),
            normal_form: form.normal_form.clone(),
            para: Some(ParadigmLoc {
                para_id: loc.para_id,
                idx: 0,
            }),
            estimate: form.estimate,
            methods: form.methods.clone(),
        }
    }

    /// 単語が辞書に登録されているかを判定します。
    ///
    /// `strict`が`true`の場合、綴りがすでに補正済み(正しいё)である
    /// ことを要求します。`false`の場合は混同しやすい文字の変種も
    /// 許容されます。
    ///
    /// 辞書には慣用的に使われる誤った形も登録されているため、
    /// スペルチェックの用途には注意が必要です。
    pub fn word_is_known(&self, word: &str, strict: bool) -> bool {
        if strict {
            self.data.words.contains(word)
        } else {
            !self
                .data
                .words
                .similar_keys(word, &self.substitutions)
                .is_empty()
        }
    }

    /// 指定された接頭辞で始まる既知語の解釈を列挙します。
    ///
    /// 空の接頭辞はすべての既知語を意味します。順序は語彙ストアの
    /// 辞書順に従い、呼び出しごとに独立した有限のイテレータです。
    pub fn iter_known_parses<'a>(&'a self, prefix: &str) -> impl Iterator<Item = Parse> + 'a {
        self.data.words.iter(prefix).map(move |(word, value)| {
            let loc = ParadigmLoc::unpack(value);
            let normal_form = self.data.paradigms.normal_form(loc.para_id, loc.idx, &word);
            let methods = vec![DerivationStep::new(MethodKind::Dictionary, word.clone())];
            Parse {
                word,
                tag_id: self.data.paradigms.tag_id_at(loc.para_id, loc.idx),
                normal_form,
                para: Some(loc),
                estimate: DICTIONARY_ESTIMATE,
                methods,
            }
        })
    }
}
