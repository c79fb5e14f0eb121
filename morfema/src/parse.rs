//! 解析結果コンテナ
//!
//! このモジュールは、形態素解析の結果を表現する型を提供します。
//! [`Parse`]は辞書テーブルへのID参照のみを持つ素朴な値であり、
//! 生成元のコンポーネントを記録した導出チェーンによって、
//! パイプライン全体を再実行することなくレキシームや正規形を
//! 再計算できます。

use hashbrown::HashSet;

use crate::analyzer::MorphAnalyzer;
use crate::dictionary::paradigm::ParadigmSlot;
use crate::dictionary::tag::Tag;
use crate::errors::Result;

/// タグテーブルへのID
pub type TagId = u16;

/// パラダイムストア内の構造的位置
///
/// パラダイムIDとスロット番号の組で、タグと接辞のペアを一意に
/// 決定します。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParadigmLoc {
    /// パラダイムID
    pub para_id: u16,

    /// スロット番号。0は正規形のスロットです。
    pub idx: u16,
}

impl ParadigmLoc {
    /// 語彙ストアに格納するためのパック表現に変換します。
    #[inline(always)]
    pub(crate) fn pack(self) -> u32 {
        (u32::from(self.para_id) << 16) | u32::from(self.idx)
    }

    /// パック表現から復元します。
    #[inline(always)]
    pub(crate) fn unpack(value: u32) -> Self {
        Self {
            para_id: (value >> 16) as u16,
            idx: (value & 0xffff) as u16,
        }
    }
}

/// 解析結果を生成したコンポーネントの種類
///
/// 導出チェーンのディスパッチは、生きたオブジェクト参照ではなく
/// この閉じた列挙型で行われます。解析結果を素朴なデータに保ち、
/// 値とエンジンの間の所有関係を避けるためです。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// 辞書検索
    Dictionary,
    /// 句読点・数値の認識
    Punctuation,
    /// ラテン文字列の認識
    Latin,
    /// ハイフン付き助詞の分離
    HyphenParticle,
    /// ハイフン複合語の分割
    Hyphenated,
    /// 既知接頭辞の除去
    KnownPrefix,
    /// 未知接頭辞の推測
    UnknownPrefix,
    /// 既知接尾辞による推測
    KnownSuffix,
}

/// 導出チェーンの1ステップ
///
/// 生成元のコンポーネントと、そのステップでの語形（辞書なら補正済みの
/// 表層形、接辞ユニットなら接辞そのもの）を記録します。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivationStep {
    /// 生成元のコンポーネント
    pub kind: MethodKind,

    /// このステップでの語形
    pub word: String,
}

impl DerivationStep {
    #[inline(always)]
    pub(crate) fn new<S>(kind: MethodKind, word: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            kind,
            word: word.into(),
        }
    }
}

/// 形態素解析の1つの解釈
///
/// 構築後は変更されない安価な値オブジェクトです。参照先のテーブルを
/// 所有せず、IDとインデックスのみを保持します。
#[derive(Clone, Debug, PartialEq)]
pub struct Parse {
    /// 表層形。綴りの補正（例: е→ё）が適用された形です。
    pub word: String,

    /// タグテーブルへのID
    pub tag_id: TagId,

    /// 同じパラダイム・語幹のスロット0の表層形
    pub normal_form: String,

    /// パラダイムストア内の位置。形状認識ユニット（句読点・ラテン文字）の
    /// 結果はパラダイムを持たないため`None`になります。
    pub para: Option<ParadigmLoc>,

    /// 信頼度。辞書由来の解釈は常に1.0、ヒューリスティック由来は
    /// 常に1.0未満です。
    pub estimate: f64,

    /// 導出チェーン。空になることはなく、最後のステップの生成元が
    /// レキシーム・正規形の再計算を担当します。
    pub methods: Vec<DerivationStep>,
}

impl Parse {
    /// 導出チェーンの最後のステップを取得します。
    pub(crate) fn last_method(&self) -> Option<&DerivationStep> {
        self.methods.last()
    }
}

/// 解析器に束縛されたリッチな解析結果
///
/// [`Parse`]への軽量なラッパーであり、生成元の解析器への参照を
/// 保持することで、レキシーム展開や屈折などの派生操作を
/// メソッドとして直接呼び出せます。最小のオーバーヘッドが必要な
/// 場合は素の[`Parse`]をそのまま使用してください。
#[derive(Clone)]
pub struct BoundParse<'m> {
    morph: &'m MorphAnalyzer,
    parse: Parse,
}

impl<'m> BoundParse<'m> {
    #[inline(always)]
    pub(crate) fn new(morph: &'m MorphAnalyzer, parse: Parse) -> Self {
        Self { morph, parse }
    }

    /// 内部の[`Parse`]への参照を取得します。
    #[inline(always)]
    pub fn inner(&self) -> &Parse {
        &self.parse
    }

    /// 内部の[`Parse`]を取り出します。
    #[inline(always)]
    pub fn into_inner(self) -> Parse {
        self.parse
    }

    /// 表層形を取得します。
    #[inline(always)]
    pub fn word(&self) -> &str {
        &self.parse.word
    }

    /// 正規形を取得します。
    #[inline(always)]
    pub fn normal_form(&self) -> &str {
        &self.parse.normal_form
    }

    /// 信頼度を取得します。
    #[inline(always)]
    pub fn estimate(&self) -> f64 {
        self.parse.estimate
    }

    /// 文法タグを取得します。
    pub fn tag(&self) -> &'m Tag {
        self.morph.dictionary().tag_set().get(self.parse.tag_id)
    }

    /// この形が属するレキシームを取得します。
    pub fn lexeme(&self) -> Result<Vec<BoundParse<'m>>> {
        Ok(self
            .morph
            .get_lexeme(&self.parse)?
            .into_iter()
            .map(|p| BoundParse::new(self.morph, p))
            .collect())
    }

    /// この形が既知の辞書形であるかを判定します。
    pub fn is_known(&self) -> bool {
        self.morph.word_is_known(&self.parse.word, true)
    }

    /// 正規形に対応する解釈を取得します。
    pub fn normalized(&self) -> Result<BoundParse<'m>> {
        Ok(BoundParse::new(
            self.morph,
            self.morph.normalized(&self.parse)?,
        ))
    }

    /// 要求されたグラメーム集合へ屈折させます。
    ///
    /// 条件を満たす形がレキシーム内に存在しない場合は`None`を返します。
    pub fn inflect(&self, required: &HashSet<String>) -> Result<Option<BoundParse<'m>>> {
        Ok(self
            .morph
            .inflect(&self.parse, required)?
            .map(|p| BoundParse::new(self.morph, p)))
    }

    /// この形のパラダイムの全スロットを取得します。
    ///
    /// パラダイムを持たない形状認識の結果に対しては`None`を返します。
    pub fn paradigm(&self) -> Option<Vec<ParadigmSlot<'m>>> {
        self.parse
            .para
            .map(|loc| self.morph.dictionary().paradigms().paradigm_info(loc.para_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paradigm_loc_pack_roundtrip() {
        let loc = ParadigmLoc {
            para_id: 1234,
            idx: 7,
        };
        assert_eq!(ParadigmLoc::unpack(loc.pack()), loc);
        let max = ParadigmLoc {
            para_id: u16::MAX,
            idx: u16::MAX,
        };
        assert_eq!(ParadigmLoc::unpack(max.pack()), max);
    }
}
