//! 未知語のためのヒューリスティックユニット
//!
//! このモジュールは、辞書に登録されていない単語を解析するための
//! ユニット群を提供します。各ユニットは[`AnalyzerUnit`]を実装し、
//! 解析器のパイプラインに設定された順序で呼び出されます。
//! 終端ユニットが結果を生成すると、後続のユニットは呼び出されません。

pub(crate) mod affix;
pub(crate) mod hyphen;
pub(crate) mod shape;

use hashbrown::HashSet;

use crate::analyzer::MorphAnalyzer;
use crate::errors::{MorfemaError, Result};
use crate::parse::{MethodKind, Parse, TagId};

pub use crate::units::affix::{KnownPrefixAnalyzer, KnownSuffixAnalyzer, UnknownPrefixAnalyzer};
pub use crate::units::hyphen::{HyphenSeparatedParticleAnalyzer, HyphenatedWordsAnalyzer};
pub use crate::units::shape::{LatinAnalyzer, PunctuationAnalyzer};

/// 1クエリ内で生成済みの`(表層形, タグID)`の組
///
/// パイプライン全体で共有され、先行ユニットが生成した結果と同一の
/// 結果を後続ユニットが重複して返すことを防ぎます。
pub type SeenParses = HashSet<(String, TagId)>;

/// 1クエリ内で生成済みのタグID
pub type SeenTags = HashSet<TagId>;

/// ヒューリスティックユニットの能力契約
///
/// 各ユニットは辞書と同じ`parse`/`tag`操作に加えて、自身が生成した
/// 解釈のレキシーム・正規形の再計算を担当します。ユニットは
/// `word`に対して副作用を持たず、他のユニットの結果を変更しません。
pub trait AnalyzerUnit: Send + Sync {
    /// このユニットが導出チェーンに記録する種類を返します。
    fn kind(&self) -> MethodKind;

    /// このユニットが終端であるかを返します。
    ///
    /// 終端ユニットが1件以上の結果を生成した場合、パイプラインは
    /// そこで停止します。
    fn is_terminal(&self) -> bool;

    /// 単語を解析します。
    fn parse(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenParses) -> Vec<Parse>;

    /// 単語のタグのみを取得します。
    fn tag(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenTags) -> Vec<TagId>;

    /// このユニットが生成した解釈のレキシームを取得します。
    ///
    /// # エラー
    ///
    /// 解釈の導出チェーンがこのユニットのものでない場合にエラーを
    /// 返します。
    fn get_lexeme(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Vec<Parse>>;

    /// このユニットが生成した解釈を正規形の解釈へ変換します。
    fn normalized(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Parse>;
}

/// 未生成の解釈のみをアキュムレータへ追加します。
pub(crate) fn add_parse_if_not_seen(seen: &mut SeenParses, res: &mut Vec<Parse>, parse: Parse) {
    if seen.insert((parse.word.clone(), parse.tag_id)) {
        res.push(parse);
    }
}

/// 未生成のタグのみをアキュムレータへ追加します。
pub(crate) fn add_tag_if_not_seen(seen: &mut SeenTags, res: &mut Vec<TagId>, tag_id: TagId) {
    if seen.insert(tag_id) {
        res.push(tag_id);
    }
}

/// 導出チェーンの最後のステップを検証して取り出します。
pub(crate) fn own_last_step<'p>(form: &'p Parse, kind: MethodKind) -> Result<&'p str> {
    match form.last_method() {
        Some(step) if step.kind == kind => Ok(&step.word),
        _ => Err(MorfemaError::invalid_state(
            "cannot recompute the parse",
            format!("the derivation chain of this parse is not owned by {kind:?}"),
        )),
    }
}

/// 接頭辞を付け外ししてレキシームを再計算します。
///
/// 接頭辞系のユニット（既知・未知接頭辞、ハイフン複合語の前半部）で
/// 共有されるヘルパーです。`head`を取り除いた内側の解釈に委譲し、
/// 得られた各形へ`head`を再適用します。
pub(crate) fn prefixed_lexeme(
    morph: &MorphAnalyzer,
    form: &Parse,
    head: &str,
) -> Result<Vec<Parse>> {
    let inner = strip_head(form, head)?;
    let mut res = morph.get_lexeme(&inner)?;
    for p in &mut res {
        p.word.insert_str(0, head);
        p.normal_form.insert_str(0, head);
        p.estimate = form.estimate;
        p.methods = form.methods.clone();
    }
    Ok(res)
}

/// 接頭辞を付け外しして正規形を再計算します。
pub(crate) fn prefixed_normalized(
    morph: &MorphAnalyzer,
    form: &Parse,
    head: &str,
) -> Result<Parse> {
    let inner = strip_head(form, head)?;
    let mut normalized = morph.normalized(&inner)?;
    normalized.word.insert_str(0, head);
    normalized.normal_form.insert_str(0, head);
    normalized.estimate = form.estimate;
    normalized.methods = form.methods.clone();
    Ok(normalized)
}

fn strip_head(form: &Parse, head: &str) -> Result<Parse> {
    let (Some(word), Some(normal_form)) = (
        form.word.strip_prefix(head),
        form.normal_form.strip_prefix(head),
    ) else {
        return Err(MorfemaError::invalid_state(
            "cannot recompute the parse",
            format!("{:?} does not start with the recorded head {head:?}", form.word),
        ));
    };
    let mut inner = form.clone();
    inner.word = word.to_string();
    inner.normal_form = normal_form.to_string();
    inner.methods.pop();
    Ok(inner)
}

/// 接尾要素を付け外ししてレキシームを再計算します。
///
/// ハイフン付き助詞ユニットで使用されるヘルパーです。
pub(crate) fn suffixed_lexeme(
    morph: &MorphAnalyzer,
    form: &Parse,
    tail: &str,
) -> Result<Vec<Parse>> {
    let inner = strip_tail(form, tail)?;
    let mut res = morph.get_lexeme(&inner)?;
    for p in &mut res {
        p.word.push_str(tail);
        p.normal_form.push_str(tail);
        p.estimate = form.estimate;
        p.methods = form.methods.clone();
    }
    Ok(res)
}

/// 接尾要素を付け外しして正規形を再計算します。
pub(crate) fn suffixed_normalized(
    morph: &MorphAnalyzer,
    form: &Parse,
    tail: &str,
) -> Result<Parse> {
    let inner = strip_tail(form, tail)?;
    let mut normalized = morph.normalized(&inner)?;
    normalized.word.push_str(tail);
    normalized.normal_form.push_str(tail);
    normalized.estimate = form.estimate;
    normalized.methods = form.methods.clone();
    Ok(normalized)
}

fn strip_tail(form: &Parse, tail: &str) -> Result<Parse> {
    let (Some(word), Some(normal_form)) = (
        form.word.strip_suffix(tail),
        form.normal_form.strip_suffix(tail),
    ) else {
        return Err(MorfemaError::invalid_state(
            "cannot recompute the parse",
            format!("{:?} does not end with the recorded tail {tail:?}", form.word),
        ));
    };
    let mut inner = form.clone();
    inner.word = word.to_string();
    inner.normal_form = normal_form.to_string();
    inner.methods.pop();
    Ok(inner)
}
