//! 形状認識ユニット
//!
//! このモジュールは、文字種のみから判定できる単語（句読点・数値・
//! ラテン文字列）を認識するユニットを提供します。どちらのユニットも
//! 終端であり、認識に成功した場合は後続のヒューリスティックが
//! 呼び出されません。

use crate::analyzer::MorphAnalyzer;
use crate::errors::Result;
use crate::parse::{DerivationStep, MethodKind, Parse, TagId};
use crate::units::{add_parse_if_not_seen, add_tag_if_not_seen, own_last_step};
use crate::units::{AnalyzerUnit, SeenParses, SeenTags};

/// 形状認識の信頼度
const SHAPE_ESTIMATE: f64 = 0.9;

fn is_punctuation_char(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '«' | '»' | '—' | '–' | '…' | '„' | '“' | '”' | '‘' | '’' | '·'
        )
}

fn is_integer_literal(word: &str) -> bool {
    word.parse::<i64>().is_ok()
}

fn is_real_literal(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
        && word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        && word.parse::<f64>().is_ok()
}

fn shape_parse(word: &str, kind: MethodKind, tag_id: TagId) -> Parse {
    Parse {
        word: word.to_string(),
        tag_id,
        normal_form: word.to_string(),
        para: None,
        estimate: SHAPE_ESTIMATE,
        methods: vec![DerivationStep::new(kind, word)],
    }
}

/// 句読点と数値リテラルを認識するユニット
///
/// すべての文字が句読点である単語には`PNCT`、整数・実数リテラルには
/// `NUMB,intg`・`NUMB,real`のサービスタグを割り当てます。
#[derive(Default)]
pub struct PunctuationAnalyzer {}

impl PunctuationAnalyzer {
    fn recognize(&self, morph: &MorphAnalyzer, word: &str) -> Option<TagId> {
        let service = morph.service_tags();
        if !word.is_empty() && word.chars().all(is_punctuation_char) {
            Some(service.pnct)
        } else if is_integer_literal(word) {
            Some(service.numb_intg)
        } else if is_real_literal(word) {
            Some(service.numb_real)
        } else {
            None
        }
    }
}

impl AnalyzerUnit for PunctuationAnalyzer {
    fn kind(&self) -> MethodKind {
        MethodKind::Punctuation
    }

    fn is_terminal(&self) -> bool {
        true
    }

    fn parse(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenParses) -> Vec<Parse> {
        let mut res = vec![];
        if let Some(tag_id) = self.recognize(morph, word) {
            add_parse_if_not_seen(seen, &mut res, shape_parse(word, self.kind(), tag_id));
        }
        res
    }

    fn tag(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenTags) -> Vec<TagId> {
        let mut res = vec![];
        if let Some(tag_id) = self.recognize(morph, word) {
            add_tag_if_not_seen(seen, &mut res, tag_id);
        }
        res
    }

    fn get_lexeme(&self, _morph: &MorphAnalyzer, form: &Parse) -> Result<Vec<Parse>> {
        own_last_step(form, self.kind())?;
        Ok(vec![form.clone()])
    }

    fn normalized(&self, _morph: &MorphAnalyzer, form: &Parse) -> Result<Parse> {
        own_last_step(form, self.kind())?;
        Ok(form.clone())
    }
}

/// ラテン文字列を認識するユニット
///
/// ラテン文字を1文字以上含み、ラテン文字・数字・句読点のみからなる
/// 単語に`LATN`のサービスタグを割り当てます。
#[derive(Default)]
pub struct LatinAnalyzer {}

impl LatinAnalyzer {
    fn recognize(&self, morph: &MorphAnalyzer, word: &str) -> Option<TagId> {
        let latin = word.chars().any(|c| c.is_ascii_alphabetic())
            && word
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || is_punctuation_char(c));
        latin.then(|| morph.service_tags().latn)
    }
}

impl AnalyzerUnit for LatinAnalyzer {
    fn kind(&self) -> MethodKind {
        MethodKind::Latin
    }

    fn is_terminal(&self) -> bool {
        true
    }

    fn parse(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenParses) -> Vec<Parse> {
        let mut res = vec![];
        if let Some(tag_id) = self.recognize(morph, word) {
            add_parse_if_not_seen(seen, &mut res, shape_parse(word, self.kind(), tag_id));
        }
        res
    }

    fn tag(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenTags) -> Vec<TagId> {
        let mut res = vec![];
        if let Some(tag_id) = self.recognize(morph, word) {
            add_tag_if_not_seen(seen, &mut res, tag_id);
        }
        res
    }

    fn get_lexeme(&self, _morph: &MorphAnalyzer, form: &Parse) -> Result<Vec<Parse>> {
        own_last_step(form, self.kind())?;
        Ok(vec![form.clone()])
    }

    fn normalized(&self, _morph: &MorphAnalyzer, form: &Parse) -> Result<Parse> {
        own_last_step(form, self.kind())?;
        Ok(form.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_chars() {
        assert!("...".chars().all(is_punctuation_char));
        assert!("«—»".chars().all(is_punctuation_char));
        assert!(!"кот".chars().all(is_punctuation_char));
    }

    #[test]
    fn test_number_literals() {
        assert!(is_integer_literal("123"));
        assert!(is_integer_literal("-7"));
        assert!(!is_integer_literal("1.5"));
        assert!(is_real_literal("1.5"));
        assert!(is_real_literal("-0.25"));
        assert!(!is_real_literal("inf"));
        assert!(!is_real_literal("кот"));
    }
}
