//! 接辞推測ユニット
//!
//! このモジュールは、接頭辞・接尾辞の知識に基づいて未知語を推測する
//! ユニットを提供します。いずれも非終端であり、後続のユニットは
//! 引き続き呼び出されます。候補は生産的な語類のタグに限定されます。

use std::cmp::Ordering;

use crate::analyzer::MorphAnalyzer;
use crate::dictionary::words::MAX_SUFFIX_LEN;
use crate::errors::{MorfemaError, Result};
use crate::parse::{DerivationStep, MethodKind, ParadigmLoc, Parse, TagId};
use crate::units::{
    add_parse_if_not_seen, add_tag_if_not_seen, own_last_step, prefixed_lexeme,
    prefixed_normalized,
};
use crate::units::{AnalyzerUnit, SeenParses, SeenTags};

/// 接頭辞を取り除いた残りの最小文字数
const MIN_REMAINDER_LEN: usize = 3;

const KNOWN_PREFIX_DECAY: f64 = 0.75;
const UNKNOWN_PREFIX_DECAY: f64 = 0.5;
const KNOWN_SUFFIX_DECAY: f64 = 0.5;

/// 未知接頭辞として切り落とす最大文字数
const MAX_UNKNOWN_PREFIX_LEN: usize = 5;

/// 既知接頭辞を取り除いて推測するユニット
///
/// 辞書の既知接頭辞テーブル（長さの降順）を左から照合し、残りを
/// 解析器全体で再解析した後、接頭辞を表層形と正規形へ付け直します。
#[derive(Default)]
pub struct KnownPrefixAnalyzer {}

impl AnalyzerUnit for KnownPrefixAnalyzer {
    fn kind(&self) -> MethodKind {
        MethodKind::KnownPrefix
    }

    fn is_terminal(&self) -> bool {
        false
    }

    fn parse(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenParses) -> Vec<Parse> {
        let mut res = vec![];
        for prefix in morph.dictionary().prediction_prefixes() {
            let Some(unprefixed) = word.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if unprefixed.chars().count() < MIN_REMAINDER_LEN {
                continue;
            }
            for mut p in morph.parse(unprefixed) {
                if !morph.dictionary().tag_set().get(p.tag_id).is_productive() {
                    continue;
                }
                p.word.insert_str(0, prefix);
                p.normal_form.insert_str(0, prefix);
                p.estimate *= KNOWN_PREFIX_DECAY;
                p.methods
                    .push(DerivationStep::new(self.kind(), prefix.clone()));
                add_parse_if_not_seen(seen, &mut res, p);
            }
        }
        res
    }

    fn tag(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenTags) -> Vec<TagId> {
        let mut res = vec![];
        for prefix in morph.dictionary().prediction_prefixes() {
            let Some(unprefixed) = word.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if unprefixed.chars().count() < MIN_REMAINDER_LEN {
                continue;
            }
            for tag_id in morph.tag(unprefixed) {
                if !morph.dictionary().tag_set().get(tag_id).is_productive() {
                    continue;
                }
                add_tag_if_not_seen(seen, &mut res, tag_id);
            }
        }
        res
    }

    fn get_lexeme(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Vec<Parse>> {
        let prefix = own_last_step(form, self.kind())?.to_string();
        prefixed_lexeme(morph, form, &prefix)
    }

    fn normalized(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Parse> {
        let prefix = own_last_step(form, self.kind())?.to_string();
        prefixed_normalized(morph, form, &prefix)
    }
}

/// 未知接頭辞を切り落として推測するユニット
///
/// 先頭の1〜5文字を接頭辞とみなして切り落とし、残りを辞書のみで
/// 解析します。再帰を避けるため解析器全体は使用しません。
#[derive(Default)]
pub struct UnknownPrefixAnalyzer {}

impl UnknownPrefixAnalyzer {
    fn splits<'w>(&self, word: &'w str) -> Vec<(&'w str, &'w str)> {
        let idxs: Vec<usize> = word.char_indices().map(|(i, _)| i).collect();
        let n_chars = idxs.len();
        if n_chars <= MIN_REMAINDER_LEN {
            return vec![];
        }
        let max = MAX_UNKNOWN_PREFIX_LEN.min(n_chars - MIN_REMAINDER_LEN);
        (1..=max).map(|n| word.split_at(idxs[n])).collect()
    }
}

impl AnalyzerUnit for UnknownPrefixAnalyzer {
    fn kind(&self) -> MethodKind {
        MethodKind::UnknownPrefix
    }

    fn is_terminal(&self) -> bool {
        false
    }

    fn parse(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenParses) -> Vec<Parse> {
        let mut res = vec![];
        for (prefix, unprefixed) in self.splits(word) {
            for mut p in morph.dictionary().parse(unprefixed) {
                if !morph.dictionary().tag_set().get(p.tag_id).is_productive() {
                    continue;
                }
                p.word.insert_str(0, prefix);
                p.normal_form.insert_str(0, prefix);
                p.estimate *= UNKNOWN_PREFIX_DECAY;
                p.methods.push(DerivationStep::new(self.kind(), prefix));
                add_parse_if_not_seen(seen, &mut res, p);
            }
        }
        res
    }

    fn tag(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenTags) -> Vec<TagId> {
        let mut res = vec![];
        for (_, unprefixed) in self.splits(word) {
            for tag_id in morph.dictionary().tag(unprefixed) {
                if !morph.dictionary().tag_set().get(tag_id).is_productive() {
                    continue;
                }
                add_tag_if_not_seen(seen, &mut res, tag_id);
            }
        }
        res
    }

    fn get_lexeme(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Vec<Parse>> {
        let prefix = own_last_step(form, self.kind())?.to_string();
        prefixed_lexeme(morph, form, &prefix)
    }

    fn normalized(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Parse> {
        let prefix = own_last_step(form, self.kind())?.to_string();
        prefixed_normalized(morph, form, &prefix)
    }
}

/// 既知接尾辞によって推測するユニット
///
/// 単語の末尾1〜5文字を辞書の接尾辞予測テーブルで引き、観測回数に
/// 比例した信頼度で候補のパラダイムスロットを割り当てます。
/// 一致した最長の接尾辞長のみが使用されます。
#[derive(Default)]
pub struct KnownSuffixAnalyzer {}

/// 接尾辞推測を適用する単語の最小文字数
const MIN_WORD_LEN: usize = 4;

impl KnownSuffixAnalyzer {
    /// 長い順に並んだ`(接尾辞長, 接尾辞)`の候補列を返します。
    fn suffixes<'w>(&self, word: &'w str) -> Vec<(usize, &'w str)> {
        let idxs: Vec<usize> = word.char_indices().map(|(i, _)| i).collect();
        let n_chars = idxs.len();
        if n_chars < MIN_WORD_LEN {
            return vec![];
        }
        (1..=MAX_SUFFIX_LEN.min(n_chars - 1))
            .rev()
            .map(|n| (n, &word[idxs[n_chars - n]..]))
            .collect()
    }

    /// スロットの接辞が表層形と構造的に一致するかを検査します。
    fn fits(&self, morph: &MorphAnalyzer, word: &str, loc: ParadigmLoc) -> bool {
        let (prefix, suffix) = morph.dictionary().paradigms().affixes(loc.para_id, loc.idx);
        word.len() >= prefix.len() + suffix.len()
            && word.starts_with(prefix)
            && word.ends_with(suffix)
    }
}

impl AnalyzerUnit for KnownSuffixAnalyzer {
    fn kind(&self) -> MethodKind {
        MethodKind::KnownSuffix
    }

    fn is_terminal(&self) -> bool {
        false
    }

    fn parse(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenParses) -> Vec<Parse> {
        let dict = morph.dictionary();
        let mut res = vec![];
        for (n, suffix) in self.suffixes(word) {
            let Some(hits) = dict.prediction_suffixes().lookup(suffix) else {
                continue;
            };
            let total = dict.prediction_suffixes().total_for_len(n);
            if total == 0 {
                continue;
            }
            for (value, count) in hits {
                let loc = ParadigmLoc::unpack(value);
                let tag_id = dict.paradigms().tag_id_at(loc.para_id, loc.idx);
                if !dict.tag_set().get(tag_id).is_productive() {
                    continue;
                }
                if !self.fits(morph, word, loc) {
                    continue;
                }
                let parse = Parse {
                    word: word.to_string(),
                    tag_id,
                    normal_form: dict.paradigms().normal_form(loc.para_id, loc.idx, word),
                    para: Some(loc),
                    estimate: KNOWN_SUFFIX_DECAY * f64::from(count) / f64::from(total),
                    methods: vec![DerivationStep::new(self.kind(), suffix)],
                };
                add_parse_if_not_seen(seen, &mut res, parse);
            }
            if !res.is_empty() {
                break;
            }
        }
        res.sort_by(|a, b| {
            b.estimate
                .partial_cmp(&a.estimate)
                .unwrap_or(Ordering::Equal)
        });
        res
    }

    fn tag(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenTags) -> Vec<TagId> {
        let dict = morph.dictionary();
        let mut res = vec![];
        for (_, suffix) in self.suffixes(word) {
            let Some(hits) = dict.prediction_suffixes().lookup(suffix) else {
                continue;
            };
            for (value, _) in hits {
                let loc = ParadigmLoc::unpack(value);
                let tag_id = dict.paradigms().tag_id_at(loc.para_id, loc.idx);
                if !dict.tag_set().get(tag_id).is_productive() {
                    continue;
                }
                if !self.fits(morph, word, loc) {
                    continue;
                }
                add_tag_if_not_seen(seen, &mut res, tag_id);
            }
            if !res.is_empty() {
                break;
            }
        }
        res
    }

    fn get_lexeme(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Vec<Parse>> {
        own_last_step(form, self.kind())?;
        let loc = form.para.ok_or_else(|| {
            MorfemaError::invalid_state(
                "cannot expand the lexeme",
                "this parse carries no paradigm locator",
            )
        })?;
        Ok(morph.dictionary().expand_lexeme(form, loc))
    }

    fn normalized(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Parse> {
        own_last_step(form, self.kind())?;
        Ok(morph.dictionary().normalized(form))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_prefix_splits() {
        let unit = UnknownPrefixAnalyzer::default();
        let splits = unit.splits("псевдокот");
        assert_eq!(splits.first(), Some(&("п", "севдокот")));
        assert_eq!(splits.len(), 5);
        // 残りが3文字を下回る分割は生成されない
        assert_eq!(unit.splits("кот"), vec![]);
        assert_eq!(unit.splits("коты"), vec![("к", "оты")]);
    }

    #[test]
    fn test_known_suffix_candidates_are_longest_first() {
        let unit = KnownSuffixAnalyzer::default();
        let suffixes = unit.suffixes("собака");
        assert_eq!(
            suffixes,
            vec![(5, "обака"), (4, "бака"), (3, "ака"), (2, "ка"), (1, "а")]
        );
        assert_eq!(unit.suffixes("кот"), vec![]);
    }
}
