//! ハイフン処理ユニット
//!
//! このモジュールは、ハイフンを含む単語を分割して解析するユニットを
//! 提供します。助詞の分離と複合語の分割の2種類があり、どちらも
//! 終端ユニットです。

use crate::analyzer::MorphAnalyzer;
use crate::errors::Result;
use crate::parse::{DerivationStep, MethodKind, Parse, TagId};
use crate::units::{
    add_parse_if_not_seen, add_tag_if_not_seen, own_last_step, prefixed_lexeme,
    prefixed_normalized, suffixed_lexeme, suffixed_normalized,
};
use crate::units::{AnalyzerUnit, SeenParses, SeenTags};

/// ハイフンで連結される助詞
///
/// 語形変化に影響しない強調・慣用の助詞です。
pub(crate) const PARTICLES: &[&str] = &[
    "-то", "-ка", "-таки", "-де", "-тко", "-тка", "-с", "-ста",
];

const PARTICLE_DECAY: f64 = 0.9;
const HYPHENATED_DECAY: f64 = 0.75;

/// ハイフン付き助詞を分離するユニット
///
/// `сходи-ка`のような形から助詞を切り離し、前半部を解析器全体で
/// 再解析した後、表層形と正規形へ助詞を付け直します。
#[derive(Default)]
pub struct HyphenSeparatedParticleAnalyzer {}

impl AnalyzerUnit for HyphenSeparatedParticleAnalyzer {
    fn kind(&self) -> MethodKind {
        MethodKind::HyphenParticle
    }

    fn is_terminal(&self) -> bool {
        true
    }

    fn parse(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenParses) -> Vec<Parse> {
        let mut res = vec![];
        for &particle in PARTICLES {
            let Some(left) = word.strip_suffix(particle) else {
                continue;
            };
            if left.is_empty() {
                continue;
            }
            for mut p in morph.parse(left) {
                p.word.push_str(particle);
                p.normal_form.push_str(particle);
                p.estimate *= PARTICLE_DECAY;
                p.methods
                    .push(DerivationStep::new(self.kind(), particle));
                add_parse_if_not_seen(seen, &mut res, p);
            }
        }
        res
    }

    fn tag(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenTags) -> Vec<TagId> {
        let mut res = vec![];
        for &particle in PARTICLES {
            let Some(left) = word.strip_suffix(particle) else {
                continue;
            };
            if left.is_empty() {
                continue;
            }
            for tag_id in morph.tag(left) {
                add_tag_if_not_seen(seen, &mut res, tag_id);
            }
        }
        res
    }

    fn get_lexeme(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Vec<Parse>> {
        let particle = own_last_step(form, self.kind())?.to_string();
        suffixed_lexeme(morph, form, &particle)
    }

    fn normalized(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Parse> {
        let particle = own_last_step(form, self.kind())?.to_string();
        suffixed_normalized(morph, form, &particle)
    }
}

/// ハイフン複合語を分割するユニット
///
/// `интернет-магазин`のような複合語の後半部を解析器全体で再解析し、
/// 前半部を固定の先頭要素として表層形と正規形へ付け直します。
/// 助詞ユニットが扱う単語はスキップします。
#[derive(Default)]
pub struct HyphenatedWordsAnalyzer {}

impl HyphenatedWordsAnalyzer {
    fn split<'w>(&self, word: &'w str) -> Option<(&'w str, &'w str)> {
        if PARTICLES.iter().any(|p| word.ends_with(p)) {
            return None;
        }
        let (left, right) = word.split_once('-')?;
        if left.is_empty() || right.is_empty() {
            return None;
        }
        Some((left, right))
    }
}

impl AnalyzerUnit for HyphenatedWordsAnalyzer {
    fn kind(&self) -> MethodKind {
        MethodKind::Hyphenated
    }

    fn is_terminal(&self) -> bool {
        true
    }

    fn parse(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenParses) -> Vec<Parse> {
        let mut res = vec![];
        let Some((left, right)) = self.split(word) else {
            return res;
        };
        let head = format!("{left}-");
        for mut p in morph.parse(right) {
            p.word.insert_str(0, &head);
            p.normal_form.insert_str(0, &head);
            p.estimate *= HYPHENATED_DECAY;
            p.methods
                .push(DerivationStep::new(self.kind(), head.clone()));
            add_parse_if_not_seen(seen, &mut res, p);
        }
        res
    }

    fn tag(&self, morph: &MorphAnalyzer, word: &str, seen: &mut SeenTags) -> Vec<TagId> {
        let mut res = vec![];
        let Some((_, right)) = self.split(word) else {
            return res;
        };
        for tag_id in morph.tag(right) {
            add_tag_if_not_seen(seen, &mut res, tag_id);
        }
        res
    }

    fn get_lexeme(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Vec<Parse>> {
        let head = own_last_step(form, self.kind())?.to_string();
        prefixed_lexeme(morph, form, &head)
    }

    fn normalized(&self, morph: &MorphAnalyzer, form: &Parse) -> Result<Parse> {
        let head = own_last_step(form, self.kind())?.to_string();
        prefixed_normalized(morph, form, &head)
    }
}
