//! パイプライン制御に関するテスト
//!
//! 辞書ショートサーキット、終端ユニットの停止動作、重複抑制の
//! 動作を、呼び出し回数を記録するスタブユニットで検証します。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::analyzer::MorphAnalyzer;
use crate::dictionary::Dictionary;
use crate::errors::Result;
use crate::parse::{DerivationStep, MethodKind, Parse, TagId};
use crate::tests::sample_data;
use crate::units::{add_parse_if_not_seen, add_tag_if_not_seen};
use crate::units::{AnalyzerUnit, SeenParses, SeenTags};

/// 呼び出し回数を記録するスタブユニット
struct RecordingUnit {
    kind: MethodKind,
    terminal: bool,
    emit: Option<TagId>,
    calls: Arc<AtomicUsize>,
}

impl RecordingUnit {
    fn new(
        kind: MethodKind,
        terminal: bool,
        emit: Option<TagId>,
    ) -> (Box<dyn AnalyzerUnit>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let unit = Box::new(Self {
            kind,
            terminal,
            emit,
            calls: Arc::clone(&calls),
        });
        (unit, calls)
    }
}

impl AnalyzerUnit for RecordingUnit {
    fn kind(&self) -> MethodKind {
        self.kind
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn parse(&self, _morph: &MorphAnalyzer, word: &str, seen: &mut SeenParses) -> Vec<Parse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut res = vec![];
        if let Some(tag_id) = self.emit {
            let parse = Parse {
                word: word.to_string(),
                tag_id,
                normal_form: word.to_string(),
                para: None,
                estimate: 0.5,
                methods: vec![DerivationStep::new(self.kind(), word)],
            };
            add_parse_if_not_seen(seen, &mut res, parse);
        }
        res
    }

    fn tag(&self, _morph: &MorphAnalyzer, _word: &str, seen: &mut SeenTags) -> Vec<TagId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut res = vec![];
        if let Some(tag_id) = self.emit {
            add_tag_if_not_seen(seen, &mut res, tag_id);
        }
        res
    }

    fn get_lexeme(&self, _morph: &MorphAnalyzer, form: &Parse) -> Result<Vec<Parse>> {
        Ok(vec![form.clone()])
    }

    fn normalized(&self, _morph: &MorphAnalyzer, form: &Parse) -> Result<Parse> {
        Ok(form.clone())
    }
}

#[test]
fn test_dictionary_short_circuit() {
    let (u0, c0) = RecordingUnit::new(MethodKind::KnownPrefix, false, Some(0));
    let (u1, c1) = RecordingUnit::new(MethodKind::KnownSuffix, true, Some(1));
    let morph =
        MorphAnalyzer::with_units(Dictionary::from_data(sample_data()), vec![u0, u1]).unwrap();

    let parses = morph.parse("книга");
    assert_eq!(parses.len(), 1);
    assert_eq!(parses[0].methods[0].kind, MethodKind::Dictionary);
    assert_eq!(c0.load(Ordering::SeqCst), 0);
    assert_eq!(c1.load(Ordering::SeqCst), 0);

    morph.tag("книга");
    assert_eq!(c0.load(Ordering::SeqCst), 0);
    assert_eq!(c1.load(Ordering::SeqCst), 0);
}

#[test]
fn test_terminal_unit_stops_pipeline() {
    let (u0, c0) = RecordingUnit::new(MethodKind::KnownPrefix, false, Some(0));
    let (u1, c1) = RecordingUnit::new(MethodKind::Latin, true, Some(1));
    let (u2, c2) = RecordingUnit::new(MethodKind::KnownSuffix, false, Some(2));
    let morph =
        MorphAnalyzer::with_units(Dictionary::from_data(sample_data()), vec![u0, u1, u2]).unwrap();

    // 非終端のU0の結果は保持されたまま、終端のU1で停止する
    let parses = morph.parse("незнакомец");
    assert_eq!(parses.len(), 2);
    assert_eq!(c0.load(Ordering::SeqCst), 1);
    assert_eq!(c1.load(Ordering::SeqCst), 1);
    assert_eq!(c2.load(Ordering::SeqCst), 0);
}

#[test]
fn test_terminal_unit_without_output_does_not_stop() {
    let (u0, _) = RecordingUnit::new(MethodKind::KnownPrefix, false, None);
    let (u1, _) = RecordingUnit::new(MethodKind::Latin, true, None);
    let (u2, c2) = RecordingUnit::new(MethodKind::KnownSuffix, false, Some(2));
    let morph =
        MorphAnalyzer::with_units(Dictionary::from_data(sample_data()), vec![u0, u1, u2]).unwrap();

    let parses = morph.parse("незнакомец");
    assert_eq!(parses.len(), 1);
    assert_eq!(c2.load(Ordering::SeqCst), 1);
}

#[test]
fn test_seen_set_suppresses_duplicates() {
    // 同じ(表層形, タグID)を生成する2つの非終端ユニット
    let (u0, _) = RecordingUnit::new(MethodKind::KnownPrefix, false, Some(1));
    let (u1, _) = RecordingUnit::new(MethodKind::KnownSuffix, false, Some(1));
    let morph =
        MorphAnalyzer::with_units(Dictionary::from_data(sample_data()), vec![u0, u1]).unwrap();

    assert_eq!(morph.parse("незнакомец").len(), 1);
    assert_eq!(morph.tag("незнакомец").len(), 1);
}

#[test]
fn test_no_unit_output_is_empty_not_error() {
    let (u0, _) = RecordingUnit::new(MethodKind::KnownSuffix, false, None);
    let morph =
        MorphAnalyzer::with_units(Dictionary::from_data(sample_data()), vec![u0]).unwrap();

    assert!(morph.parse("незнакомец").is_empty());
    assert!(morph.tag("незнакомец").is_empty());
    assert!(morph.normal_forms("незнакомец").is_empty());
}

#[test]
fn test_duplicate_unit_kinds_are_rejected() {
    let (u0, _) = RecordingUnit::new(MethodKind::KnownSuffix, false, Some(0));
    let (u1, _) = RecordingUnit::new(MethodKind::KnownSuffix, false, Some(1));
    let result = MorphAnalyzer::with_units(Dictionary::from_data(sample_data()), vec![u0, u1]);
    assert!(result.is_err());
}
