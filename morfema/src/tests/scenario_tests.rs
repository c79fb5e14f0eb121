//! 解析シナリオに関するテスト
//!
//! 既知語の解析、同音異義語、近似一致、レキシーム展開、屈折、
//! 各ヒューリスティックユニットの動作をエンドツーエンドで検証します。

use hashbrown::HashSet;

use crate::errors::MorfemaError;
use crate::parse::MethodKind;
use crate::tests::sample_analyzer;

fn grammemes(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_parse_known_word() {
    let morph = sample_analyzer();
    let parses = morph.parse("книга");
    assert_eq!(parses.len(), 1);
    let p = &parses[0];
    assert_eq!(p.word, "книга");
    assert_eq!(p.normal_form, "книга");
    assert_eq!(
        morph.dictionary().tag_set().get(p.tag_id).raw(),
        "NOUN,inan femn sing,nomn"
    );
    assert_eq!(p.estimate, 1.0);
    assert_eq!(p.methods.len(), 1);
    assert_eq!(p.methods[0].kind, MethodKind::Dictionary);
}

#[test]
fn test_homonyms_share_normal_form() {
    let morph = sample_analyzer();
    let parses = morph.parse("книги");
    assert_eq!(parses.len(), 2);
    // 同じパラダイムを共有する解釈の正規形は値として完全に一致する
    assert_eq!(parses[0].normal_form, "книга");
    assert_eq!(parses[1].normal_form, "книга");
    assert_ne!(parses[0].tag_id, parses[1].tag_id);
}

#[test]
fn test_lexeme_closure() {
    let morph = sample_analyzer();
    for p in morph.parse("книги") {
        let lexeme = morph.get_lexeme(&p).unwrap();
        let para_id = p.para.unwrap().para_id;
        assert_eq!(
            lexeme.len(),
            morph.dictionary().paradigms().slot_count(para_id)
        );
        for (idx, form) in lexeme.iter().enumerate() {
            let loc = form.para.unwrap();
            assert_eq!(loc.para_id, para_id);
            assert_eq!(usize::from(loc.idx), idx);
        }
        let words: Vec<_> = lexeme.iter().map(|f| f.word.as_str()).collect();
        assert_eq!(words, vec!["книга", "книги", "книги"]);
    }
}

#[test]
fn test_roundtrip_normalized() {
    let morph = sample_analyzer();
    for p in morph.iter_known_parses("") {
        let normalized = morph.normalized(&p).unwrap();
        assert_eq!(normalized.word, p.normal_form);
        assert_eq!(normalized.normal_form, p.normal_form);
        assert_eq!(normalized.para.unwrap().idx, 0);
    }
}

#[test]
fn test_inflect() {
    let morph = sample_analyzer();
    let p = morph.parse("книга").remove(0);

    let plural = morph.inflect(&p, &grammemes(&["plur"])).unwrap().unwrap();
    assert_eq!(plural.word, "книги");
    assert!(morph
        .dictionary()
        .tag_set()
        .get(plural.tag_id)
        .contains("plur"));

    let genitive = morph.inflect(&p, &grammemes(&["gent"])).unwrap().unwrap();
    assert_eq!(genitive.word, "книги");
    assert!(morph
        .dictionary()
        .tag_set()
        .get(genitive.tag_id)
        .contains("gent"));

    // レキシーム内のどの形も持たないグラメームは要求できない
    assert!(morph.inflect(&p, &grammemes(&["Geox"])).unwrap().is_none());
}

#[test]
fn test_inflect_superset_filter() {
    let morph = sample_analyzer();
    let required = grammemes(&["plur"]);
    for p in morph.iter_known_parses("") {
        if let Some(inflected) = morph.inflect(&p, &required).unwrap() {
            let tag = morph.dictionary().tag_set().get(inflected.tag_id);
            assert!(tag.contains_all(&required));
        }
    }
}

#[test]
fn test_fuzzy_yo_lookup() {
    let morph = sample_analyzer();
    let parses = morph.parse("елка");
    assert_eq!(parses.len(), 1);
    // 補正済みの綴りが返される
    assert_eq!(parses[0].word, "ёлка");
    assert_eq!(parses[0].normal_form, "ёлка");
    assert_eq!(parses[0].estimate, 1.0);

    assert!(!morph.word_is_known("елка", true));
    assert!(morph.word_is_known("елка", false));
    assert!(morph.word_is_known("ёлка", true));
}

#[test]
fn test_punctuation_and_numbers() {
    let morph = sample_analyzer();
    let tag_raw = |p: &crate::Parse| morph.dictionary().tag_set().get(p.tag_id).raw().to_string();

    let pnct = morph.parse("...");
    assert_eq!(pnct.len(), 1);
    assert_eq!(tag_raw(&pnct[0]), "PNCT");
    assert!(pnct[0].para.is_none());
    assert!(pnct[0].estimate < 1.0);

    let lexeme = morph.get_lexeme(&pnct[0]).unwrap();
    assert_eq!(lexeme, pnct);
    assert_eq!(morph.normalized(&pnct[0]).unwrap(), pnct[0]);

    assert_eq!(tag_raw(&morph.parse("123")[0]), "NUMB,intg");
    assert_eq!(tag_raw(&morph.parse("-7")[0]), "NUMB,intg");
    assert_eq!(tag_raw(&morph.parse("3.14")[0]), "NUMB,real");
}

#[test]
fn test_latin() {
    let morph = sample_analyzer();
    let parses = morph.parse("hello");
    assert_eq!(parses.len(), 1);
    assert_eq!(
        morph.dictionary().tag_set().get(parses[0].tag_id).raw(),
        "LATN"
    );
}

#[test]
fn test_hyphen_particle() {
    let morph = sample_analyzer();
    let parses = morph.parse("книга-то");
    assert_eq!(parses.len(), 1);
    let p = &parses[0];
    assert_eq!(p.word, "книга-то");
    assert_eq!(p.normal_form, "книга-то");
    assert!((p.estimate - 0.9).abs() < 1e-9);
    assert_eq!(p.last_method().unwrap().kind, MethodKind::HyphenParticle);

    let lexeme = morph.get_lexeme(p).unwrap();
    let words: Vec<_> = lexeme.iter().map(|f| f.word.as_str()).collect();
    assert_eq!(words, vec!["книга-то", "книги-то", "книги-то"]);

    let normalized = morph.normalized(&morph.parse("книги-то")[0]).unwrap();
    assert_eq!(normalized.word, "книга-то");
}

#[test]
fn test_hyphenated_compound() {
    let morph = sample_analyzer();
    let parses = morph.parse("интернет-книга");
    assert_eq!(parses.len(), 1);
    let p = &parses[0];
    assert_eq!(p.word, "интернет-книга");
    assert_eq!(p.normal_form, "интернет-книга");
    assert!((p.estimate - 0.75).abs() < 1e-9);
    assert_eq!(p.last_method().unwrap().kind, MethodKind::Hyphenated);

    let lexeme = morph.get_lexeme(p).unwrap();
    assert_eq!(lexeme.len(), 3);
    assert_eq!(lexeme[1].word, "интернет-книги");
}

#[test]
fn test_known_prefix() {
    let morph = sample_analyzer();
    let parses = morph.parse("псевдокнига");
    assert_eq!(parses.len(), 1);
    let p = &parses[0];
    assert_eq!(p.word, "псевдокнига");
    assert_eq!(p.normal_form, "псевдокнига");
    assert!((p.estimate - 0.75).abs() < 1e-9);
    assert_eq!(p.methods[0].kind, MethodKind::Dictionary);
    assert_eq!(p.last_method().unwrap().kind, MethodKind::KnownPrefix);
    assert_eq!(p.last_method().unwrap().word, "псевдо");

    let lexeme = morph.get_lexeme(p).unwrap();
    let words: Vec<_> = lexeme.iter().map(|f| f.word.as_str()).collect();
    assert_eq!(words, vec!["псевдокнига", "псевдокниги", "псевдокниги"]);

    let normalized = morph.normalized(&morph.parse("псевдокниги")[0]).unwrap();
    assert_eq!(normalized.word, "псевдокнига");
}

#[test]
fn test_unknown_prefix() {
    let morph = sample_analyzer();
    let parses = morph.parse("апкнига");
    assert_eq!(parses.len(), 1);
    let p = &parses[0];
    assert_eq!(p.word, "апкнига");
    assert_eq!(p.normal_form, "апкнига");
    assert!((p.estimate - 0.5).abs() < 1e-9);
    assert_eq!(p.last_method().unwrap().kind, MethodKind::UnknownPrefix);
    assert_eq!(p.last_method().unwrap().word, "ап");

    let lexeme = morph.get_lexeme(p).unwrap();
    assert_eq!(lexeme.len(), 3);
    assert_eq!(lexeme[0].word, "апкнига");
}

#[test]
fn test_known_suffix() {
    let morph = sample_analyzer();
    let parses = morph.parse("шпага");
    assert_eq!(parses.len(), 1);
    let p = &parses[0];
    assert_eq!(p.word, "шпага");
    assert_eq!(p.normal_form, "шпага");
    // 接尾辞"га"は長さ2の観測6件中1件
    assert!((p.estimate - 0.5 / 6.0).abs() < 1e-9);
    assert_eq!(p.last_method().unwrap().kind, MethodKind::KnownSuffix);
    assert_eq!(p.last_method().unwrap().word, "га");

    let lexeme = morph.get_lexeme(p).unwrap();
    let words: Vec<_> = lexeme.iter().map(|f| f.word.as_str()).collect();
    assert_eq!(words, vec!["шпага", "шпаги", "шпаги"]);

    let plural = morph.inflect(p, &grammemes(&["plur"])).unwrap().unwrap();
    assert_eq!(plural.word, "шпаги");
}

#[test]
fn test_confidence_invariant() {
    let morph = sample_analyzer();
    for p in morph.parse("книги") {
        assert_eq!(p.estimate, 1.0);
    }
    for word in ["...", "hello", "книга-то", "псевдокнига", "шпага"] {
        for p in morph.parse(word) {
            assert!(p.estimate < 1.0, "heuristic parse of {word:?} scored 1.0");
        }
    }
}

#[test]
fn test_normal_forms_dedup() {
    let morph = sample_analyzer();
    assert_eq!(morph.normal_forms("книги"), vec!["книга"]);
    assert_eq!(morph.normal_forms("елка"), vec!["ёлка"]);
}

#[test]
fn test_iter_known_parses_prefix() {
    let morph = sample_analyzer();
    let words: Vec<_> = morph.iter_known_parses("ёл").map(|p| p.word).collect();
    assert_eq!(words, vec!["ёлка", "ёлки", "ёлки"]);

    // 呼び出しごとに独立して再開できる
    assert_eq!(morph.iter_known_parses("ёл").count(), 3);
    assert_eq!(morph.iter_known_parses("").count(), 6);
}

#[test]
fn test_get_lexeme_contract_violation() {
    let morph = sample_analyzer();
    let guessed = morph.parse("шпага").remove(0);
    // 辞書以外が生成した解釈を辞書へ直接渡すと契約違反になる
    let result = morph.dictionary().get_lexeme(&guessed);
    assert!(matches!(result, Err(MorfemaError::InvalidState(_))));

    let mut orphan = morph.parse("книга").remove(0);
    orphan.methods.clear();
    assert!(morph.get_lexeme(&orphan).is_err());
}

#[test]
fn test_bound_parse() {
    let morph = sample_analyzer();
    let bound = morph.parse_bound("книги");
    assert_eq!(bound.len(), 2);
    assert_eq!(bound[0].word(), "книги");
    assert_eq!(bound[0].normal_form(), "книга");
    assert!(bound[0].is_known());
    assert_eq!(bound[0].paradigm().unwrap().len(), 3);

    let normalized = bound[0].normalized().unwrap();
    assert_eq!(normalized.word(), "книга");

    let inflected = bound[0].inflect(&grammemes(&["nomn", "sing"])).unwrap();
    assert_eq!(inflected.unwrap().word(), "книга");
}
