use std::sync::Arc;

use crate::analyzer::AnalyzerOption;
use crate::char_window::CharWindow;
use crate::chars::TokenType;
use crate::dictionary::{
    CompoundDictionary, DictionaryEntry, DictionaryKind, DictionarySource, PosTag,
    ProductNameDictionary, SetDictionary, SourceDictionary, SpaceDictionary, SynonymDictionary,
    TagProbDictionary,
};
use crate::extractor::Extractor;
use crate::rule::{ParsingRule, RuleEntry};
use crate::segmenter::split_runs;

#[track_caller]
fn build_dictionary() -> ProductNameDictionary {
    let system = TagProbDictionary::from_lines(["노트북\tNNG\t-5.0", "케이스\tNNG\t-6.0"], true);
    let unit = SetDictionary::from_lines(["cm", "gb", "mm"], true);
    let unit_synonym = SynonymDictionary::from_lines(["cm\t센티,센티미터"], true);
    let compound = CompoundDictionary::from_lines(["노트북케이스\t노트북,케이스"], true);
    let space = SpaceDictionary::from_lines(["무선 마우스"], true);
    let stop = SetDictionary::from_lines(["무료"], true);
    ProductNameDictionary::from_parts(
        system,
        [
            DictionaryEntry::new("unit", DictionaryKind::Set, SourceDictionary::Set(unit)),
            DictionaryEntry::new(
                "unit_synonym",
                DictionaryKind::Synonym,
                SourceDictionary::Synonym(unit_synonym),
            ),
            DictionaryEntry::new(
                "compound",
                DictionaryKind::Compound,
                SourceDictionary::Compound(compound),
            ),
            DictionaryEntry::new("space", DictionaryKind::Space, SourceDictionary::Space(space)),
            DictionaryEntry::new("stop", DictionaryKind::Set, SourceDictionary::Set(stop)),
        ],
    )
}

/// 文字種別の区間ごとに語を並べます。抽出器が区間をそのまま返した場合と同じ並びです。
fn queue_of(text: &str) -> Vec<RuleEntry> {
    let chars: Arc<[char]> = text.chars().collect();
    let mut list = vec![];
    for run in split_runs(&chars) {
        let tag = match run.char_type {
            TokenType::Alpha => Some(PosTag::ALPHA),
            TokenType::Number => Some(PosTag::DIGIT),
            TokenType::Symbol => Some(PosTag::SYMBOL),
            _ => None,
        };
        ParsingRule::add_entry(
            &mut list,
            &chars,
            run.range.clone(),
            Some(run.char_type),
            tag,
            run.range,
            None,
        );
    }
    list
}

#[track_caller]
fn process(dict: &ProductNameDictionary, option: AnalyzerOption, text: &str) -> Vec<RuleEntry> {
    let snapshot = dict.snapshot();
    let mut rule = ParsingRule::new(&snapshot, option);
    let mut queue = queue_of(text);
    rule.init(&queue);
    rule.process(&mut queue, true);
    queue
}

fn summary(queue: &[RuleEntry]) -> Vec<(String, Option<TokenType>, std::ops::Range<usize>)> {
    queue
        .iter()
        .map(|e| (e.surface(), e.token_type(), e.range()))
        .collect()
}

fn surfaces(queue: &[RuleEntry]) -> Vec<String> {
    queue.iter().map(RuleEntry::surface).collect()
}

#[test]
fn test_unit_detection() {
    let dict = build_dictionary();
    let queue = process(&dict, AnalyzerOption::default(), "1024cm");
    assert_eq!(
        summary(&queue),
        vec![("1024cm".to_string(), Some(TokenType::UnitAlpha), 0..6)]
    );
    let sub = queue[0].sub_entries();
    assert_eq!(
        summary(sub),
        vec![("1024".to_string(), Some(TokenType::Number), 0..4)]
    );
}

#[test]
fn test_unit_synonyms_for_query() {
    let dict = build_dictionary();
    let option = AnalyzerOption::default().use_for_query(true);
    let queue = process(&dict, option, "1024cm");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].synonyms(), &["1024센티", "1024센티미터"]);
}

#[test]
fn test_number_with_comma_and_unit() {
    let dict = build_dictionary();
    let queue = process(&dict, AnalyzerOption::default(), "1,024gb");
    assert_eq!(
        summary(&queue),
        vec![("1,024gb".to_string(), Some(TokenType::UnitAlpha), 0..7)]
    );
    assert_eq!(
        summary(queue[0].sub_entries()),
        vec![
            ("1024gb".to_string(), Some(TokenType::Unit), 0..7),
            ("1,024".to_string(), Some(TokenType::NumberTrans), 0..5),
        ]
    );
}

#[test]
fn test_number_pattern() {
    let dict = build_dictionary();
    let queue = process(&dict, AnalyzerOption::default(), "1,024");
    assert_eq!(
        summary(&queue),
        vec![("1,024".to_string(), Some(TokenType::NumberTrans), 0..5)]
    );
}

#[test]
fn test_model_name() {
    let dict = build_dictionary();
    let queue = process(&dict, AnalyzerOption::default(), "i7-4700mq");
    assert_eq!(
        summary(&queue),
        vec![("i7-4700mq".to_string(), Some(TokenType::ModelName), 0..9)]
    );
    assert_eq!(surfaces(queue[0].sub_entries()), vec!["i7", "74700", "4700", "mq"]);
}

#[test]
fn test_model_name_for_query() {
    let dict = build_dictionary();
    let option = AnalyzerOption::default().use_for_query(true);
    let queue = process(&dict, option, "i7-4700mq");
    assert_eq!(queue.len(), 1);
    assert_eq!(surfaces(queue[0].sub_entries()), vec!["i7", "4700", "mq"]);
}

#[test]
fn test_hangul_and_number() {
    let dict = build_dictionary();
    let queue = process(&dict, AnalyzerOption::default(), "문학100개");
    assert_eq!(
        summary(&queue),
        vec![
            ("문학".to_string(), Some(TokenType::Hangul), 0..2),
            ("100".to_string(), Some(TokenType::Number), 2..5),
            ("개".to_string(), Some(TokenType::Hangul), 5..6),
        ]
    );
}

#[test]
fn test_dimension() {
    let dict = build_dictionary();
    let queue = process(&dict, AnalyzerOption::default(), "120x60cm");
    assert_eq!(
        summary(&queue),
        vec![
            ("120".to_string(), Some(TokenType::Number), 0..3),
            ("60cm".to_string(), Some(TokenType::UnitAlpha), 4..8),
        ]
    );
}

#[test]
fn test_long_number_is_model_name() {
    let dict = build_dictionary();
    let queue = process(&dict, AnalyzerOption::default(), "가방 123456");
    assert_eq!(
        summary(&queue),
        vec![
            ("가방".to_string(), Some(TokenType::Hangul), 0..2),
            ("123456".to_string(), Some(TokenType::ModelName), 3..9),
        ]
    );
}

#[test]
fn test_space_dictionary_split() {
    let dict = build_dictionary();
    let snapshot = dict.snapshot();
    let chars: Arc<[char]> = "무선마우스".chars().collect();
    let mut list = vec![];
    ParsingRule::add_entry(
        &mut list,
        &chars,
        0..5,
        None,
        Some(PosTag::N),
        0..5,
        snapshot.space("space"),
    );
    let got: Vec<_> = list.iter().map(|e| (e.surface(), e.range())).collect();
    assert_eq!(
        got,
        vec![
            ("무선".to_string(), 0..2),
            (String::new(), 2..2),
            ("마우스".to_string(), 2..5),
        ]
    );

    let mut rule = ParsingRule::new(&snapshot, AnalyzerOption::default());
    rule.init(&list);
    rule.process(&mut list, true);
    assert_eq!(surfaces(&list), vec!["무선", "마우스"]);
}

#[test]
fn test_compound_expansion() {
    let dict = build_dictionary();
    let snapshot = dict.snapshot();
    let chars: Arc<[char]> = "노트북케이스".chars().collect();
    let mut queue = vec![RuleEntry::new(chars, 0, 6, 0, 6, Some(TokenType::Hangul))];

    let mut rule = ParsingRule::new(&snapshot, AnalyzerOption::default());
    rule.init(&queue);
    rule.process(&mut queue, true);
    assert_eq!(queue[0].token_type(), Some(TokenType::Compound));
    assert_eq!(
        summary(queue[0].sub_entries()),
        vec![
            ("노트북".to_string(), Some(TokenType::Compound), 0..6),
            ("케이스".to_string(), Some(TokenType::Compound), 0..6),
        ]
    );

    let option = AnalyzerOption::default().use_for_query(true);
    let mut rule = ParsingRule::new(&snapshot, option);
    let chars: Arc<[char]> = "노트북케이스".chars().collect();
    let mut queue = vec![RuleEntry::new(chars, 0, 6, 0, 6, Some(TokenType::Hangul))];
    rule.init(&queue);
    rule.process(&mut queue, true);
    assert_eq!(queue[0].token_type(), Some(TokenType::Hangul));
    assert!(queue[0].sub_entries().is_empty());
}

#[test]
fn test_lone_symbol_is_not_processed() {
    let dict = build_dictionary();
    let snapshot = dict.snapshot();
    let rule = ParsingRule::new(&snapshot, AnalyzerOption::default());
    let mut queue = queue_of("#");
    assert!(!rule.process(&mut queue, true));
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_idempotent() {
    let dict = build_dictionary();
    let snapshot = dict.snapshot();
    for text in ["1024cm", "i7-4700mq", "문학100개", "120x60cm", "1,024gb 노트북"] {
        let mut rule = ParsingRule::new(&snapshot, AnalyzerOption::default());
        let mut queue = queue_of(text);
        rule.init(&queue);
        rule.process(&mut queue, true);
        let first = format!("{queue:?}");

        rule.init(&queue);
        rule.process(&mut queue, true);
        assert_eq!(first, format!("{queue:?}"), "input: {text}");
    }
}

#[test]
fn test_synonym_extract() {
    let dict = build_dictionary();
    let snapshot = dict.snapshot();
    let rule = ParsingRule::new(&snapshot, AnalyzerOption::default().use_for_query(true));
    let mut extractor = Extractor::new();
    let entry = RuleEntry::from_str("노트북가방", 3, 8, Some(TokenType::Hangul));
    let synonyms = [
        CharWindow::from_str("노트북 케이스", true),
        CharWindow::from_str("케이스", true),
        CharWindow::from_str("노트북  케이스", true),
    ];
    let result = rule.synonym_extract(&mut extractor, &synonyms, &entry);
    assert_eq!(result, vec!["노트북 케이스", "케이스"]);
}
