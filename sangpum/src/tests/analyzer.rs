use crate::analyzer::{Analyzer, AnalyzerOption};
use crate::chars::TokenType;
use crate::dictionary::{
    CompoundDictionary, DictionaryEntry, DictionaryKind, DictionarySource, NounLevel,
    ProductNameDictionary, SetDictionary, SourceDictionary, SpaceDictionary, SynonymDictionary,
    TagProbDictionary,
};
use crate::token::TokenBuf;
use crate::utils::hashmap;

#[track_caller]
fn build_dictionary() -> ProductNameDictionary {
    let system = TagProbDictionary::from_lines(
        [
            "노트북\tNNG\t-5.0",
            "케이스\tNNG\t-6.0",
            "가방\tNNG\t-5.5",
            "무선\tNNG\t-6.0",
            "마우스\tNNG\t-6.0",
            "무료\tNNG\t-6.0",
            "배송\tNNG\t-6.0",
            "랩탑\tNNG\t-7.0",
            "티비\tNNG\t-7.0",
        ],
        true,
    );
    let unit = SetDictionary::from_lines(["cm", "gb", "kg"], true);
    let unit_synonym = SynonymDictionary::from_lines(["cm\t센티,센티미터"], true);
    let synonym = SynonymDictionary::from_lines(["노트북\t랩탑", "\tTV,티비"], true);
    let stop = SetDictionary::from_lines(["무료"], true);
    let compound = CompoundDictionary::from_lines(["노트북케이스\t노트북,케이스"], true);
    let space = SpaceDictionary::from_lines(["무선 마우스"], true);
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
                "synonym",
                DictionaryKind::Synonym2Way,
                SourceDictionary::Synonym(synonym),
            ),
            DictionaryEntry::new("stop", DictionaryKind::Set, SourceDictionary::Set(stop)),
            DictionaryEntry::new(
                "compound",
                DictionaryKind::Compound,
                SourceDictionary::Compound(compound),
            )
            .with_level(Some(NounLevel::Max)),
            DictionaryEntry::new("space", DictionaryKind::Space, SourceDictionary::Space(space)),
        ],
    )
}

fn analyze(analyzer: &Analyzer, text: &str) -> Vec<TokenBuf> {
    let mut worker = analyzer.new_worker();
    worker.reset_sentence(text);
    worker.analyze();
    worker.token_iter().map(TokenBuf::from).collect()
}

fn summary(tokens: &[TokenBuf]) -> Vec<(&str, TokenType, u32)> {
    tokens
        .iter()
        .map(|t| (t.surface.as_str(), t.token_type, t.position_increment))
        .collect()
}

fn index_analyzer() -> Analyzer {
    Analyzer::new(build_dictionary())
}

fn query_analyzer() -> Analyzer {
    Analyzer::new(build_dictionary()).option(AnalyzerOption::default().use_for_query(true))
}

#[test]
fn test_unit_for_index() {
    let tokens = analyze(&index_analyzer(), "1024cm");
    assert_eq!(
        summary(&tokens),
        vec![("1024cm", TokenType::Unit, 1), ("1024", TokenType::Number, 0)]
    );
    assert_eq!(tokens[0].range_char, 0..6);
    assert_eq!(tokens[1].range_char, 0..4);
}

#[test]
fn test_unit_for_query() {
    let tokens = analyze(&query_analyzer(), "1024cm");
    assert_eq!(summary(&tokens), vec![("1024cm", TokenType::Unit, 1)]);
    assert_eq!(tokens[0].synonyms, vec!["1024센티", "1024센티미터"]);
    assert!(tokens[0].extra_terms.is_empty());
}

#[test]
fn test_unit_synonyms_can_be_disabled() {
    let analyzer = Analyzer::new(build_dictionary())
        .option(AnalyzerOption::default().use_for_query(true).use_synonym(false));
    let tokens = analyze(&analyzer, "1024cm");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].synonyms.is_empty());
}

#[test]
fn test_number_with_comma_for_index() {
    let tokens = analyze(&index_analyzer(), "1,024gb");
    assert_eq!(
        summary(&tokens),
        vec![
            ("1,024gb", TokenType::Unit, 1),
            ("1024gb", TokenType::Unit, 0),
            ("1,024", TokenType::Number, 0),
            ("1024", TokenType::Number, 0),
        ]
    );
    assert_eq!(tokens[3].range_char, 0..5);
}

#[test]
fn test_number_with_comma_for_query() {
    let tokens = analyze(&query_analyzer(), "1,024gb");
    assert_eq!(summary(&tokens), vec![("1,024gb", TokenType::Unit, 1)]);
    let extra: Vec<_> = tokens[0].extra_terms.iter().map(|e| e.term.as_str()).collect();
    assert_eq!(extra, vec!["1024gb"]);
    assert_eq!(tokens[0].extra_terms[0].token_type, TokenType::Unit);
}

#[test]
fn test_number_with_comma_alone_for_query() {
    let tokens = analyze(&query_analyzer(), "1,024");
    assert_eq!(summary(&tokens), vec![("1,024", TokenType::Number, 1)]);
    let extra: Vec<_> = tokens[0].extra_terms.iter().map(|e| e.term.as_str()).collect();
    assert_eq!(extra, vec!["1024"]);
    assert_eq!(tokens[0].extra_terms[0].token_type, TokenType::Number);

    let tokens = analyze(&query_analyzer(), "12,345,678");
    assert_eq!(summary(&tokens), vec![("12,345,678", TokenType::Number, 1)]);
    let extra: Vec<_> = tokens[0].extra_terms.iter().map(|e| e.term.as_str()).collect();
    assert_eq!(extra, vec!["12345678"]);
}

#[test]
fn test_model_name() {
    let tokens = analyze(&index_analyzer(), "i7-4700mq");
    assert_eq!(tokens[0].surface, "i7-4700mq");
    assert_eq!(tokens[0].token_type, TokenType::ModelName);
    assert_eq!(tokens[0].range_char, 0..9);
    assert_eq!(tokens[0].position_increment, 1);
    let subs: Vec<_> = tokens[1..].iter().map(|t| t.surface.as_str()).collect();
    for part in ["i7", "4700", "mq"] {
        assert!(subs.contains(&part), "missing {part} in {subs:?}");
    }
    assert!(tokens[1..].iter().all(|t| t.position_increment == 0));

    let tokens = analyze(&query_analyzer(), "i7-4700mq");
    assert_eq!(tokens.len(), 1);
    let extra: Vec<_> = tokens[0].extra_terms.iter().map(|e| e.term.as_str()).collect();
    assert_eq!(extra, vec!["i7", "4700", "mq"]);
}

#[test]
fn test_hangul_and_number() {
    let tokens = analyze(&index_analyzer(), "문학100개");
    let got: Vec<_> = tokens
        .iter()
        .map(|t| (t.surface.as_str(), t.token_type, t.range_char.clone()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("문학", TokenType::Hangul, 0..2),
            ("100", TokenType::Number, 2..5),
            ("개", TokenType::Hangul, 5..6),
        ]
    );
}

#[test]
fn test_stopword() {
    let tokens = analyze(&index_analyzer(), "무료 배송");
    assert_eq!(summary(&tokens), vec![("배송", TokenType::Hangul, 1)]);

    let tokens = analyze(&query_analyzer(), "무료 배송");
    assert_eq!(summary(&tokens), vec![("배송", TokenType::Hangul, 1)]);

    let analyzer = Analyzer::new(build_dictionary())
        .option(AnalyzerOption::default().use_stopword(false));
    let tokens = analyze(&analyzer, "무료 배송");
    assert_eq!(
        summary(&tokens),
        vec![("무료", TokenType::Stopword, 1), ("배송", TokenType::Hangul, 1)]
    );
}

#[test]
fn test_dictionary_synonym_for_query() {
    let tokens = analyze(&query_analyzer(), "노트북");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].synonyms, vec!["랩탑"]);
}

#[test]
fn test_two_way_synonym() {
    let analyzer = query_analyzer();
    let tokens = analyze(&analyzer, "tv");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].synonyms.iter().any(|s| s == "티비"), "{:?}", tokens[0].synonyms);

    let tokens = analyze(&analyzer, "티비");
    assert_eq!(tokens.len(), 1);
    assert!(
        tokens[0].synonyms.iter().any(|s| s.eq_ignore_ascii_case("tv")),
        "{:?}",
        tokens[0].synonyms
    );
}

#[test]
fn test_compound() {
    let tokens = analyze(&index_analyzer(), "노트북케이스");
    assert_eq!(
        summary(&tokens),
        vec![
            ("노트북케이스", TokenType::Compound, 1),
            ("노트북", TokenType::Compound, 0),
            ("케이스", TokenType::Compound, 0),
        ]
    );
    assert!(tokens.iter().all(|t| t.range_char == (0..6)));

    let tokens = analyze(&query_analyzer(), "노트북케이스");
    assert_eq!(summary(&tokens), vec![("노트북케이스", TokenType::Hangul, 1)]);
    assert!(tokens[0].extra_terms.is_empty());
}

#[test]
fn test_uppercase() {
    let analyzer = Analyzer::new(build_dictionary())
        .option(AnalyzerOption::default().to_uppercase(true));
    let tokens = analyze(&analyzer, "tv");
    assert_eq!(tokens[0].surface, "TV");
    assert_eq!(tokens[0].range_byte, 0..2);
}

#[test]
fn test_full_string() {
    let analyzer = Analyzer::new(build_dictionary()).option(
        AnalyzerOption::default()
            .use_for_query(true)
            .use_full_string(true),
    );
    let tokens = analyze(&analyzer, "노트북 가방");
    let got: Vec<_> = tokens.iter().map(|t| t.surface.as_str()).collect();
    assert_eq!(got, vec!["노트북 가방", "노트북", "가방"]);
    assert_eq!(tokens[0].token_type, TokenType::FullString);
    assert_eq!(tokens[0].range_char, 0..6);

    // Only the query output carries the full string.
    let analyzer = Analyzer::new(build_dictionary())
        .option(AnalyzerOption::default().use_full_string(true));
    let tokens = analyze(&analyzer, "노트북 가방");
    assert!(tokens.iter().all(|t| t.token_type != TokenType::FullString));
}

#[test]
fn test_positions_are_ordered() {
    let analyzer = index_analyzer();
    let cases = hashmap![
        "노트북 1024cm 가방" => 3,
        "무선 마우스 i7-4700mq" => 3,
        "  가방  " => 1,
    ];
    for (text, expected) in cases {
        let tokens = analyze(&analyzer, text);
        let main: Vec<_> = tokens.iter().filter(|t| t.position_increment == 1).collect();
        assert_eq!(main.len(), expected, "input: {text}");
        for pair in main.windows(2) {
            assert!(pair[0].range_char.start <= pair[1].range_char.start, "input: {text}");
        }
        for t in &tokens {
            assert!(t.range_byte.end <= text.len());
        }
    }
}

#[test]
fn test_empty_input() {
    let analyzer = index_analyzer();
    let mut worker = analyzer.new_worker();
    worker.reset_sentence("");
    worker.analyze();
    assert_eq!(worker.num_tokens(), 0);

    worker.reset_sentence("   ");
    worker.analyze();
    assert_eq!(worker.num_tokens(), 0);
}

#[test]
fn test_worker_is_reusable() {
    let analyzer = index_analyzer();
    let mut worker = analyzer.new_worker();
    worker.reset_sentence("1024cm");
    worker.analyze();
    assert_eq!(worker.num_tokens(), 2);

    worker.reset_sentence("가방");
    worker.analyze();
    assert_eq!(worker.num_tokens(), 1);
    assert_eq!(worker.token(0).surface(), "가방");
}
