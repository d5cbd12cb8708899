use std::fs;

use crate::analyzer::{Analyzer, AnalyzerOption};
use crate::chars::TokenType;
use crate::dictionary::{
    DictionaryManifest, DictionarySource, ProductNameDictionary, SetDictionary,
    SynonymDictionary, TagProbDictionary,
};

#[test]
fn test_analyze_with_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();

    let system = TagProbDictionary::from_lines(["노트북\tNNG\t-5.0"], true);
    fs::write(data.join("system.bin"), system.to_bytes().unwrap()).unwrap();
    let unit = SetDictionary::from_lines(["cm"], true);
    fs::write(data.join("unit.bin"), unit.to_bytes().unwrap()).unwrap();
    let unit_synonym = SynonymDictionary::from_lines(["cm\t센티"], true);
    fs::write(data.join("unit_synonym.bin"), unit_synonym.to_bytes().unwrap()).unwrap();

    let yaml = format!(
        "\
basePath: {}
dictionary:
  - name: system
    type: SYSTEM
    filePath: system.bin
  - name: unit
    type: set
    filePath: unit.bin
  - name: unit_synonym
    type: synonym
    filePath: unit_synonym.bin
",
        data.display()
    );
    let manifest = DictionaryManifest::load_from_str(&yaml, dir.path()).unwrap();
    let dict = ProductNameDictionary::load(&manifest);
    assert_eq!(dict.handles().len(), 2);

    let analyzer = Analyzer::new(dict).option(AnalyzerOption::default().use_for_query(true));
    let mut worker = analyzer.new_worker();
    worker.reset_sentence("노트북 30cm");
    worker.analyze();

    assert_eq!(worker.num_tokens(), 2);
    assert_eq!(worker.token(0).surface(), "노트북");
    assert_eq!(worker.token(1).surface(), "30cm");
    assert_eq!(worker.token(1).token_type(), TokenType::Unit);
    assert_eq!(worker.token(1).synonyms(), &["30센티"]);
}

#[test]
fn test_manifest_without_files_still_analyzes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manifest.yml");
    fs::write(
        &path,
        "dictionary:\n  - name: system\n    type: system\n  - name: unit\n    type: set\n",
    )
    .unwrap();

    let dict = ProductNameDictionary::load_manifest(&path).unwrap();
    let mut worker = Analyzer::new(dict).new_worker();
    worker.reset_sentence("가방 30cm");
    worker.analyze();
    assert!(worker.num_tokens() > 0);
    assert!(worker.token_iter().all(|t| t.token_type() != TokenType::Unit));
}

#[test]
fn test_broken_manifest_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manifest.yml");
    fs::write(&path, "dictionary: [name: {").unwrap();
    assert!(ProductNameDictionary::load_manifest(&path).is_err());
    assert!(ProductNameDictionary::load_manifest(dir.path().join("missing.yml")).is_err());
}
