//! 入力から規則処理前の語の列を作ります。

use crate::chars::{char_type, term_type, TokenType};
use crate::common::{DICT_SPACE, FULL_TERM_LENGTH};
use crate::dictionary::DictionarySnapshot;
use crate::extractor::Extractor;
use crate::rule::{ParsingRule, RuleEntry};
use crate::segmenter::split_runs;
use crate::sentence::Sentence;

/// 入力を文字種別の区間に分け、区間ごとに抽出器で語に分割します。
///
/// 前後の空白を除いた長さが[`FULL_TERM_LENGTH`]未満の入力では、
/// 入力全体を表す`FULL_STRING`の語を先頭に置きます。
///
/// 抽出器の幅を超える区間は幅ごとに分割します。窓の最後の語が窓全体でない場合は、
/// その語を捨てて続きの文字と一緒に分割し直します。
///
/// `peak`には抽出器のキューが達した最大長を記録します。
pub(crate) fn collect_entries(
    extractor: &mut Extractor,
    snapshot: &DictionarySnapshot,
    sent: &Sentence,
    peak: &mut usize,
) -> Vec<RuleEntry> {
    let chars = sent.chars();
    let space = snapshot.space(DICT_SPACE);
    let system = snapshot.system();
    let mut list = vec![];

    let is_space = |c: &&char| char_type(**c) == TokenType::Whitespace;
    let head = chars.iter().take_while(is_space).count();
    let tail = chars[head..].iter().rev().take_while(is_space).count();
    let trimmed = head..chars.len() - tail;
    if !trimmed.is_empty() && trimmed.len() < FULL_TERM_LENGTH {
        ParsingRule::add_entry(
            &mut list,
            chars,
            trimmed.clone(),
            Some(TokenType::FullString),
            None,
            trimmed,
            None,
        );
    }

    let width = extractor.width();
    for run in split_runs(chars) {
        let mut pos = run.range.start;
        let mut prev_offset = 0;
        while pos < run.range.end {
            let window_end = run.range.end.min(pos + width);
            let mut segments = extractor.extract(system, chars, pos..window_end);
            *peak = (*peak).max(extractor.peak_queue_len());
            let mut next = window_end;
            if window_end < run.range.end && segments.len() > 1 {
                if let Some(last) = segments.last().filter(|s| s.len() != window_end - pos) {
                    next = last.offset();
                    segments.pop();
                }
            }
            for segment in segments {
                if segment.is_empty() || segment.offset() < prev_offset {
                    continue;
                }
                prev_offset = segment.offset();
                let range = segment.range();
                let token_type = chars.get(range.clone()).map(term_type);
                ParsingRule::add_entry(
                    &mut list,
                    chars,
                    range.clone(),
                    token_type,
                    Some(segment.tag()),
                    range,
                    space,
                );
            }
            pos = next;
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::{DictionarySource, ProductNameDictionary, TagProbDictionary};
    use crate::extractor::Extractor;

    fn surfaces(list: &[RuleEntry]) -> Vec<(String, Option<TokenType>)> {
        list.iter().map(|e| (e.surface(), e.token_type())).collect()
    }

    #[test]
    fn test_full_string_and_runs() {
        let system = TagProbDictionary::from_lines(["노트북\tNNG\t-5.0"], true);
        let dict = ProductNameDictionary::from_parts(system, []);
        let snapshot = dict.snapshot();
        let mut sent = Sentence::new();
        sent.set_sentence(" 노트북 15 ");
        let mut extractor = Extractor::new();

        let list = collect_entries(&mut extractor, &snapshot, &sent, &mut 0);
        assert_eq!(
            surfaces(&list),
            vec![
                ("노트북 15".to_string(), Some(TokenType::FullString)),
                ("노트북".to_string(), Some(TokenType::Hangul)),
                ("15".to_string(), Some(TokenType::Number)),
            ]
        );
        assert_eq!(list[0].range(), 1..7);
        assert_eq!(list[2].range(), 5..7);
    }

    #[test]
    fn test_long_input_has_no_full_string() {
        let dict = ProductNameDictionary::from_parts(TagProbDictionary::default(), []);
        let snapshot = dict.snapshot();
        let mut sent = Sentence::new();
        sent.set_sentence("a ".repeat(40));
        let mut extractor = Extractor::new();

        let list = collect_entries(&mut extractor, &snapshot, &sent, &mut 0);
        assert_eq!(list.len(), 40);
        assert!(list.iter().all(|e| !e.is_type(TokenType::FullString)));
    }

    #[test]
    fn test_long_run_covers_input() {
        let system = TagProbDictionary::from_lines(["가방\tNNG\t-5.0"], true);
        let dict = ProductNameDictionary::from_parts(system, []);
        let snapshot = dict.snapshot();
        let mut sent = Sentence::new();
        sent.set_sentence("가방".repeat(70));
        let mut extractor = Extractor::new();

        let list = collect_entries(&mut extractor, &snapshot, &sent, &mut 0);
        let mut pos = 0;
        for entry in &list {
            assert_eq!(entry.start(), pos);
            pos = entry.end();
        }
        assert_eq!(pos, 140);
    }
}
