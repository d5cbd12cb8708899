//! 規則適用後の語の列を出力語に整形します。
//!
//! 検索語用では1語を1位置に出力し、副語を付加語として添えます。
//! 索引用では主の語に続けて、同義語と副語を同じ位置の別形として出力します。

use std::collections::VecDeque;
use std::mem;

use crate::analyzer::AnalyzerOption;
use crate::char_window::CharWindow;
use crate::chars::TokenType;
use crate::common::{DICT_STOP, DICT_SYNONYM};
use crate::dictionary::{DictionarySnapshot, SetDictionary, SynonymDictionary};
use crate::extractor::Extractor;
use crate::rule::{ParsingRule, RuleEntry};
use crate::token::{ExtraTerm, TokenRecord};

pub(crate) struct AnalysisFilter<'a> {
    rule: ParsingRule<'a>,
    synonym: Option<&'a SynonymDictionary>,
    stop: Option<&'a SetDictionary>,
    option: AnalyzerOption,
}

impl<'a> AnalysisFilter<'a> {
    pub(crate) fn new(snapshot: &'a DictionarySnapshot, rule: ParsingRule<'a>) -> Self {
        Self {
            option: *rule.option(),
            rule,
            synonym: snapshot.synonym(DICT_SYNONYM),
            stop: snapshot.set(DICT_STOP),
        }
    }

    /// 語の列を出力語に変換して`tokens`に追加します。
    pub(crate) fn apply(
        &self,
        extractor: &mut Extractor,
        entries: Vec<RuleEntry>,
        tokens: &mut Vec<TokenRecord>,
    ) {
        for entry in entries {
            if self.option.for_query() {
                self.emit_query(extractor, entry, tokens);
            } else {
                self.emit_index(entry, tokens);
            }
        }
    }

    /// 出力直前の種別の正規化。
    ///
    /// 区切り記号を除いた形が元と異なる数字では、その形を返します。
    fn normalize(&self, entry: &mut RuleEntry, parent: Option<TokenType>) -> Option<String> {
        match entry.token_type {
            Some(TokenType::Number)
                if entry.length >= 5 && matches!(parent, None | Some(TokenType::ModelName)) =>
            {
                entry.token_type = Some(TokenType::ModelName);
            }
            Some(TokenType::UnitAlpha) => entry.token_type = Some(TokenType::Unit),
            Some(TokenType::NumberTrans) => {
                entry.token_type = Some(TokenType::Number);
                let plain: String = entry.term().iter().filter(|&&c| c != ',').collect();
                if plain.chars().count() != entry.length {
                    return Some(plain);
                }
            }
            None => entry.token_type = Some(TokenType::Uncategorized),
            _ => {}
        }
        None
    }

    #[inline(always)]
    fn is_stop(&self, entry: &RuleEntry) -> bool {
        self.stop.is_some_and(|d| d.contains(entry.key()))
    }

    fn cased(&self, term: String) -> String {
        if self.option.uppercase() {
            term.to_uppercase()
        } else {
            term
        }
    }

    fn dictionary_synonyms(&self, entry: &RuleEntry) -> Option<&'a [CharWindow]> {
        if !self.option.synonym() {
            return None;
        }
        self.synonym.and_then(|d| d.get(entry.key()))
    }

    fn emit_query(&self, extractor: &mut Extractor, mut entry: RuleEntry, tokens: &mut Vec<TokenRecord>) {
        // The number of a unit is not searched on its own.
        if entry.is_any_type(&[TokenType::Unit, TokenType::UnitAlpha]) {
            entry
                .sub_entries
                .retain(|sub| !sub.is_any_type(&[TokenType::Number, TokenType::NumberTrans]));
        }

        let mut extra_terms = vec![];
        if let Some(plain) = self.normalize(&mut entry, None) {
            extra_terms.push(ExtraTerm {
                term: self.cased(plain),
                token_type: TokenType::Number,
                synonyms: vec![],
            });
        }
        let mut token_type = entry.token_type.unwrap_or(TokenType::Uncategorized);

        let mut synonyms = match self.dictionary_synonyms(&entry) {
            Some(found) if token_type != TokenType::Unit => {
                self.rule.synonym_extract(extractor, found, &entry)
            }
            Some(found) => found.iter().map(ToString::to_string).collect(),
            None => vec![],
        };
        if self.option.synonym() {
            synonyms.append(&mut entry.synonyms);
        }

        for mut sub in mem::take(&mut entry.sub_entries) {
            if let Some(plain) = self.normalize(&mut sub, None) {
                extra_terms.push(ExtraTerm {
                    term: self.cased(plain),
                    token_type: TokenType::Number,
                    synonyms: vec![],
                });
            }
            let synonyms = self
                .dictionary_synonyms(&sub)
                .map(|found| found.iter().map(ToString::to_string).collect())
                .unwrap_or_default();
            extra_terms.push(ExtraTerm {
                term: self.cased(sub.surface()),
                token_type: sub.token_type.unwrap_or(TokenType::Uncategorized),
                synonyms,
            });
        }

        if self.is_stop(&entry) {
            log::trace!("[sangpum] stop word: {}", entry.surface());
            if self.option.stopword() {
                return;
            }
            token_type = TokenType::Stopword;
        }
        tokens.push(TokenRecord {
            term: self.cased(entry.surface()),
            range_char: entry.range(),
            token_type,
            synonyms,
            extra_terms,
            position_increment: 1,
        });
    }

    fn emit_index(&self, mut entry: RuleEntry, tokens: &mut Vec<TokenRecord>) {
        if let Some(plain) = self.normalize(&mut entry, None) {
            let sub = RuleEntry::from_str(&plain, entry.start_offset, entry.end_offset, entry.token_type);
            entry.sub_entries.push(sub);
        }
        // Synonyms are indexed at the same position, ahead of the sub entries.
        let synonyms = mem::take(&mut entry.synonyms);
        for (i, synonym) in synonyms.iter().enumerate() {
            let sub = RuleEntry::from_str(synonym, entry.start_offset, entry.end_offset, entry.token_type);
            entry.sub_entries.insert(i, sub);
        }

        let parent = entry.token_type;
        let mut subs: VecDeque<RuleEntry> = mem::take(&mut entry.sub_entries).into();
        self.push_index(&entry, 1, tokens);
        while let Some(mut sub) = subs.pop_front() {
            if let Some(plain) = self.normalize(&mut sub, parent) {
                subs.push_front(RuleEntry::from_str(&plain, sub.start_offset, sub.end_offset, sub.token_type));
            }
            self.push_index(&sub, 0, tokens);
        }
    }

    fn push_index(&self, entry: &RuleEntry, position_increment: u32, tokens: &mut Vec<TokenRecord>) {
        let mut token_type = entry.token_type.unwrap_or(TokenType::Uncategorized);
        if self.is_stop(entry) {
            log::trace!("[sangpum] stop word: {}", entry.surface());
            if self.option.stopword() {
                return;
            }
            token_type = TokenType::Stopword;
        }
        tokens.push(TokenRecord {
            term: self.cased(entry.surface()),
            range_char: entry.range(),
            token_type,
            synonyms: vec![],
            extra_terms: vec![],
            position_increment,
        });
    }
}
