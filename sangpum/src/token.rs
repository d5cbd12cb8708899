//! 解析結果のトークン
//!
//! [`Token`]は[`Worker`]が保持する解析結果への軽量な参照です。
//! 語の文字列、入力上の位置、種別、同義語、付加語、位置増分にアクセスできます。

use std::ops::Range;

use crate::analyzer::worker::Worker;
use crate::chars::TokenType;

/// 主の語と同じ位置に付け加えられる語。
///
/// 検索語用の出力で、副語や区切り記号を除いた数字がこの形で出力されます。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtraTerm {
    /// 語の文字列
    pub term: String,
    /// 語の種別
    pub token_type: TokenType,
    /// 語の同義語
    pub synonyms: Vec<String>,
}

/// ワーカー内部に保持される出力語。
#[derive(Clone, Debug)]
pub(crate) struct TokenRecord {
    pub(crate) term: String,
    pub(crate) range_char: Range<usize>,
    pub(crate) token_type: TokenType,
    pub(crate) synonyms: Vec<String>,
    pub(crate) extra_terms: Vec<ExtraTerm>,
    pub(crate) position_increment: u32,
}

/// 解析結果のトークン。
///
/// このトークンは[`Worker`]への軽量な参照であり、[`Worker`]が生存している間のみ有効です。
pub struct Token<'w> {
    worker: &'w Worker,
    index: usize,
}

impl<'w> Token<'w> {
    #[inline(always)]
    pub(crate) const fn new(worker: &'w Worker, index: usize) -> Self {
        Self { worker, index }
    }

    #[inline(always)]
    fn record(&self) -> &'w TokenRecord {
        &self.worker.tokens[self.index]
    }

    /// 出力する語の文字列を取得します。
    ///
    /// 結合や区切り記号の除去、大文字化を経た文字列のため、
    /// 入力の該当範囲と一致するとは限りません。
    #[inline(always)]
    pub fn surface(&self) -> &'w str {
        &self.record().term
    }

    /// トークンの文字単位の位置範囲を取得します。
    #[inline(always)]
    pub fn range_char(&self) -> Range<usize> {
        self.record().range_char.clone()
    }

    /// トークンのバイト単位の位置範囲を取得します。
    #[inline(always)]
    pub fn range_byte(&self) -> Range<usize> {
        let sent = &self.worker.sent;
        let range = &self.record().range_char;
        sent.byte_position(range.start)..sent.byte_position(range.end)
    }

    /// 入力上の該当範囲の文字列を取得します。
    #[inline(always)]
    pub fn source(&self) -> &'w str {
        let range = self.range_byte();
        self.worker.sent.raw().get(range).unwrap_or_default()
    }

    /// 語の種別を取得します。
    #[inline(always)]
    pub fn token_type(&self) -> TokenType {
        self.record().token_type
    }

    /// 同じ位置に出力する同義語を取得します。
    #[inline(always)]
    pub fn synonyms(&self) -> &'w [String] {
        &self.record().synonyms
    }

    /// 付加語を取得します。
    #[inline(always)]
    pub fn extra_terms(&self) -> &'w [ExtraTerm] {
        &self.record().extra_terms
    }

    /// 位置増分。1は新しい位置、0は直前の語と同じ位置の別形を表します。
    #[inline(always)]
    pub fn position_increment(&self) -> u32 {
        self.record().position_increment
    }

    /// このトークンビューを所有型の[`TokenBuf`]に変換します。
    pub fn to_buf(&self) -> TokenBuf {
        TokenBuf {
            surface: self.surface().to_string(),
            range_char: self.range_char(),
            range_byte: self.range_byte(),
            token_type: self.token_type(),
            synonyms: self.synonyms().to_vec(),
            extra_terms: self.extra_terms().to_vec(),
            position_increment: self.position_increment(),
        }
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("surface", &self.surface())
            .field("range_char", &self.range_char())
            .field("range_byte", &self.range_byte())
            .field("token_type", &self.token_type())
            .field("synonyms", &self.synonyms())
            .field("extra_terms", &self.extra_terms())
            .field("position_increment", &self.position_increment())
            .finish()
    }
}

/// トークンのイテレータ
///
/// 前方および後方からの走査をサポートしています([`DoubleEndedIterator`]を実装)。
pub struct TokenIter<'w> {
    worker: &'w Worker,
    front: usize,
    back: usize,
}

impl<'w> TokenIter<'w> {
    #[inline(always)]
    pub(crate) fn new(worker: &'w Worker) -> Self {
        Self {
            worker,
            front: 0,
            back: worker.num_tokens(),
        }
    }
}

impl<'w> Iterator for TokenIter<'w> {
    type Item = Token<'w>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            let t = self.worker.token(self.front);
            self.front += 1;
            Some(t)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<'w> DoubleEndedIterator for TokenIter<'w> {
    #[inline(always)]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            Some(self.worker.token(self.back))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for TokenIter<'_> {}

/// 所有型の自己完結したトークン
///
/// [`Token`]の所有型版です。解析結果を保存したり、スレッド間で送信する際に使います。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBuf {
    /// 出力する語の文字列
    pub surface: String,

    /// トークンの文字単位の位置範囲
    pub range_char: Range<usize>,

    /// トークンのバイト単位の位置範囲
    pub range_byte: Range<usize>,

    /// 語の種別
    pub token_type: TokenType,

    /// 同義語
    pub synonyms: Vec<String>,

    /// 付加語
    pub extra_terms: Vec<ExtraTerm>,

    /// 位置増分
    pub position_increment: u32,
}

impl<'w> From<Token<'w>> for TokenBuf {
    fn from(token: Token<'w>) -> Self {
        token.to_buf()
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::Analyzer;
    use crate::dictionary::{DictionarySource, ProductNameDictionary, TagProbDictionary};

    #[test]
    fn test_iter() {
        let system = TagProbDictionary::from_lines(["자연\tNNG\t-5.0", "언어\tNNG\t-5.0"], true);
        let dict = ProductNameDictionary::from_parts(system, []);
        let analyzer = Analyzer::new(dict);
        let mut worker = analyzer.new_worker();

        worker.reset_sentence("자연언어 abc");
        worker.analyze();

        let mut it = worker.token_iter();
        assert_eq!(it.len(), 3);
        {
            let t = it.next().unwrap();
            assert_eq!(t.surface(), "자연");
            assert_eq!(t.range_char(), 0..2);
            assert_eq!(t.range_byte(), 0..6);
            assert_eq!(t.position_increment(), 1);
        }
        {
            let t = it.next_back().unwrap();
            assert_eq!(t.surface(), "abc");
            assert_eq!(t.range_char(), 5..8);
            assert_eq!(t.range_byte(), 13..16);
            assert_eq!(t.source(), "abc");
        }
        {
            let t = it.next().unwrap();
            assert_eq!(t.surface(), "언어");
            assert_eq!(t.range_char(), 2..4);
        }
        assert!(it.next().is_none());
        assert!(it.next_back().is_none());
    }

    #[test]
    fn test_to_buf() {
        let system = TagProbDictionary::from_lines(["자연\tNNG\t-5.0"], true);
        let dict = ProductNameDictionary::from_parts(system, []);
        let analyzer = Analyzer::new(dict);
        let mut worker = analyzer.new_worker();

        worker.reset_sentence("자연");
        worker.analyze();
        let buf = worker.token(0).to_buf();
        assert_eq!(buf.surface, "자연");
        assert_eq!(buf.range_byte, 0..6);
        assert!(buf.synonyms.is_empty());
    }
}
