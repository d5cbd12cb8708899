//! 解析処理を行うワーカー。
//!
//! ワーカーは入力文と抽出器の作業領域を保持し、再利用することで
//! 不要なメモリ再割り当てを避けます。
use crate::analyzer::filter::AnalysisFilter;
use crate::analyzer::tokenizer::collect_entries;
use crate::analyzer::Analyzer;
use crate::chars::TokenType;
use crate::extractor::Extractor;
use crate::rule::ParsingRule;
use crate::sentence::Sentence;
use crate::token::{Token, TokenIter, TokenRecord};

/// 解析処理のためのルーチンを提供する構造体。
///
/// 辞書は解析のたびにスナップショットを取るため、解析の途中で辞書が
/// 再読み込みされても、1回の解析は同じ世代の辞書だけを参照します。
///
/// # 例
///
/// ```
/// use sangpum::{Analyzer, ProductNameDictionary, TagProbDictionary};
///
/// let dict = ProductNameDictionary::from_parts(TagProbDictionary::default(), []);
/// let mut worker = Analyzer::new(dict).new_worker();
/// worker.reset_sentence("120x60");
/// worker.analyze();
/// for token in worker.token_iter() {
///     println!("{}\t{}", token.surface(), token.token_type());
/// }
/// ```
pub struct Worker {
    pub(crate) analyzer: Analyzer,
    pub(crate) sent: Sentence,
    pub(crate) extractor: Extractor,
    pub(crate) tokens: Vec<TokenRecord>,
    peak_queue_len: usize,
}

impl Worker {
    pub(crate) fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            sent: Sentence::new(),
            extractor: Extractor::new(),
            tokens: vec![],
            peak_queue_len: 0,
        }
    }

    /// 解析する入力文をリセットします。
    ///
    /// # 引数
    ///
    /// * `input` - 解析する入力文字列
    pub fn reset_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.sent.clear();
        self.tokens.clear();
        let input = input.as_ref();
        if !input.is_empty() {
            self.sent.set_sentence(input);
        }
    }

    /// 設定された入力文を解析します。
    ///
    /// 解析結果は内部状態に保存され、[`Self::token_iter`]や[`Self::token`]で
    /// アクセスできます。空の文が設定されている場合は何も行いません。
    pub fn analyze(&mut self) {
        self.tokens.clear();
        self.peak_queue_len = 0;
        if self.sent.chars().is_empty() {
            return;
        }
        let option = *self.analyzer.analyzer_option();
        self.extractor.set_fast_result(option.fast_result);

        let snapshot = self.analyzer.dictionary().snapshot();
        let mut entries = collect_entries(
            &mut self.extractor,
            &snapshot,
            &self.sent,
            &mut self.peak_queue_len,
        );
        if !(option.for_query() && option.full_string()) {
            entries.retain(|e| !e.is_type(TokenType::FullString));
        }
        if entries.is_empty() {
            return;
        }

        let mut rule = ParsingRule::new(&snapshot, option);
        rule.init(&entries);
        rule.process(&mut entries, true);
        log::trace!("[sangpum] entry queue size: {}", entries.len());

        let filter = AnalysisFilter::new(&snapshot, rule);
        filter.apply(&mut self.extractor, entries, &mut self.tokens);
    }

    /// 解析結果のトークン数を取得します。
    #[inline(always)]
    pub fn num_tokens(&self) -> usize {
        self.tokens.len()
    }

    /// `i`番目のトークンを取得します。
    ///
    /// # 引数
    ///
    /// * `i` - トークンのインデックス(0から始まる)
    #[inline(always)]
    pub fn token<'w>(&'w self, i: usize) -> Token<'w> {
        Token::new(self, i)
    }

    /// 解析結果のイテレータを作成します。
    #[inline(always)]
    pub fn token_iter<'w>(&'w self) -> TokenIter<'w> {
        TokenIter::new(self)
    }

    /// 直前の解析で抽出器のキューが達した最大長。
    #[inline(always)]
    pub fn peak_queue_len(&self) -> usize {
        self.peak_queue_len
    }
}
