//! 商品名の解析器。
//!
//! 入力を文字種別の区間に分け、システム辞書で語に分割し、
//! 商品名の規則で再分類・結合した上で、索引用または検索語用の語の列を出力します。
//!
//! # 主要な構造体
//!
//! - [`Analyzer`]: 辞書と設定を保持する解析器
//! - [`Worker`]: 実際の解析処理を行うワーカー
//!
//! # 例
//!
//! ```
//! use sangpum::{Analyzer, AnalyzerOption, ProductNameDictionary, TagProbDictionary};
//! use sangpum::dictionary::DictionarySource;
//!
//! let system = TagProbDictionary::from_lines(["노트북\tNNG\t-5.0"], true);
//! let dict = ProductNameDictionary::from_parts(system, []);
//! let analyzer = Analyzer::new(dict).option(AnalyzerOption::default().use_for_query(true));
//! let mut worker = analyzer.new_worker();
//!
//! worker.reset_sentence("노트북 i7-4700mq");
//! worker.analyze();
//!
//! let surfaces: Vec<_> = worker.token_iter().map(|t| t.surface().to_string()).collect();
//! assert_eq!(surfaces, vec!["노트북", "i7-4700mq"]);
//! ```
mod filter;
mod option;
pub(crate) mod tokenizer;
pub mod worker;

use std::sync::Arc;

pub use crate::analyzer::option::AnalyzerOption;
use crate::analyzer::worker::Worker;
use crate::dictionary::ProductNameDictionary;

/// 商品名の解析器。
///
/// 辞書は[`Arc`]で共有され、複数の[`Worker`]を生成して並列に解析できます。
/// 辞書の再読み込みは解析中のワーカーに影響せず、次の解析から反映されます。
#[derive(Clone)]
pub struct Analyzer {
    dict: Arc<ProductNameDictionary>,
    option: AnalyzerOption,
}

impl Analyzer {
    /// 新しい解析器を作成します。
    ///
    /// 辞書は解析器に所有権が移動します。複数の解析器で辞書を共有する場合は
    /// [`Analyzer::from_shared_dictionary`]を使用してください。
    ///
    /// # 引数
    ///
    /// * `dict` - 解析に使用する辞書
    pub fn new(dict: ProductNameDictionary) -> Self {
        Self::from_shared_dictionary(Arc::new(dict))
    }

    /// 共有された辞書から新しい解析器を作成します。
    ///
    /// 索引用と検索語用の解析器を同じ辞書で動かす場合などに使います。
    ///
    /// # 例
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sangpum::{Analyzer, AnalyzerOption, ProductNameDictionary, TagProbDictionary};
    ///
    /// let dict = Arc::new(ProductNameDictionary::from_parts(TagProbDictionary::default(), []));
    /// let index = Analyzer::from_shared_dictionary(dict.clone());
    /// let query = Analyzer::from_shared_dictionary(dict)
    ///     .option(AnalyzerOption::default().use_for_query(true));
    /// assert!(!index.analyzer_option().for_query());
    /// assert!(query.analyzer_option().for_query());
    /// ```
    pub fn from_shared_dictionary(dict: Arc<ProductNameDictionary>) -> Self {
        Self {
            dict,
            option: AnalyzerOption::default(),
        }
    }

    /// 解析の設定を指定します。
    pub fn option(mut self, option: AnalyzerOption) -> Self {
        self.option = option;
        self
    }

    #[inline(always)]
    pub fn analyzer_option(&self) -> &AnalyzerOption {
        &self.option
    }

    /// 辞書への参照を取得します。
    #[inline(always)]
    pub fn dictionary(&self) -> &Arc<ProductNameDictionary> {
        &self.dict
    }

    /// 新しいワーカーを作成します。
    ///
    /// 各ワーカーは独立した作業領域を持つため、スレッドごとに1つ作成して使います。
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }
}
