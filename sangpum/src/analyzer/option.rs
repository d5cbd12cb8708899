use serde::{Deserialize, Serialize};

/// 解析の設定。
///
/// # 例
///
/// ```
/// use sangpum::AnalyzerOption;
///
/// let option = AnalyzerOption::default().use_for_query(true).use_full_string(true);
/// assert!(option.for_query());
/// assert!(option.synonym());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerOption {
    /// 検索語用の出力にするか。偽の場合は索引用の出力になります。
    pub use_for_query: bool,
    pub use_synonym: bool,
    /// 禁止語を出力しないか。偽の場合は`STOPWORD`として出力されます。
    pub use_stopword: bool,
    /// 短い入力全体を1語としても出力するか。検索語用の出力でのみ有効です。
    pub use_full_string: bool,
    /// 出力語を大文字にするか
    pub to_uppercase: bool,
    /// 抽出器で最初の候補が見つかった時点で探索を打ち切るか
    pub fast_result: bool,
}

impl Default for AnalyzerOption {
    fn default() -> Self {
        Self {
            use_for_query: false,
            use_synonym: true,
            use_stopword: true,
            use_full_string: false,
            to_uppercase: false,
            fast_result: true,
        }
    }
}

impl AnalyzerOption {
    pub const fn use_for_query(mut self, yes: bool) -> Self {
        self.use_for_query = yes;
        self
    }

    pub const fn use_synonym(mut self, yes: bool) -> Self {
        self.use_synonym = yes;
        self
    }

    pub const fn use_stopword(mut self, yes: bool) -> Self {
        self.use_stopword = yes;
        self
    }

    pub const fn use_full_string(mut self, yes: bool) -> Self {
        self.use_full_string = yes;
        self
    }

    pub const fn to_uppercase(mut self, yes: bool) -> Self {
        self.to_uppercase = yes;
        self
    }

    pub const fn fast_result(mut self, yes: bool) -> Self {
        self.fast_result = yes;
        self
    }

    #[inline(always)]
    pub const fn for_query(&self) -> bool {
        self.use_for_query
    }

    #[inline(always)]
    pub const fn synonym(&self) -> bool {
        self.use_synonym
    }

    #[inline(always)]
    pub const fn stopword(&self) -> bool {
        self.use_stopword
    }

    #[inline(always)]
    pub const fn full_string(&self) -> bool {
        self.use_full_string
    }

    #[inline(always)]
    pub const fn uppercase(&self) -> bool {
        self.to_uppercase
    }
}
