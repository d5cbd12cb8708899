//! # Sangpum
//!
//! Sangpumは、韓国語を含む商品名のための語分割と語の正規化の実装です。
//!
//! ## 概要
//!
//! 入力を文字種別の区間に分け、品詞と確率を持つシステム辞書を引きながら
//! スコア付きの格子探索で語に分割します。分割した語の列には、数字と単位、
//! 型番、複合名詞、同義語などを扱う5段階の規則を適用し、
//! 検索エンジンの索引用または検索語用の語の列を出力します。
//!
//! ## 主な機能
//!
//! - **格子探索による語分割**: 探索キューの上限で終了が保証された最良優先探索
//! - **商品名の規則**: 単位付きの数字、区切り記号を含む数字、型番の検出と結合
//! - **複数の辞書**: 単位・同義語・分かち書き・禁止語・複合名詞などの名前付き辞書
//! - **無停止の再読み込み**: 名前付き辞書ごとの原子的な差し替え
//! - **辞書の一括保存**: rkyvによる辞書全体の保存と読み込み
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sangpum::dictionary::{DictionaryEntry, DictionaryKind, DictionarySource, SetDictionary, SourceDictionary};
//! use sangpum::{Analyzer, ProductNameDictionary, TagProbDictionary, TokenType};
//!
//! let system = TagProbDictionary::from_lines(["노트북\tNNG\t-5.0"], true);
//! let unit = SetDictionary::from_lines(["cm", "gb"], true);
//! let dict = ProductNameDictionary::from_parts(
//!     system,
//!     [DictionaryEntry::new("unit", DictionaryKind::Set, SourceDictionary::Set(unit))],
//! );
//!
//! let analyzer = Analyzer::new(dict);
//! let mut worker = analyzer.new_worker();
//!
//! worker.reset_sentence("노트북 1024cm");
//! worker.analyze();
//! assert_eq!(worker.num_tokens(), 3);
//!
//! let t0 = worker.token(0);
//! assert_eq!(t0.surface(), "노트북");
//! assert_eq!(t0.range_char(), 0..3);
//! assert_eq!(t0.range_byte(), 0..9);
//!
//! let t1 = worker.token(1);
//! assert_eq!(t1.surface(), "1024cm");
//! assert_eq!(t1.token_type(), TokenType::Unit);
//! assert_eq!(t1.range_char(), 4..10);
//! assert_eq!(t1.position_increment(), 1);
//!
//! let t2 = worker.token(2);
//! assert_eq!(t2.surface(), "1024");
//! assert_eq!(t2.token_type(), TokenType::Number);
//! assert_eq!(t2.position_increment(), 0);
//! # Ok(())
//! # }
//! ```

/// 商品名の解析器
pub mod analyzer;

/// 共有文字バッファ上の窓
pub mod char_window;

/// 文字種別と語の種別
pub mod chars;

/// 共通の定数
pub mod common;

/// 辞書データ構造と読み込み
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 格子探索による語分割
pub mod extractor;

/// 商品名の規則
pub mod rule;

/// 文字種別による区間分割
pub mod segmenter;

/// 文の内部表現
mod sentence;

/// トークン型の定義
pub mod token;

/// 内部ユーティリティ関数
pub mod utils;

#[cfg(test)]
mod tests;

// Re-exports
pub use analyzer::worker::Worker;
pub use analyzer::{Analyzer, AnalyzerOption};
pub use chars::TokenType;
pub use dictionary::{DictionaryManifest, ProductNameDictionary, TagProbDictionary};
pub use errors::{Result, SangpumError};
pub use token::{ExtraTerm, Token, TokenBuf};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
