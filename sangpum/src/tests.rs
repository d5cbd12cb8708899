//! Sangpumのテストモジュール群
//!
//! 解析器全体の出力、辞書の再読み込み、マニフェストからの読み込み、
//! 長い入力に対する探索の上限を検証します。

mod analyzer;
mod manifest;
