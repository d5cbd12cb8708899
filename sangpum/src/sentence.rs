//! 入力テキストの内部表現
//!
//! 入力文字列を文字単位に分割し、文字位置からバイト位置への対応を保持します。
//! 文字バッファは解析中の語から共有されるため[`Arc`]で持ちます。

use std::sync::Arc;

/// 入力テキストの内部表現。
///
/// # フィールド
///
/// * `input` - 元の入力文字列
/// * `chars` - 入力文字列を文字単位に分割した配列
/// * `c2b` - 文字位置からバイト位置への対応。末尾に入力のバイト長を持ちます。
#[derive(Clone, Debug)]
pub struct Sentence {
    input: String,
    chars: Arc<[char]>,
    c2b: Vec<usize>,
}

impl Default for Sentence {
    fn default() -> Self {
        Self {
            input: String::new(),
            chars: Arc::from(Vec::new()),
            c2b: vec![0],
        }
    }
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内部状態をクリアします。
    #[inline(always)]
    pub fn clear(&mut self) {
        self.input.clear();
        self.chars = Arc::from(Vec::new());
        self.c2b.clear();
        self.c2b.push(0);
    }

    /// 入力文字列を設定し、文字配列とバイト位置の対応を構築します。
    ///
    /// # 引数
    ///
    /// * `input` - 設定する入力文字列
    pub fn set_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.clear();
        self.input.push_str(input.as_ref());
        self.compile();
    }

    fn compile(&mut self) {
        let mut chars = Vec::with_capacity(self.input.len());
        self.c2b.clear();
        for (bi, ch) in self.input.char_indices() {
            chars.push(ch);
            self.c2b.push(bi);
        }
        self.c2b.push(self.input.len());
        self.chars = Arc::from(chars);
    }

    #[inline(always)]
    pub fn raw(&self) -> &str {
        &self.input
    }

    #[inline(always)]
    pub fn chars(&self) -> &Arc<[char]> {
        &self.chars
    }

    #[inline(always)]
    pub fn len_char(&self) -> usize {
        self.chars.len()
    }

    /// 文字位置をバイト位置に変換します。範囲外の位置は入力末尾に丸めます。
    #[inline(always)]
    pub fn byte_position(&self, pos_char: usize) -> usize {
        self.c2b
            .get(pos_char)
            .copied()
            .unwrap_or(self.input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_position() {
        let mut sent = Sentence::new();
        sent.set_sentence("가a나");
        assert_eq!(sent.len_char(), 3);
        assert_eq!(sent.byte_position(0), 0);
        assert_eq!(sent.byte_position(1), 3);
        assert_eq!(sent.byte_position(2), 4);
        assert_eq!(sent.byte_position(3), 7);
        assert_eq!(sent.byte_position(10), 7);
    }

    #[test]
    fn test_clear() {
        let mut sent = Sentence::new();
        sent.set_sentence("abc");
        sent.clear();
        assert!(sent.chars().is_empty());
        assert_eq!(sent.raw(), "");
        assert_eq!(sent.byte_position(0), 0);
    }
}
