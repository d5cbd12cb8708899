//! 文字バッファ上のゼロコピーな窓
//!
//! [`CharWindow`]は共有文字バッファ(`Arc<[char]>`)に対するオフセットと長さの組です。
//! 生成時にバッファを複製しないため、入力全体から切り出した多数の窓が同じバッファを
//! 参照できます。大文字小文字を区別しない比較・ハッシュに対応しており、辞書のキーと
//! 検索語の両方に使われます。
//!
//! 辞書の検索では、窓を作らずに文字スライスから直接引ける[`CharKey`]を使用します。

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use hashbrown::Equivalent;

/// 共有文字バッファ上の不変な窓。
#[derive(Clone)]
pub struct CharWindow {
    buffer: Arc<[char]>,
    offset: usize,
    length: usize,
    ignore_case: bool,
}

#[inline(always)]
fn fold(ch: char) -> char {
    if ch.is_ascii_lowercase() {
        ch.to_ascii_uppercase()
    } else {
        ch
    }
}

#[inline(always)]
fn hash_chars<H: Hasher>(chars: &[char], state: &mut H) {
    state.write_usize(chars.len());
    for &ch in chars {
        state.write_u32(u32::from(fold(ch)));
    }
}

#[inline(always)]
fn chars_eq(a: &[char], b: &[char], ignore_case: bool) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if ignore_case {
        a.iter().zip(b).all(|(&x, &y)| fold(x) == fold(y))
    } else {
        a == b
    }
}

fn chars_cmp(a: &[char], b: &[char], ignore_case: bool) -> Ordering {
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = if ignore_case { (fold(x), fold(y)) } else { (x, y) };
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

impl CharWindow {
    /// 共有バッファ上の窓を生成します。
    ///
    /// 範囲がバッファを超える場合はバッファの終端で切り詰められます。
    ///
    /// # 引数
    ///
    /// * `buffer` - 共有文字バッファ
    /// * `offset` - 窓の開始位置
    /// * `length` - 窓の長さ
    /// * `ignore_case` - 大文字小文字を区別しない比較を行うかどうか
    pub fn new(buffer: Arc<[char]>, offset: usize, length: usize, ignore_case: bool) -> Self {
        let offset = offset.min(buffer.len());
        let length = length.min(buffer.len() - offset);
        Self {
            buffer,
            offset,
            length,
            ignore_case,
        }
    }

    /// 文字列から新しいバッファを確保して窓を生成します。
    pub fn from_str(s: &str, ignore_case: bool) -> Self {
        let buffer: Arc<[char]> = s.chars().collect();
        let length = buffer.len();
        Self::new(buffer, 0, length, ignore_case)
    }

    /// 文字スライスから新しいバッファを確保して窓を生成します。
    pub fn from_chars(chars: &[char], ignore_case: bool) -> Self {
        Self::new(Arc::from(chars), 0, chars.len(), ignore_case)
    }

    /// 参照している共有バッファ。
    #[inline(always)]
    pub fn buffer(&self) -> &Arc<[char]> {
        &self.buffer
    }

    /// バッファ上の開始位置。
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 窓の長さ(文字数)。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.length
    }

    /// 窓が空かどうか。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// 大文字小文字を区別しない比較を行うかどうか。
    #[inline(always)]
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// 比較モードだけを変えた窓を返します。バッファは共有されます。
    pub fn with_ignore_case(&self, ignore_case: bool) -> Self {
        Self {
            ignore_case,
            ..self.clone()
        }
    }

    /// 窓の中の元の文字列。
    #[inline(always)]
    pub fn as_chars(&self) -> &[char] {
        &self.buffer[self.offset..self.offset + self.length]
    }

    /// `i`番目の文字を返します。比較モードが大文字小文字を区別しない場合は
    /// ASCII小文字が大文字に変換されます。
    #[inline(always)]
    pub fn char_at(&self, i: usize) -> char {
        let ch = self.as_chars()[i];
        if self.ignore_case { fold(ch) } else { ch }
    }

    /// 最初の文字。
    #[inline(always)]
    pub fn first(&self) -> Option<char> {
        self.as_chars().first().copied()
    }

    /// 最後の文字。
    #[inline(always)]
    pub fn last(&self) -> Option<char> {
        self.as_chars().last().copied()
    }

    /// 窓の中の部分窓を返します。バッファは共有されます。
    pub fn sub_window(&self, start: usize, length: usize) -> Self {
        let start = start.min(self.length);
        let length = length.min(self.length - start);
        Self {
            buffer: self.buffer.clone(),
            offset: self.offset + start,
            length,
            ignore_case: self.ignore_case,
        }
    }

    /// 前後の半角スペースを除いた窓を返します。
    pub fn trim(&self) -> Self {
        let chars = self.as_chars();
        let start = chars.iter().take_while(|&&c| c == ' ').count();
        let end = chars.len() - chars[start..].iter().rev().take_while(|&&c| c == ' ').count();
        self.sub_window(start, end - start)
    }

    /// 半角スペースを含むかどうか。
    pub fn has_whitespaces(&self) -> bool {
        self.as_chars().contains(&' ')
    }

    /// 内部の半角スペースを取り除いた窓を返します。
    ///
    /// スペースを含む場合のみ新しいバッファを確保します。
    pub fn remove_whitespaces(&self) -> Self {
        if !self.has_whitespaces() {
            return self.clone();
        }
        let chars: Vec<char> = self.as_chars().iter().copied().filter(|&c| c != ' ').collect();
        Self::from_chars(&chars, self.ignore_case)
    }

    /// 半角スペースで区切った部分窓の列を返します。
    pub fn split_by_whitespace(&self) -> Vec<Self> {
        let mut list = vec![];
        let mut start = 0;
        for (i, &ch) in self.as_chars().iter().enumerate() {
            if ch == ' ' {
                if start < i {
                    list.push(self.sub_window(start, i - start));
                }
                start = i + 1;
            }
        }
        if start < self.length {
            list.push(self.sub_window(start, self.length - start));
        }
        list
    }

    /// 辞書検索用のキーを返します。
    #[inline(always)]
    pub fn key(&self) -> CharKey<'_> {
        CharKey::new(self.as_chars(), self.ignore_case)
    }
}

impl Hash for CharWindow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_chars(self.as_chars(), state);
    }
}

impl PartialEq for CharWindow {
    fn eq(&self, other: &Self) -> bool {
        chars_eq(
            self.as_chars(),
            other.as_chars(),
            self.ignore_case || other.ignore_case,
        )
    }
}

impl Eq for CharWindow {}

impl PartialOrd for CharWindow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CharWindow {
    fn cmp(&self, other: &Self) -> Ordering {
        chars_cmp(
            self.as_chars(),
            other.as_chars(),
            self.ignore_case || other.ignore_case,
        )
    }
}

impl fmt::Display for CharWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &ch in self.as_chars() {
            fmt::Write::write_char(f, ch)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CharWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

impl From<&str> for CharWindow {
    fn from(s: &str) -> Self {
        Self::from_str(s, false)
    }
}

/// 文字スライスによる借用キー。
///
/// [`CharWindow`]をキーとする`hashbrown`のマップ・集合を、窓を生成せずに検索するために
/// 使用します。ハッシュ値は同じ内容の[`CharWindow`]と一致します。
#[derive(Clone, Copy, Debug)]
pub struct CharKey<'a> {
    chars: &'a [char],
    ignore_case: bool,
}

impl<'a> CharKey<'a> {
    /// キーを生成します。
    ///
    /// `ignore_case`が真の場合、辞書側の設定にかかわらず大文字小文字を区別せずに比較します。
    #[inline(always)]
    pub const fn new(chars: &'a [char], ignore_case: bool) -> Self {
        Self { chars, ignore_case }
    }

    /// 大文字小文字の区別を辞書側の設定に任せるキーを生成します。
    #[inline(always)]
    pub const fn exact(chars: &'a [char]) -> Self {
        Self::new(chars, false)
    }

    /// キーの文字列。
    #[inline(always)]
    pub const fn chars(&self) -> &'a [char] {
        self.chars
    }
}

impl Hash for CharKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_chars(self.chars, state);
    }
}

impl Equivalent<CharWindow> for CharKey<'_> {
    fn equivalent(&self, key: &CharWindow) -> bool {
        chars_eq(
            self.chars,
            key.as_chars(),
            self.ignore_case || key.ignore_case(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hashbrown::HashSet;

    #[test]
    fn test_window_shares_buffer() {
        let buffer: Arc<[char]> = "노트북 케이스".chars().collect();
        let a = CharWindow::new(buffer.clone(), 0, 3, false);
        let b = CharWindow::new(buffer.clone(), 4, 3, false);
        assert!(Arc::ptr_eq(a.buffer(), b.buffer()));
        assert_eq!(a.to_string(), "노트북");
        assert_eq!(b.to_string(), "케이스");
    }

    #[test]
    fn test_window_clamps_range() {
        let buffer: Arc<[char]> = "abc".chars().collect();
        let w = CharWindow::new(buffer, 2, 10, false);
        assert_eq!(w.len(), 1);
        assert_eq!(w.to_string(), "c");
    }

    #[test]
    fn test_ignore_case_equality() {
        let a = CharWindow::from_str("Galaxy", true);
        let b = CharWindow::from_str("GALAXY", false);
        let c = CharWindow::from_str("galaxy", false);
        assert_eq!(a, b);
        assert_ne!(b, c);
        assert_eq!(a.char_at(1), 'A');
        assert_eq!(c.char_at(1), 'a');
    }

    #[test]
    fn test_hash_lookup_by_key() {
        let mut set = HashSet::new();
        set.insert(CharWindow::from_str("cm", true));
        let input: Vec<char> = "1024CM".chars().collect();
        assert!(set.contains(&CharKey::exact(&input[4..])));
        assert!(!set.contains(&CharKey::exact(&input[3..])));
    }

    #[test]
    fn test_case_sensitive_lookup_by_key() {
        let mut set = HashSet::new();
        set.insert(CharWindow::from_str("cm", false));
        let upper: Vec<char> = "CM".chars().collect();
        assert!(!set.contains(&CharKey::exact(&upper)));
        assert!(set.contains(&CharKey::new(&upper, true)));
    }

    #[test]
    fn test_ordering() {
        let mut list = vec![
            CharWindow::from("나"),
            CharWindow::from("가나"),
            CharWindow::from("가"),
        ];
        list.sort();
        let list: Vec<String> = list.iter().map(|w| w.to_string()).collect();
        assert_eq!(list, vec!["가", "가나", "나"]);
    }

    #[test]
    fn test_trim_and_whitespaces() {
        let w = CharWindow::from("  삼성 노트북  ");
        let t = w.trim();
        assert_eq!(t.to_string(), "삼성 노트북");
        assert!(t.has_whitespaces());
        assert_eq!(t.remove_whitespaces().to_string(), "삼성노트북");
        let parts: Vec<String> = w.split_by_whitespace().iter().map(|w| w.to_string()).collect();
        assert_eq!(parts, vec!["삼성", "노트북"]);
    }
}
