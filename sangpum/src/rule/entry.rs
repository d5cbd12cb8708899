//! 規則処理の単位となる語

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::char_window::{CharKey, CharWindow};
use crate::chars::{char_type, TokenType};

/// 規則処理中の1つの語。
///
/// 文字バッファへの窓と元の入力上のオフセットを保持します。
/// `sub_entries`は結合前の部分語など、副次的に出力する語です。
///
/// `clone()`は`sub_entries`と`synonyms`を含めて深く複製します。
#[derive(Clone)]
pub struct RuleEntry {
    pub(crate) buf: Arc<[char]>,
    pub(crate) start: usize,
    pub(crate) length: usize,
    pub(crate) start_offset: usize,
    pub(crate) end_offset: usize,
    pub(crate) token_type: Option<TokenType>,
    pub(crate) modifiable: bool,
    pub(crate) synonyms: Vec<String>,
    pub(crate) sub_entries: Vec<RuleEntry>,
}

impl RuleEntry {
    /// 新しい語を生成します。
    ///
    /// # 引数
    ///
    /// * `buf` - 文字バッファ
    /// * `start` - バッファ上の開始位置
    /// * `length` - 文字数
    /// * `start_offset` - 入力上の開始オフセット
    /// * `end_offset` - 入力上の終了オフセット
    /// * `token_type` - 種別。`None`は未分類です。
    pub fn new(
        buf: Arc<[char]>,
        start: usize,
        length: usize,
        start_offset: usize,
        end_offset: usize,
        token_type: Option<TokenType>,
    ) -> Self {
        Self {
            buf,
            start,
            length,
            start_offset,
            end_offset,
            token_type,
            modifiable: true,
            synonyms: vec![],
            sub_entries: vec![],
        }
    }

    /// 文字列から独自のバッファを持つ語を生成します。
    pub fn from_str(s: &str, start_offset: usize, end_offset: usize, token_type: Option<TokenType>) -> Self {
        let chars: Vec<char> = s.chars().collect();
        Self::from_chars(&chars, start_offset, end_offset, token_type)
    }

    /// 文字列から独自のバッファを持つ語を生成します。
    pub fn from_chars(
        chars: &[char],
        start_offset: usize,
        end_offset: usize,
        token_type: Option<TokenType>,
    ) -> Self {
        Self::new(Arc::from(chars), 0, chars.len(), start_offset, end_offset, token_type)
    }

    /// 窓と同じバッファを指す語を生成します。
    pub fn from_window(
        window: &CharWindow,
        start_offset: usize,
        end_offset: usize,
        token_type: Option<TokenType>,
    ) -> Self {
        Self::new(
            window.buffer().clone(),
            window.offset(),
            window.len(),
            start_offset,
            end_offset,
            token_type,
        )
    }

    #[inline(always)]
    pub fn buf(&self) -> &Arc<[char]> {
        &self.buf
    }

    /// バッファ上の開始位置。
    #[inline(always)]
    pub fn start(&self) -> usize {
        self.start
    }

    /// バッファ上の終了位置。
    #[inline(always)]
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline(always)]
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    #[inline(always)]
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// 入力上の範囲。
    #[inline(always)]
    pub fn range(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }

    #[inline(always)]
    pub fn token_type(&self) -> Option<TokenType> {
        self.token_type
    }

    #[inline(always)]
    pub fn is_modifiable(&self) -> bool {
        self.modifiable
    }

    #[inline(always)]
    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    #[inline(always)]
    pub fn sub_entries(&self) -> &[RuleEntry] {
        &self.sub_entries
    }

    /// 語の文字列。バッファを外れる部分は含みません。
    #[inline(always)]
    pub fn term(&self) -> &[char] {
        let end = self.end().min(self.buf.len());
        self.buf.get(self.start.min(end)..end).unwrap_or(&[])
    }

    /// 辞書検索用のキー。
    #[inline(always)]
    pub fn key(&self) -> CharKey<'_> {
        CharKey::exact(self.term())
    }

    pub fn surface(&self) -> String {
        self.term().iter().collect()
    }

    /// バッファ上の位置`i`の文字。範囲外は`'\0'`です。
    #[inline(always)]
    pub(crate) fn char_at(&self, i: usize) -> char {
        self.buf.get(i).copied().unwrap_or('\0')
    }

    #[inline(always)]
    pub(crate) fn first_char(&self) -> char {
        self.term().first().copied().unwrap_or('\0')
    }

    #[inline(always)]
    pub(crate) fn last_char(&self) -> char {
        self.term().last().copied().unwrap_or('\0')
    }

    /// 同じバッファを指しているかを判定します。
    #[inline(always)]
    pub(crate) fn same_buf(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.buf, &other.buf)
    }

    /// `other`がこの語の直後から始まるかを判定します。
    #[inline(always)]
    pub(crate) fn is_followed_by(&self, other: &Self) -> bool {
        self.same_buf(other) && other.start == self.end()
    }

    #[inline(always)]
    pub(crate) fn is_type(&self, ty: TokenType) -> bool {
        self.token_type == Some(ty)
    }

    #[inline(always)]
    pub(crate) fn is_any_type(&self, types: &[TokenType]) -> bool {
        self.token_type.is_some_and(|t| types.contains(&t))
    }

    /// 語の並び順。
    ///
    /// 開始オフセットの昇順に並べ、同じ開始位置では長さ0の語を先に、
    /// それ以外は終了オフセットの降順に並べます。
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        match self.start_offset.cmp(&other.start_offset) {
            Ordering::Equal => {}
            ord => return ord,
        }
        let self_empty = self.start_offset == self.end_offset;
        let other_empty = other.start_offset == other.end_offset;
        match (self_empty, other_empty) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => other.end_offset.cmp(&self.end_offset),
        }
    }
}

impl fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:?}[{}~{}]",
            self.surface(),
            self.token_type,
            self.start_offset,
            self.end_offset
        )?;
        if !self.sub_entries.is_empty() {
            write!(f, "{:?}", self.sub_entries)?;
        }
        if !self.synonyms.is_empty() {
            write!(f, "{{{}}}", self.synonyms.join(","))?;
        }
        Ok(())
    }
}

/// 語の並びを整列します。同順位の語は元の順を保ちます。
pub(crate) fn sort_entries(queue: &mut [RuleEntry]) {
    queue.sort_by(RuleEntry::cmp_position);
}

/// 語を文字種別の境界で分割し、`queue`の`index`位置に挿入します。
///
/// 空白の部分は捨てます。部分語は同義語と副語を持ちません。
///
/// # 戻り値
///
/// 挿入した語の数
pub(crate) fn split_entry(entry: RuleEntry, queue: &mut Vec<RuleEntry>, index: usize) -> usize {
    let term = entry.term();
    let mut inserted = 0;
    let mut st = 0;
    let mut prev: Option<TokenType> = None;
    let mut pieces = vec![];
    for (inx, &ch) in term.iter().enumerate() {
        let cur = char_type(ch);
        if let Some(p) = prev.filter(|&p| p != cur) {
            pieces.push((st, inx, p));
            st = inx;
        }
        prev = Some(cur);
    }
    if let Some(p) = prev {
        pieces.push((st, term.len(), p));
    }
    for (st, ed, ty) in pieces {
        if ty == TokenType::Whitespace {
            continue;
        }
        let piece = RuleEntry::new(
            entry.buf.clone(),
            entry.start + st,
            ed - st,
            entry.start_offset + st,
            entry.start_offset + ed,
            Some(ty),
        );
        queue.insert(index + inserted, piece);
        inserted += 1;
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(s: &str, start_offset: usize, ty: Option<TokenType>) -> RuleEntry {
        let len = s.chars().count();
        RuleEntry::from_str(s, start_offset, start_offset + len, ty)
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = entry("1024cm", 0, Some(TokenType::Unit));
        a.sub_entries.push(entry("1024", 0, Some(TokenType::Number)));
        a.synonyms.push("1024센티".to_string());

        let mut b = a.clone();
        b.sub_entries[0].length = 1;
        b.sub_entries.push(entry("cm", 4, Some(TokenType::Alpha)));
        b.synonyms.clear();

        assert_eq!(a.sub_entries.len(), 1);
        assert_eq!(a.sub_entries[0].surface(), "1024");
        assert_eq!(a.synonyms, vec!["1024센티".to_string()]);
    }

    #[test]
    fn test_position_order() {
        let mut queue = vec![
            entry("b", 3, None),
            entry("abc", 0, None),
            RuleEntry::from_str("", 0, 0, Some(TokenType::Symbol)),
            entry("a", 0, None),
        ];
        sort_entries(&mut queue);
        let got: Vec<_> = queue.iter().map(|e| (e.start_offset, e.end_offset)).collect();
        assert_eq!(got, vec![(0, 0), (0, 3), (0, 1), (3, 4)]);
    }

    #[test]
    fn test_split_entry() {
        let mut queue = vec![];
        let n = split_entry(entry("ab12 가", 5, None), &mut queue, 0);
        assert_eq!(n, 3);
        let got: Vec<_> = queue
            .iter()
            .map(|e| (e.surface(), e.range(), e.token_type))
            .collect();
        assert_eq!(
            got,
            vec![
                ("ab".to_string(), 5..7, Some(TokenType::Alpha)),
                ("12".to_string(), 7..9, Some(TokenType::Number)),
                ("가".to_string(), 10..11, Some(TokenType::Hangul)),
            ]
        );
        assert!(queue.iter().all(|e| e.same_buf(&queue[0])));
    }

    #[test]
    fn test_term_out_of_range() {
        let mut e = entry("abc", 0, None);
        e.length = 10;
        assert_eq!(e.surface(), "abc");
        assert_eq!(e.char_at(3), '\0');
    }
}
