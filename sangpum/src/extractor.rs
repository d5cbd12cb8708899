//! 三角表による語分割
//!
//! 1つの区間に対して、辞書で確認できた候補を`table[row][column]`に並べ、
//! 後方から最良優先探索で候補をつないで最もスコアの高い分割を求めます。
//!
//! `row`は候補の末尾位置、`column`は候補の長さです。
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::ops::Range;
use std::rc::Rc;

use crate::char_window::CharKey;
use crate::chars::has_batchim;
use crate::common::{FAST_RESULT_MIN_LENGTH, QUEUE_MAX, RESULT_MAX, TABULAR_SIZE};
use crate::dictionary::tag_prob::{PosTag, TagProb, TagProbDictionary};
use crate::segmenter;

const JOSA_LIST: &[&str] = &[
    "은", "는", "이", "가", "을", "를", "에", "과", "와", "의", "로", "만", "께", "에게", "에서", "으로",
    "부터", "라서", "라고", "께서", "한테", "처럼", "같이", "라는", "하며", "하고", "까지", "이라고",
    "이라는", "이라도", "이라면", "에서도", "이기도",
];

fn is_josa(span: &[char]) -> bool {
    JOSA_LIST.iter().any(|j| j.chars().eq(span.iter().copied()))
}

fn is_digit(span: &[char]) -> bool {
    span.iter().all(char::is_ascii_digit)
}

fn is_alpha(span: &[char]) -> bool {
    span.iter().all(char::is_ascii_alphabetic)
}

fn is_symbol(span: &[char]) -> bool {
    span.iter().all(|c| !c.is_alphanumeric())
}

/// 抽出された1つの語。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    offset: usize,
    length: usize,
    tag_prob: TagProb,
}

impl Segment {
    /// 入力全体での開始位置(文字単位)。
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 長さ(文字数)。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.length
    }

    /// 長さが0か。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// 入力全体での範囲。
    #[inline(always)]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }

    /// 品詞タグ。
    #[inline(always)]
    pub fn tag(&self) -> PosTag {
        self.tag_prob.tag()
    }

    #[inline(always)]
    pub fn tag_prob(&self) -> TagProb {
        self.tag_prob
    }
}

// A candidate segmentation is a linked list from its head to the window end.
// Heads are prepended as the search walks backward, so tails are shared.
#[derive(Debug)]
struct Chain {
    start: usize,
    len: usize,
    tag_prob: TagProb,
    next: Option<Rc<Chain>>,
    /// Sum of log probabilities from this node to the end.
    score: f64,
}

impl Chain {
    fn new(start: usize, len: usize, tag_prob: TagProb, next: Option<Rc<Chain>>) -> Rc<Self> {
        let score = tag_prob.prob() + next.as_ref().map_or(0.0, |n| n.score);
        Rc::new(Self {
            start,
            len,
            tag_prob,
            next,
            score,
        })
    }

    #[inline(always)]
    fn row(&self) -> usize {
        self.start + self.len - 1
    }

    fn iter(&self) -> ChainIter<'_> {
        ChainIter { cur: Some(self) }
    }

    fn last(&self) -> &Chain {
        let mut cur = self;
        while let Some(next) = cur.next.as_deref() {
            cur = next;
        }
        cur
    }

    fn to_segments(&self, base: usize) -> Vec<Segment> {
        self.iter()
            .filter(|c| c.len > 0)
            .map(|c| Segment {
                offset: base + c.start,
                length: c.len,
                tag_prob: c.tag_prob,
            })
            .collect()
    }
}

struct ChainIter<'a> {
    cur: Option<&'a Chain>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Chain;

    fn next(&mut self) -> Option<&'a Chain> {
        let cur = self.cur?;
        self.cur = cur.next.as_deref();
        Some(cur)
    }
}

/// Best-first queue item. Higher score first, then insertion order.
struct QueueItem {
    chain: Rc<Chain>,
    seq: u64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for QueueItem {}
impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chain
            .score
            .total_cmp(&other.chain.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// The search gave up because the queue reached its bound.
#[derive(Debug)]
struct QueueOverflow;

struct Context<'a> {
    dict: &'a TagProbDictionary,
    text: &'a [char],
    is_unicode: bool,
}

/// 三角表による語分割器。
///
/// 表と探索キューを解析をまたいで再利用します。1つのスレッドで使うことを想定しています。
///
/// # 例
///
/// ```
/// use sangpum::dictionary::tag_prob::{PosTag, TagProbDictionary};
/// use sangpum::dictionary::source::DictionarySource;
/// use sangpum::extractor::Extractor;
///
/// let dict = TagProbDictionary::from_lines(["노트북\tNNG\t-5.0", "가방\tNNG\t-5.0"], true);
/// let chars: Vec<char> = "노트북가방".chars().collect();
///
/// let mut extractor = Extractor::new();
/// let segments = extractor.extract(&dict, &chars, 0..chars.len());
/// let ranges: Vec<_> = segments.iter().map(|s| s.range()).collect();
/// assert_eq!(ranges, vec![0..3, 3..5]);
/// assert_eq!(segments[0].tag(), PosTag::N);
/// ```
pub struct Extractor {
    width: usize,
    table: Vec<Vec<Vec<TagProb>>>,
    status: Vec<usize>,
    queue: BinaryHeap<QueueItem>,
    results: Vec<Rc<Chain>>,
    seq: u64,
    fast_result: bool,
    fast_found: bool,
    offset: usize,
    length: usize,
    peak_queue_len: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// 既定の表の幅で分割器を生成します。
    pub fn new() -> Self {
        Self::with_width(TABULAR_SIZE)
    }

    /// 表の幅を指定して分割器を生成します。
    ///
    /// # 引数
    ///
    /// * `width` - 1回の探索で扱う最大文字数。0は1として扱います。
    pub fn with_width(width: usize) -> Self {
        let width = width.max(1);
        Self {
            width,
            table: vec![vec![vec![]; width + 2]; width],
            status: vec![0; width],
            queue: BinaryHeap::new(),
            results: vec![],
            seq: 0,
            fast_result: true,
            fast_found: false,
            offset: 0,
            length: 0,
            peak_queue_len: 0,
        }
    }

    /// 最初の候補が見つかった時点で探索を打ち切るかを指定します。
    ///
    /// 打ち切りは長さが6文字を超える区間にのみ適用されます。
    pub fn fast_result(mut self, yes: bool) -> Self {
        self.fast_result = yes;
        self
    }

    pub fn set_fast_result(&mut self, yes: bool) {
        self.fast_result = yes;
    }

    /// 表の幅。
    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    /// 直前の[`Self::extract`]で観測したキューの最大長。
    #[inline(always)]
    pub fn peak_queue_len(&self) -> usize {
        self.peak_queue_len
    }

    /// 最後に探索した窓の候補を、スコアの高い順に返します。最大10件です。
    pub fn results(&self) -> Vec<Vec<Segment>> {
        let mut results: Vec<_> = self.results.iter().collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
            .into_iter()
            .map(|c| c.to_segments(self.offset))
            .collect()
    }

    /// 範囲を分割します。
    ///
    /// 範囲が表の幅を超える場合は窓に分けて順に分割し、結果をつなげます。
    ///
    /// # 引数
    ///
    /// * `dict` - システム辞書
    /// * `chars` - 入力全体
    /// * `range` - 分割する範囲
    ///
    /// # 戻り値
    ///
    /// 範囲を先頭から覆う語の列
    pub fn extract(&mut self, dict: &TagProbDictionary, chars: &[char], range: Range<usize>) -> Vec<Segment> {
        self.peak_queue_len = 0;
        let mut segments: Vec<Segment> = vec![];
        for window in segmenter::segment_windows(chars, range, self.width) {
            let found = self.extract_window(dict, chars, window);
            segments.extend(found);
        }
        segments
    }

    fn reset(&mut self, window: &Range<usize>) {
        self.offset = window.start;
        self.length = window.len();
        for row in &mut self.table[..self.length] {
            row.iter_mut().for_each(Vec::clear);
        }
        self.status.fill(0);
        self.queue.clear();
        self.results.clear();
        self.fast_found = false;
    }

    fn extract_window(&mut self, dict: &TagProbDictionary, chars: &[char], window: Range<usize>) -> Vec<Segment> {
        self.reset(&window);
        let text = &chars[window.clone()];
        let cx = Context {
            dict,
            text,
            is_unicode: text.iter().any(|&c| c as u32 > 127),
        };
        let chain = match self.fill_table(&cx) {
            Some(chain) => chain,
            None => match self.make_result(&cx) {
                Ok(()) => self.best_result(),
                Err(QueueOverflow) => {
                    log::debug!(
                        "[sangpum] lattice queue exceeded {} : {}",
                        QUEUE_MAX,
                        text.iter().collect::<String>()
                    );
                    self.queue.clear();
                    self.results.clear();
                    Chain::new(0, self.length, TagProb::UNK, None)
                }
            },
        };
        chain.to_segments(window.start)
    }

    /// Fills the table. Returns early when the whole window is a single word.
    fn fill_table(&mut self, cx: &Context<'_>) -> Option<Rc<Chain>> {
        let text = cx.text;
        let length = text.len();
        let first_tag = |span: &[char]| cx.dict.find(CharKey::exact(span)).and_then(|t| t.first().copied());

        if length == 1 {
            let tag_prob = first_tag(text).unwrap_or(if is_digit(text) {
                TagProb::DIGIT
            } else if is_symbol(text) {
                TagProb::SYMBOL
            } else {
                TagProb::UNK
            });
            return Some(Chain::new(0, 1, tag_prob, None));
        }
        if let Some(tag_prob) = first_tag(text) {
            return Some(Chain::new(0, length, tag_prob, None));
        }

        for row in (0..length).rev() {
            for column in (1..=row + 1).rev() {
                let span = &text[row + 1 - column..=row];
                let cell = &mut self.table[row][column];
                if is_digit(span) {
                    cell.push(TagProb::DIGIT);
                    self.status[row] += 1;
                    continue;
                }
                if is_symbol(span) {
                    cell.push(TagProb::SYMBOL);
                    self.status[row] += 1;
                    continue;
                }
                let alpha = is_alpha(span);
                if alpha && column == 1 {
                    // A single letter never counts as an analysis.
                    cell.push(TagProb::ALPHA);
                    continue;
                }
                match cx.dict.find(CharKey::exact(span)) {
                    Some(tags) if !tags.is_empty() => {
                        cell.extend_from_slice(tags);
                        self.status[row] += 1;
                    }
                    _ => {
                        if alpha {
                            cell.push(TagProb::ALPHA);
                        }
                    }
                }
                if column < 3 && is_josa(span) {
                    cell.insert(0, TagProb::JOSA);
                    self.status[row] += 1;
                }
            }
        }
        None
    }

    fn make_result(&mut self, cx: &Context<'_>) -> Result<(), QueueOverflow> {
        let length = self.length;
        let Some(head_row) = (0..length).rev().find(|&row| self.status[row] > 0) else {
            self.add_result(Chain::new(0, length, TagProb::UNK, None));
            return Ok(());
        };
        // The end of the window without candidates becomes one unknown tail.
        let tail = (head_row < length - 1).then(|| Chain::new(head_row + 1, length - 1 - head_row, TagProb::UNK, None));
        self.connect_all_to(cx, head_row, tail)?;

        while let Some(item) = self.queue.pop() {
            let tail = item.chain;
            let connect_row = tail.start - 1;
            if self.status[connect_row] > 0 {
                self.connect_all_to(cx, connect_row, Some(tail))?;
            } else {
                self.bridge_gap(connect_row, tail)?;
            }
        }
        Ok(())
    }

    /// Covers rows without candidates in front of `tail` with an unknown span.
    fn bridge_gap(&mut self, connect_row: usize, tail: Rc<Chain>) -> Result<(), QueueOverflow> {
        match (0..connect_row).rev().find(|&row| self.status[row] > 0) {
            Some(row) => {
                let gap = Chain::new(row + 1, connect_row - row, TagProb::UNK, Some(tail));
                self.add_queue(gap)
            }
            None => {
                let gap = Chain::new(0, connect_row + 1, TagProb::UNK, Some(tail));
                self.add_result(gap);
                Ok(())
            }
        }
    }

    fn connect_all_to(&mut self, cx: &Context<'_>, head_row: usize, tail: Option<Rc<Chain>>) -> Result<usize, QueueOverflow> {
        let mut found = 0;
        // Longest first.
        for head_column in (1..=head_row + 1).rev() {
            let first = self.table[head_row][head_column].first();
            if first.is_some_and(|t| t.tag() != PosTag::ALPHA) {
                self.connect_to(cx, head_row, head_column, tail.as_ref())?;
                found += 1;
            }
            if found >= self.status[head_row] {
                break;
            }
        }
        // An ascii-only window must be fully analyzed.
        if !cx.is_unicode {
            self.results.retain(|r| r.last().tag_prob.tag() != PosTag::UNK);
        }
        Ok(found)
    }

    fn connect_to(
        &mut self,
        cx: &Context<'_>,
        head_row: usize,
        head_column: usize,
        tail: Option<&Rc<Chain>>,
    ) -> Result<(), QueueOverflow> {
        let start = head_row + 1 - head_column;
        for i in 0..self.table[head_row][head_column].len() {
            let tag_prob = self.table[head_row][head_column][i];
            if let Some(tail) = tail {
                if !self.is_connectable(cx, tag_prob, head_row, head_column, tail) {
                    continue;
                }
            }
            let chain = Chain::new(start, head_column, tag_prob, tail.cloned());
            if start == 0 {
                self.add_result(chain);
            } else {
                self.add_queue(chain)?;
            }
        }
        Ok(())
    }

    fn is_connectable(&self, cx: &Context<'_>, head: TagProb, head_row: usize, head_column: usize, tail: &Chain) -> bool {
        let head_tag = head.tag();
        let tail_tag = tail.tag_prob.tag();
        // Adjacent numbers, letters or symbols were over-split.
        if head_tag == tail_tag && matches!(head_tag, PosTag::DIGIT | PosTag::ALPHA | PosTag::SYMBOL) {
            return false;
        }
        if !matches!(head_tag, PosTag::ALPHA | PosTag::DIGIT | PosTag::SYMBOL)
            && tail_tag == PosTag::J
            && tail.len == 1
        {
            let batchim = has_batchim(cx.text[head_row]);
            match cx.text[tail.start] {
                '은' | '이' | '을' | '과' if !batchim => return false,
                '는' | '가' | '를' | '와' if batchim => return false,
                _ => {}
            }
        }
        // Two single characters that also form a word are not split.
        if head_column == 1 && tail.len == 1 && head_tag != PosTag::J && tail_tag != PosTag::J {
            if !self.table[tail.row()][tail.len + head_column].is_empty() {
                return false;
            }
        }
        true
    }

    fn add_queue(&mut self, chain: Rc<Chain>) -> Result<(), QueueOverflow> {
        if self.fast_found {
            return Ok(());
        }
        self.seq += 1;
        self.queue.push(QueueItem { chain, seq: self.seq });
        self.peak_queue_len = self.peak_queue_len.max(self.queue.len());
        if self.queue.len() >= QUEUE_MAX {
            return Err(QueueOverflow);
        }
        Ok(())
    }

    fn add_result(&mut self, chain: Rc<Chain>) {
        if !final_check(&chain) {
            return;
        }
        self.results.push(chain);
        if self.fast_result && self.length > FAST_RESULT_MIN_LENGTH {
            self.fast_found = true;
            self.queue.clear();
        }
        if self.results.len() >= RESULT_MAX {
            let best = self.high_result();
            self.results.clear();
            self.results.extend(best);
        }
    }

    fn high_result(&self) -> Option<Rc<Chain>> {
        let mut best: Option<&Rc<Chain>> = None;
        for chain in self.results.iter().filter(|c| final_check(c)) {
            match best {
                Some(b) if chain.score <= b.score => {}
                _ => best = Some(chain),
            }
        }
        best.cloned()
    }

    fn best_result(&self) -> Rc<Chain> {
        self.high_result()
            .unwrap_or_else(|| Chain::new(0, self.length, TagProb::UNK, None))
    }
}

/// Rejects chains led by a particle and chains made only of single characters
/// unless they end in a particle.
fn final_check(chain: &Chain) -> bool {
    if chain.tag_prob.tag() == PosTag::J {
        return false;
    }
    if chain.next.is_some() && chain.iter().all(|c| c.len == 1) {
        return chain.last().tag_prob.tag() == PosTag::J;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::source::DictionarySource;

    #[track_caller]
    fn dict(lines: &[&str]) -> TagProbDictionary {
        TagProbDictionary::from_lines(lines.iter().copied(), true)
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn ranges(segments: &[Segment]) -> Vec<Range<usize>> {
        segments.iter().map(Segment::range).collect()
    }

    #[test]
    fn test_single_char() {
        let d = dict(&[]);
        let mut ex = Extractor::new();
        let seg = ex.extract(&d, &chars("7"), 0..1);
        assert_eq!(seg[0].tag(), PosTag::DIGIT);
        let seg = ex.extract(&d, &chars("#"), 0..1);
        assert_eq!(seg[0].tag(), PosTag::SYMBOL);
        let seg = ex.extract(&d, &chars("가"), 0..1);
        assert_eq!(seg[0].tag(), PosTag::UNK);
    }

    #[test]
    fn test_exact_match() {
        let d = dict(&["노트북\tNNG\t-5.0"]);
        let mut ex = Extractor::new();
        let input = chars("노트북");
        let seg = ex.extract(&d, &input, 0..3);
        assert_eq!(ranges(&seg), vec![0..3]);
        assert_eq!(seg[0].tag(), PosTag::N);
    }

    #[test]
    fn test_unknown_tail() {
        let d = dict(&["대한\tNNG\t-5.0"]);
        let mut ex = Extractor::new();
        let input = chars("대한민국");
        let seg = ex.extract(&d, &input, 0..4);
        assert_eq!(ranges(&seg), vec![0..2, 2..4]);
        assert_eq!(seg[0].tag(), PosTag::N);
        assert_eq!(seg[1].tag(), PosTag::UNK);
    }

    #[test]
    fn test_unknown_head_gap() {
        let d = dict(&["민국\tNNG\t-5.0"]);
        let mut ex = Extractor::new();
        let input = chars("대한민국");
        let seg = ex.extract(&d, &input, 0..4);
        assert_eq!(ranges(&seg), vec![0..2, 2..4]);
        assert_eq!(seg[0].tag(), PosTag::UNK);
        assert_eq!(seg[1].tag(), PosTag::N);
    }

    #[test]
    fn test_josa_batchim() {
        let d = dict(&["가방\tNNG\t-5.0", "사과\tNNG\t-5.0"]);
        let mut ex = Extractor::new().fast_result(false);

        // 가방 ends with a batchim, so 은 attaches.
        let seg = ex.extract(&d, &chars("가방은"), 0..3);
        assert_eq!(ranges(&seg), vec![0..2, 2..3]);
        assert_eq!(seg[1].tag(), PosTag::J);

        // 사과 has no batchim, so 은 does not attach as a particle.
        let seg = ex.extract(&d, &chars("사과은"), 0..3);
        assert_ne!(seg.last().map(Segment::tag), Some(PosTag::J));
    }

    #[test]
    fn test_ascii_requires_full_analysis() {
        let d = dict(&["usb\tNNG\t-5.0"]);
        let mut ex = Extractor::new();
        let input = chars("usbqz");
        let seg = ex.extract(&d, &input, 0..5);
        // A result ending with an unknown span is rejected for ascii input.
        assert_eq!(ranges(&seg), vec![0..5]);
        assert_eq!(seg[0].tag(), PosTag::UNK);
    }

    #[test]
    fn test_results_are_ranked() {
        let d = dict(&["노트\tNNG\t-5.0", "트북\tNNG\t-8.0", "북\tNNG\t-10.0", "노\tNNG\t-10.0"]);
        let mut ex = Extractor::new();
        let input = chars("노트북");
        let seg = ex.extract(&d, &input, 0..3);
        assert_eq!(ranges(&seg), vec![0..2, 2..3]);

        let results = ex.results();
        assert_eq!(results.len(), 2);
        assert_eq!(ranges(&results[0]), vec![0..2, 2..3]);
        assert_eq!(ranges(&results[1]), vec![0..1, 1..3]);
    }

    #[test]
    fn test_long_run_is_windowed() {
        let d = dict(&["가가\tNNG\t-5.0"]);
        let mut ex = Extractor::new();
        let input = chars(&"가".repeat(45));
        let seg = ex.extract(&d, &input, 0..45);
        assert_eq!(seg.first().map(Segment::offset), Some(0));
        let last = seg.last().unwrap();
        assert_eq!(last.offset() + last.len(), 45);
        for pair in seg.windows(2) {
            assert_eq!(pair[0].offset() + pair[0].len(), pair[1].offset());
        }
    }

    #[test]
    fn test_queue_is_bounded() {
        let d = dict(&["가\tNNG\t-5.0", "가가\tNNG\t-5.0", "가가가\tNNG\t-5.0"]);
        let mut ex = Extractor::new().fast_result(false);
        let input = chars(&"가".repeat(10_000));
        let seg = ex.extract(&d, &input, 0..input.len());
        assert!(ex.peak_queue_len() <= QUEUE_MAX);
        let covered: usize = seg.iter().map(Segment::len).sum();
        assert_eq!(covered, 10_000);
    }
}
