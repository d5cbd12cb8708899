//! 文字種別による区間分割
//!
//! 入力を抽出器に渡す前の2段階の分割を提供します。
//!
//! 1. [`split_runs`]: 空白と文字種別の変化で入力を区間に分けます。
//! 2. [`segment_windows`]: 1つの区間が抽出器の表の幅を超える場合に、
//!    安全な切断位置を探して幅以下の窓の列に分けます。

use std::ops::Range;

use crate::chars::{char_type, TokenType};

/// 同じ文字種別が連続する区間。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    /// 区間の範囲(文字単位)
    pub range: Range<usize>,
    /// 区間の文字種別
    pub char_type: TokenType,
}

/// 空白と文字種別の変化で入力を区間に分けます。空白は出力されません。
///
/// # 例
///
/// ```
/// use sangpum::segmenter::split_runs;
///
/// let chars: Vec<char> = "문학100개 abc".chars().collect();
/// let runs: Vec<_> = split_runs(&chars).into_iter().map(|r| r.range).collect();
/// assert_eq!(runs, vec![0..2, 2..5, 5..6, 7..10]);
/// ```
pub fn split_runs(chars: &[char]) -> Vec<Run> {
    let mut runs = vec![];
    let mut start = 0;
    let mut current: Option<TokenType> = None;
    for (i, &ch) in chars.iter().enumerate() {
        let ty = char_type(ch);
        if current != Some(ty) {
            if let Some(prev) = current.filter(|&t| t != TokenType::Whitespace) {
                runs.push(Run {
                    range: start..i,
                    char_type: prev,
                });
            }
            start = i;
            current = Some(ty);
        }
    }
    if let Some(prev) = current.filter(|&t| t != TokenType::Whitespace) {
        runs.push(Run {
            range: start..chars.len(),
            char_type: prev,
        });
    }
    runs
}

#[inline(always)]
fn is_ascii_class(ty: TokenType) -> bool {
    ty.is_ascii_like()
}

/// 幅を超える区間の切断長を求めます。
///
/// 後方から、片側が英数字でない位置に挟まれた`&`以外の記号を探し、その直前で切ります。
/// 見つからなければ先頭から最初に英数字記号とそれ以外が切り替わる位置で切ります。
/// どちらも幅以下にならなければ幅で切ります。
///
/// # 引数
///
/// * `chars` - 入力全体
/// * `range` - 切断対象の区間
/// * `width` - 窓の最大幅
///
/// # 戻り値
///
/// 区間先頭からの切断長。常に`1..=width`に収まります。
pub fn cut_length(chars: &[char], range: Range<usize>, width: usize) -> usize {
    let offset = range.start;
    let mut length = range.len();
    if length <= width {
        return length;
    }

    // Backward scan for a symbol boundary.
    let end = offset + length;
    let alnum = |i: usize| matches!(char_type(chars[i]), TokenType::Alpha | TokenType::Number);
    for inx in (offset + 1..end).rev() {
        let ch = chars[inx];
        if ch == '&' || char_type(ch) != TokenType::Symbol {
            continue;
        }
        let next_alnum = inx + 1 < end && alnum(inx + 1);
        if !alnum(inx - 1) || !next_alnum {
            let cut = inx - offset;
            if cut <= width {
                return cut;
            }
        }
    }

    // Forward scan for the first ascii/non-ascii change.
    let mut prev: Option<TokenType> = None;
    for inx in offset..offset + length {
        let cur = char_type(chars[inx]);
        if let Some(p) = prev {
            if is_ascii_class(p) != is_ascii_class(cur) {
                length = inx - offset;
                break;
            }
        }
        prev = Some(cur);
    }

    length.min(width)
}

/// 区間を幅以下の連続した窓に分けます。
///
/// 各窓は[`cut_length`]で求めた長さを持ち、窓の列は区間全体を重なりなく覆います。
pub fn segment_windows(chars: &[char], range: Range<usize>, width: usize) -> Vec<Range<usize>> {
    let mut windows = vec![];
    let mut pos = range.start;
    while pos < range.end {
        let len = cut_length(chars, pos..range.end, width).max(1);
        windows.push(pos..pos + len);
        pos += len;
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_split_runs_types() {
        let input = chars("  i7-4700mq  노트북");
        let runs = split_runs(&input);
        let types: Vec<_> = runs.iter().map(|r| r.char_type).collect();
        assert_eq!(
            types,
            vec![
                TokenType::Alpha,
                TokenType::Number,
                TokenType::Symbol,
                TokenType::Number,
                TokenType::Alpha,
                TokenType::Hangul,
            ]
        );
        assert_eq!(runs[0].range, 2..3);
        assert_eq!(runs[5].range, 13..16);
    }

    #[test]
    fn test_split_runs_empty() {
        assert!(split_runs(&[]).is_empty());
        assert!(split_runs(&chars("   ")).is_empty());
    }

    #[test]
    fn test_cut_short_run() {
        let input = chars("노트북");
        assert_eq!(cut_length(&input, 0..3, 20), 3);
    }

    #[test]
    fn test_cut_at_symbol_between_hangul() {
        // 가가가가가가가가가가가가(12) + '/' + 나나나나나나나나나나(10)
        let s = format!("{}/{}", "가".repeat(12), "나".repeat(10));
        let input = chars(&s);
        assert_eq!(cut_length(&input, 0..input.len(), 20), 12);
    }

    #[test]
    fn test_ampersand_is_not_a_cut() {
        let s = format!("{}&{}", "가".repeat(12), "나".repeat(10));
        let input = chars(&s);
        // Not a symbol cut, but the ascii class changes at '&'.
        assert_eq!(cut_length(&input, 0..input.len(), 20), 12);
    }

    #[test]
    fn test_hard_cut() {
        let input = chars(&"가".repeat(45));
        assert_eq!(cut_length(&input, 0..45, 20), 20);
        let windows = segment_windows(&input, 0..45, 20);
        assert_eq!(windows, vec![0..20, 20..40, 40..45]);
    }

    #[test]
    fn test_windows_cover_range() {
        let s = format!("abc{}", "가".repeat(30));
        let input = chars(&s);
        let windows = segment_windows(&input, 0..input.len(), 20);
        assert_eq!(windows[0], 0..3);
        assert_eq!(windows.last().unwrap().end, input.len());
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].len() <= 20);
        }
    }
}
