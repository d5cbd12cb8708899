//! 文字種別とトークン種別
//!
//! 文字単位の分類([`char_type`])と、文字列全体に対する種別の合成
//! ([`term_type`]、[`uni_type`])を提供します。
//! 同じ[`TokenType`]列挙型が、最終的な出力トークンの種別タグとしても使われます。

use std::fmt;

/// 文字およびトークンの種別。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// 空白文字
    Whitespace,
    /// 記号
    Symbol,
    /// アルファベット(大文字・小文字を持つ文字)
    Alpha,
    /// 10進数字
    Number,
    /// ハングル音節
    Hangul,
    /// ハングル互換字母
    HangulJamo,
    /// ひらがな・カタカナ
    Japanese,
    /// CJK統合漢字
    Chinese,
    /// その他の言語の文字
    OtherLanguage,
    /// 分類不能
    Uncategorized,
    /// 区切り記号を含む数字(`1,000`、`1.5`など)
    NumberTrans,
    /// 型番
    ModelName,
    /// 英数字の混在
    Alphanum,
    /// 英数字と記号の混在
    Ascii,
    /// 数字と単位
    Unit,
    /// 数字とアルファベット単位
    UnitAlpha,
    /// 入力全体
    FullString,
    /// 複合名詞
    Compound,
    /// 不用語
    Stopword,
}

impl TokenType {
    /// 種別のタグ文字列を返します。
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Whitespace => "<WHITESPACE>",
            Self::Symbol => "<SYMBOL>",
            Self::Alpha => "<ALPHA>",
            Self::Number => "<NUMBER>",
            Self::Hangul => "<HANGUL>",
            Self::HangulJamo => "<HANGUL_JAMO>",
            Self::Japanese => "<JAPANESE>",
            Self::Chinese => "<CHINESE>",
            Self::OtherLanguage => "<OTHER_LANGUAGE>",
            Self::Uncategorized => "<UNCATEGORIZED>",
            Self::NumberTrans => "<NUMBER_TRANS>",
            Self::ModelName => "<MODEL_NAME>",
            Self::Alphanum => "<ALPHANUM>",
            Self::Ascii => "<ASCII>",
            Self::Unit => "<UNIT>",
            Self::UnitAlpha => "<UNIT_ALPHA>",
            Self::FullString => "<FULL_STRING>",
            Self::Compound => "<COMPOUND>",
            Self::Stopword => "<STOPWORD>",
        }
    }

    /// アルファベット・数字・記号のいずれかであるかを判定します。
    #[inline(always)]
    pub fn is_ascii_like(&self) -> bool {
        matches!(self, Self::Alpha | Self::Number | Self::Symbol)
    }

    /// 数字系の種別であるかを判定します。
    #[inline(always)]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number | Self::NumberTrans)
    }

    /// 単位系の種別であるかを判定します。
    #[inline(always)]
    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Unit | Self::UnitAlpha)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1文字の種別を判定します。
///
/// # 引数
///
/// * `ch` - 判定する文字
///
/// # 戻り値
///
/// 文字の種別。ハングル・日本語・漢字はUnicodeブロックで区別されます。
pub fn char_type(ch: char) -> TokenType {
    if is_whitespace(ch) {
        return TokenType::Whitespace;
    }
    if ch.is_alphabetic() {
        if ch.is_uppercase() || ch.is_lowercase() {
            return TokenType::Alpha;
        }
        return match u32::from(ch) {
            0xAC00..=0xD7AF => TokenType::Hangul,
            0x3130..=0x318F => TokenType::HangulJamo,
            0x3040..=0x30FF => TokenType::Japanese,
            0x4E00..=0x9FFF => TokenType::Chinese,
            _ => TokenType::OtherLanguage,
        };
    }
    if is_decimal_digit(ch) {
        return TokenType::Number;
    }
    if ch.is_numeric() || ch.is_control() || is_combining_mark(ch) || is_fixed_space(ch) {
        return TokenType::Uncategorized;
    }
    TokenType::Symbol
}

// NBSP family is not treated as whitespace.
#[inline(always)]
fn is_fixed_space(ch: char) -> bool {
    matches!(ch, '\u{00A0}' | '\u{2007}' | '\u{202F}')
}

#[inline(always)]
fn is_whitespace(ch: char) -> bool {
    if is_fixed_space(ch) {
        return false;
    }
    ch.is_whitespace() || matches!(ch, '\u{001C}'..='\u{001F}')
}

#[inline(always)]
fn is_decimal_digit(ch: char) -> bool {
    ch.is_ascii_digit() || ('\u{FF10}'..='\u{FF19}').contains(&ch)
}

#[inline(always)]
fn is_combining_mark(ch: char) -> bool {
    matches!(
        u32::from(ch),
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F
    )
}

/// 文字列全体の種別を合成します。
///
/// アルファベットと数字の混在は[`TokenType::Alphanum`]、英数字に記号が続く場合は
/// [`TokenType::Ascii`]、それ以外の混在は[`TokenType::Uncategorized`]になります。
/// 記号で始まる混在は[`TokenType::Uncategorized`]として扱われます。
pub fn term_type(chars: &[char]) -> TokenType {
    let mut ty: Option<TokenType> = None;
    for &ch in chars {
        let cur = char_type(ch);
        ty = Some(match ty {
            Some(prev) if prev != cur => combine(prev, cur),
            _ => cur,
        });
    }
    ty.unwrap_or(TokenType::Uncategorized)
}

fn combine(prev: TokenType, cur: TokenType) -> TokenType {
    use TokenType::*;
    match (prev, cur) {
        (Alpha, Number) | (Number, Alpha) => Alphanum,
        (Alphanum, Alpha) | (Alphanum, Number) => Alphanum,
        (Alpha, Symbol) | (Number, Symbol) | (Alphanum, Symbol) => Ascii,
        (Ascii, Alpha) | (Ascii, Number) | (Ascii, Symbol) => Ascii,
        _ => Uncategorized,
    }
}

/// すべての文字が同じ種別であればその種別を、そうでなければ
/// [`TokenType::Uncategorized`]を返します。
pub fn uni_type(chars: &[char]) -> TokenType {
    let mut iter = chars.iter().map(|&c| char_type(c));
    let Some(first) = iter.next() else {
        return TokenType::Uncategorized;
    };
    if iter.all(|t| t == first) {
        first
    } else {
        TokenType::Uncategorized
    }
}

/// すべての文字がアルファベットか数字であるかを判定します。空文字列は偽です。
pub fn is_alpha_num(chars: &[char]) -> bool {
    !chars.is_empty()
        && chars
            .iter()
            .all(|&c| matches!(char_type(c), TokenType::Alpha | TokenType::Number))
}

/// ハングル音節が終声(パッチム)を持つかを判定します。
///
/// ハングル音節以外の文字は偽を返します。
#[inline(always)]
pub fn has_batchim(ch: char) -> bool {
    let code = u32::from(ch);
    (0xAC00..=0xD7A3).contains(&code) && (code - 0xAC00) % 28 != 0
}
