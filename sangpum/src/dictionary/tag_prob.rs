//! 品詞確率辞書(システム辞書)
//!
//! 語から品詞と対数確率の組のリストへの対応を保持します。格子抽出器が参照する
//! 基本の言語辞書で、常に最初に読み込まれます。

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use hashbrown::HashMap;

use crate::char_window::{CharKey, CharWindow};
use crate::dictionary::codec::{DataInput, DataOutput};
use crate::dictionary::source::{DictionaryKind, DictionarySource, NounLevel};
use crate::errors::{Result, SangpumError};
use crate::utils::split_source_line;

/// 最大の確率。
pub const MAX_PROB: f64 = 0.0;
/// 高い確率。
pub const HIGH_PROB: f64 = -5.0;
/// 中程度の確率。
pub const MID_PROB: f64 = -10.0;
/// 最小の確率。1文字の名詞はこれより高くなりません。
pub const MIN_PROB: f64 = -13.0;
/// 未知語の確率。
pub const UNK_PROB: f64 = -20.0;

/// 品詞。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PosTag {
    /// 名詞
    N,
    /// 用言
    V,
    /// 修飾言
    M,
    /// 感嘆詞
    IC,
    /// 助詞
    J,
    /// 語尾
    E,
    /// 接頭辞
    XPN,
    /// 数字
    DIGIT,
    /// 記号
    SYMBOL,
    /// 英字
    ALPHA,
    /// 未知語
    UNK,
}

impl PosTag {
    /// 品詞名を返します。
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::V => "V",
            Self::M => "M",
            Self::IC => "IC",
            Self::J => "J",
            Self::E => "E",
            Self::XPN => "XPN",
            Self::DIGIT => "DIGIT",
            Self::SYMBOL => "SYMBOL",
            Self::ALPHA => "ALPHA",
            Self::UNK => "UNK",
        }
    }

    /// ソース行の品詞名の接頭辞から品詞を選びます。
    ///
    /// `NNG`や`NNP`は[`PosTag::N`]になります。対象外の品詞は`None`です。
    pub fn from_source_prefix(tag: &str) -> Option<Self> {
        if tag.starts_with('N') {
            Some(Self::N)
        } else if tag.starts_with('V') {
            Some(Self::V)
        } else if tag.starts_with('M') {
            Some(Self::M)
        } else if tag.starts_with("IC") {
            Some(Self::IC)
        } else if tag.starts_with('J') {
            Some(Self::J)
        } else if tag.starts_with('E') {
            Some(Self::E)
        } else if tag.starts_with("XPN") {
            Some(Self::XPN)
        } else {
            None
        }
    }
}

impl FromStr for PosTag {
    type Err = SangpumError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "N" => Self::N,
            "V" => Self::V,
            "M" => Self::M,
            "IC" => Self::IC,
            "J" => Self::J,
            "E" => Self::E,
            "XPN" => Self::XPN,
            "DIGIT" => Self::DIGIT,
            "SYMBOL" => Self::SYMBOL,
            "ALPHA" => Self::ALPHA,
            "UNK" => Self::UNK,
            _ => {
                return Err(SangpumError::invalid_format(
                    "pos_tag",
                    format!("unknown part-of-speech: {s}"),
                ));
            }
        })
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 品詞と対数確率の組。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TagProb {
    tag: PosTag,
    prob: f64,
}

impl TagProb {
    /// 数字の固定確率。
    pub const DIGIT: Self = Self::new(PosTag::DIGIT, MID_PROB);
    /// 英字の固定確率。
    pub const ALPHA: Self = Self::new(PosTag::ALPHA, MID_PROB);
    /// 記号の固定確率。
    pub const SYMBOL: Self = Self::new(PosTag::SYMBOL, MID_PROB);
    /// 未知語の固定確率。
    pub const UNK: Self = Self::new(PosTag::UNK, UNK_PROB);
    /// 助詞の固定確率。
    pub const JOSA: Self = Self::new(PosTag::J, HIGH_PROB);

    /// 新しい組を生成します。
    #[inline(always)]
    pub const fn new(tag: PosTag, prob: f64) -> Self {
        Self { tag, prob }
    }

    /// 品詞。
    #[inline(always)]
    pub const fn tag(&self) -> PosTag {
        self.tag
    }

    /// 対数確率。
    #[inline(always)]
    pub const fn prob(&self) -> f64 {
        self.prob
    }
}

impl NounLevel {
    /// 追加名詞に与える確率。
    pub const fn prob(self) -> f64 {
        match self {
            Self::Max => MAX_PROB,
            Self::High => HIGH_PROB,
            Self::Mid => MID_PROB,
            Self::Min => MIN_PROB,
        }
    }
}

/// 品詞確率辞書。
#[derive(Clone, Debug, Default)]
pub struct TagProbDictionary {
    map: HashMap<CharWindow, Vec<TagProb>>,
    ignore_case: bool,
}

impl TagProbDictionary {
    /// 語の品詞確率リストを返します。
    ///
    /// # 引数
    ///
    /// * `key` - 検索する語
    ///
    /// # 戻り値
    ///
    /// 登録されていれば品詞確率のスライス。
    #[inline(always)]
    pub fn find(&self, key: CharKey<'_>) -> Option<&[TagProb]> {
        self.map.get(&key).map(Vec::as_slice)
    }

    /// 対応表。
    #[inline(always)]
    pub fn map(&self) -> &HashMap<CharWindow, Vec<TagProb>> {
        &self.map
    }

    /// 語に品詞確率を追加します。同じ品詞が既にあれば確率の高い方を残します。
    pub fn put(&mut self, word: CharWindow, tag_prob: TagProb) {
        let list = self.map.entry(word).or_default();
        match list.iter_mut().find(|t| t.tag == tag_prob.tag) {
            Some(old) => {
                if old.prob < tag_prob.prob {
                    *old = tag_prob;
                }
            }
            None => list.push(tag_prob),
        }
    }

    /// 語の集合を名詞として追加します。
    ///
    /// # 引数
    ///
    /// * `words` - 追加する語
    /// * `level` - 名詞の強さ。`None`の場合は何も追加しません。
    pub fn append_additional_noun_entry<'a, I>(&mut self, words: I, level: Option<NounLevel>)
    where
        I: IntoIterator<Item = &'a CharWindow>,
    {
        let Some(level) = level else {
            return;
        };
        let tag_prob = TagProb::new(PosTag::N, level.prob());
        for word in words {
            self.put(word.with_ignore_case(self.ignore_case), tag_prob);
        }
    }

    /// 1行を解析して追加します。
    ///
    /// 形式は`語<TAB>品詞<TAB>対数確率`です。注釈行と形式の合わない行は無視されます。
    ///
    /// # エラー
    ///
    /// 確率が数値として解釈できない場合にエラーを返します。
    pub fn try_add_source_line(&mut self, line: &str) -> Result<()> {
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            return Ok(());
        }
        let fields = split_source_line(line);
        let [word, tag, prob] = fields.as_slice() else {
            return Ok(());
        };
        let Some(tag) = PosTag::from_source_prefix(tag) else {
            return Ok(());
        };
        let word = CharWindow::from_str(word.trim(), self.ignore_case);
        let mut prob: f64 = prob.trim().parse()?;
        if word.len() == 1 {
            if tag != PosTag::N {
                return Ok(());
            }
            if prob > MIN_PROB {
                prob = MIN_PROB;
            }
        }
        self.put(word, TagProb::new(tag, prob));
        Ok(())
    }
}

impl DictionarySource for TagProbDictionary {
    const KIND: DictionaryKind = DictionaryKind::System;

    fn with_ignore_case(ignore_case: bool) -> Self {
        Self {
            map: HashMap::new(),
            ignore_case,
        }
    }

    fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    fn add_source_line(&mut self, line: &str) {
        if let Err(e) = self.try_add_source_line(line) {
            log::debug!("[sangpum] skip system dictionary line {line:?}: {e}");
        }
    }

    fn write_to<W: Write>(&self, out: &mut DataOutput<W>) -> Result<()> {
        out.write_count(self.map.len())?;
        for (word, list) in &self.map {
            out.write_window(word)?;
            out.write_count(list.len())?;
            for tag_prob in list {
                out.write_string(tag_prob.tag.as_str())?;
                out.write_double(tag_prob.prob)?;
            }
        }
        Ok(())
    }

    fn read_from<R: Read>(input: &mut DataInput<R>, ignore_case: bool) -> Result<Self> {
        let size = input.read_count()?;
        let mut map = HashMap::with_capacity(size.min(1 << 20));
        for _ in 0..size {
            let word = input.read_window(ignore_case)?;
            let count = input.read_count()?;
            let mut list = Vec::with_capacity(count.min(16));
            for _ in 0..count {
                let tag = input.read_string()?.parse()?;
                list.push(TagProb::new(tag, input.read_double()?));
            }
            map.insert(word, list);
        }
        Ok(Self { map, ignore_case })
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn noun_words(&self) -> impl Iterator<Item = &CharWindow> {
        self.map
            .iter()
            .filter(|(_, list)| list.iter().any(|t| t.tag == PosTag::N))
            .map(|(word, _)| word)
    }

    fn restore_lines(&self) -> Vec<String> {
        let mut lines = vec![];
        for (word, list) in &self.map {
            for tag_prob in list {
                lines.push(format!("{}\t{}\t{}", word, tag_prob.tag, tag_prob.prob));
            }
        }
        lines.sort();
        lines
    }
}
