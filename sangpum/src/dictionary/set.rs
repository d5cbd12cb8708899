//! 集合辞書
//!
//! 単語の有無だけを保持する辞書です。ユーザー辞書、単位辞書、不用語辞書に使われます。

use std::io::{Read, Write};

use hashbrown::HashSet;

use crate::char_window::{CharKey, CharWindow};
use crate::dictionary::codec::{DataInput, DataOutput};
use crate::dictionary::source::{DictionaryKind, DictionarySource};
use crate::errors::Result;

/// 集合辞書。
#[derive(Clone, Debug, Default)]
pub struct SetDictionary {
    set: HashSet<CharWindow>,
    ignore_case: bool,
}

impl SetDictionary {
    /// 単語を追加します。前後の空白を除いて空になる単語は無視され、
    /// 内部の空白は取り除かれます。
    pub fn add_entry(&mut self, keyword: &str) {
        let word = CharWindow::from_str(keyword, self.ignore_case).trim();
        if !word.is_empty() {
            self.set.insert(word.remove_whitespaces());
        }
    }

    /// 単語が含まれるかを判定します。
    #[inline(always)]
    pub fn contains(&self, key: CharKey<'_>) -> bool {
        self.set.contains(&key)
    }

    /// 単語の集合。
    #[inline(always)]
    pub fn set(&self) -> &HashSet<CharWindow> {
        &self.set
    }
}

impl DictionarySource for SetDictionary {
    const KIND: DictionaryKind = DictionaryKind::Set;

    fn with_ignore_case(ignore_case: bool) -> Self {
        Self {
            set: HashSet::new(),
            ignore_case,
        }
    }

    fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    fn add_source_line(&mut self, line: &str) {
        self.add_entry(line);
    }

    fn write_to<W: Write>(&self, out: &mut DataOutput<W>) -> Result<()> {
        out.write_count(self.set.len())?;
        for word in &self.set {
            out.write_window(word)?;
        }
        Ok(())
    }

    fn read_from<R: Read>(input: &mut DataInput<R>, ignore_case: bool) -> Result<Self> {
        let size = input.read_count()?;
        let mut set = HashSet::with_capacity(size.min(1 << 16));
        for _ in 0..size {
            set.insert(input.read_window(ignore_case)?);
        }
        Ok(Self { set, ignore_case })
    }

    fn len(&self) -> usize {
        self.set.len()
    }

    fn noun_words(&self) -> impl Iterator<Item = &CharWindow> {
        self.set.iter()
    }

    fn restore_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.set.iter().map(|w| w.to_string()).collect();
        lines.sort();
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_add_entry() {
        let mut dict = SetDictionary::with_ignore_case(true);
        dict.add_source_line(" 갤럭시 북 ");
        dict.add_source_line("   ");
        dict.add_source_line("CM");
        assert_eq!(dict.len(), 2);
        assert!(dict.contains(CharKey::exact(&key("갤럭시북"))));
        assert!(dict.contains(CharKey::exact(&key("cm"))));
    }

    #[test]
    fn test_case_sensitive() {
        let mut dict = SetDictionary::with_ignore_case(false);
        dict.add_source_line("CM");
        assert!(!dict.contains(CharKey::exact(&key("cm"))));
        assert!(dict.contains(CharKey::new(&key("cm"), true)));
    }

    #[test]
    fn test_round_trip() {
        let mut dict = SetDictionary::with_ignore_case(true);
        for word in ["개", "kg", "ml"] {
            dict.add_source_line(word);
        }
        let mut out = DataOutput::new(vec![]);
        dict.write_to(&mut out).unwrap();
        let bytes = out.into_inner();

        let restored = SetDictionary::read_from(&mut DataInput::new(bytes.as_slice()), true).unwrap();
        assert_eq!(restored.set(), dict.set());
        assert!(restored.ignore_case());
    }
}
