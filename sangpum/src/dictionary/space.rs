//! 分かち書き辞書
//!
//! 空白を含む表記を登録し、空白を除いた形から元の断片へ分割できるようにします。
//! 例えば`"노트북 거치대"`を登録すると、キー`"노트북거치대"`から
//! `["노트북", "거치대"]`が得られます。

use std::io::{Read, Write};

use hashbrown::{HashMap, HashSet};

use crate::char_window::{CharKey, CharWindow};
use crate::dictionary::codec::{DataInput, DataOutput};
use crate::dictionary::map::{
    parse_key_value, read_map, read_words, restore_map_lines, write_map, write_words, WindowMap,
};
use crate::dictionary::source::{DictionaryKind, DictionarySource};
use crate::errors::Result;

/// 分かち書き辞書。
#[derive(Clone, Debug, Default)]
pub struct SpaceDictionary {
    map: WindowMap,
    words: HashSet<CharWindow>,
    ignore_case: bool,
}

impl SpaceDictionary {
    /// 空白区切りの表記を登録します。
    ///
    /// 空白を除いた形がキーになり、ASCII以外を含む断片は単語集合にも追加されます。
    pub fn add_entry(&mut self, value: &str) {
        let keyword: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        if keyword.is_empty() {
            return;
        }
        let key = CharWindow::from_str(&keyword, self.ignore_case);
        self.words.insert(key.clone());
        let fragments: Vec<CharWindow> = value
            .split(char::is_whitespace)
            .filter(|f| !f.is_empty())
            .map(|f| CharWindow::from_str(f, self.ignore_case))
            .collect();
        for fragment in &fragments {
            if !fragment.as_chars().iter().all(char::is_ascii) {
                self.words.insert(fragment.clone());
            }
        }
        self.map.insert(key, fragments);
    }

    /// 空白を除いた形に対応する断片を返します。
    #[inline(always)]
    pub fn get(&self, key: CharKey<'_>) -> Option<&[CharWindow]> {
        self.map.get(&key).map(Vec::as_slice)
    }

    /// キーとして登録されているかを判定します。
    #[inline(always)]
    pub fn contains_key(&self, key: CharKey<'_>) -> bool {
        self.map.contains_key(&key)
    }

    /// 単語集合に含まれるかを判定します。
    #[inline(always)]
    pub fn contains_word(&self, key: CharKey<'_>) -> bool {
        self.words.contains(&key)
    }

    /// 対応表。
    #[inline(always)]
    pub fn map(&self) -> &WindowMap {
        &self.map
    }

    /// 単語集合。
    #[inline(always)]
    pub fn words(&self) -> &HashSet<CharWindow> {
        &self.words
    }
}

impl DictionarySource for SpaceDictionary {
    const KIND: DictionaryKind = DictionaryKind::Space;

    fn with_ignore_case(ignore_case: bool) -> Self {
        Self {
            map: HashMap::new(),
            words: HashSet::new(),
            ignore_case,
        }
    }

    fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    fn add_source_line(&mut self, line: &str) {
        if let Some((_, value)) = parse_key_value(line) {
            self.add_entry(&value);
        }
    }

    fn write_to<W: Write>(&self, out: &mut DataOutput<W>) -> Result<()> {
        write_map(&self.map, out)?;
        write_words(&self.words, self.words.len(), out)
    }

    fn read_from<R: Read>(input: &mut DataInput<R>, ignore_case: bool) -> Result<Self> {
        let map = read_map(input, ignore_case)?;
        let words = read_words(input, ignore_case)?;
        Ok(Self {
            map,
            words,
            ignore_case,
        })
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn noun_words(&self) -> impl Iterator<Item = &CharWindow> {
        self.words.iter()
    }

    fn restore_lines(&self) -> Vec<String> {
        restore_map_lines(&self.map, " ")
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
        let mut dict = SpaceDictionary::with_ignore_case(true);
        dict.add_source_line("노트북 거치대");
        dict.add_source_line("x\tusb  c타입");
        let fragments: Vec<String> = dict
            .get(CharKey::exact(&key("노트북거치대")))
            .unwrap()
            .iter()
            .map(|w| w.to_string())
            .collect();
        assert_eq!(fragments, vec!["노트북", "거치대"]);
        assert!(dict.contains_key(CharKey::exact(&key("USBC타입"))));
        assert!(dict.contains_word(CharKey::exact(&key("c타입"))));
        assert!(!dict.contains_word(CharKey::exact(&key("usb"))));
    }

    #[test]
    fn test_restore_and_round_trip() {
        let mut dict = SpaceDictionary::with_ignore_case(false);
        dict.add_entry("무선 마우스");
        assert_eq!(dict.restore_lines(), vec!["무선마우스\t무선 마우스"]);

        let mut out = DataOutput::new(vec![]);
        dict.write_to(&mut out).unwrap();
        let bytes = out.into_inner();
        let restored = SpaceDictionary::read_from(&mut DataInput::new(bytes.as_slice()), false).unwrap();
        assert_eq!(restored.map(), dict.map());
        assert_eq!(restored.words(), dict.words());
    }
}
