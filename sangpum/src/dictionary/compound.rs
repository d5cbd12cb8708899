//! 複合名詞辞書
//!
//! 複合名詞をキーとし、構成する名詞の列を値として保持します。

use std::io::{Read, Write};

use hashbrown::{HashMap, HashSet};

use crate::char_window::{CharKey, CharWindow};
use crate::dictionary::codec::{DataInput, DataOutput};
use crate::dictionary::map::{
    parse_key_value, read_map, read_words, restore_map_lines, write_map, write_words, WindowMap,
};
use crate::dictionary::source::{DictionaryKind, DictionarySource};
use crate::errors::Result;

/// 複合名詞辞書。
#[derive(Clone, Debug, Default)]
pub struct CompoundDictionary {
    map: WindowMap,
    main_words: HashSet<CharWindow>,
    words: HashSet<CharWindow>,
    ignore_case: bool,
}

impl CompoundDictionary {
    /// 複合名詞と、カンマ区切りの構成名詞を登録します。
    pub fn add_entry(&mut self, keyword: Option<&str>, value: &str) {
        let Some(keyword) = keyword else {
            return;
        };
        let main = CharWindow::from_str(keyword.trim(), self.ignore_case);
        if main.is_empty() {
            return;
        }
        self.main_words.insert(main.clone());
        let mut list = vec![];
        for noun in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let word = CharWindow::from_str(noun, self.ignore_case);
            self.words.insert(word.clone());
            list.push(word);
        }
        if !list.is_empty() {
            self.map.insert(main, list);
        }
    }

    /// 複合名詞の構成名詞を返します。
    #[inline(always)]
    pub fn get(&self, key: CharKey<'_>) -> Option<&[CharWindow]> {
        self.map.get(&key).map(Vec::as_slice)
    }

    /// 複合名詞として登録されているかを判定します。
    #[inline(always)]
    pub fn contains_key(&self, key: CharKey<'_>) -> bool {
        self.map.contains_key(&key)
    }

    /// 構成名詞として現れるかを判定します。
    #[inline(always)]
    pub fn contains_word(&self, key: CharKey<'_>) -> bool {
        self.words.contains(&key)
    }

    #[inline(always)]
    pub fn map(&self) -> &WindowMap {
        &self.map
    }

    #[inline(always)]
    pub fn main_words(&self) -> &HashSet<CharWindow> {
        &self.main_words
    }

    #[inline(always)]
    pub fn words(&self) -> &HashSet<CharWindow> {
        &self.words
    }
}

impl DictionarySource for CompoundDictionary {
    const KIND: DictionaryKind = DictionaryKind::Compound;

    fn with_ignore_case(ignore_case: bool) -> Self {
        Self {
            map: HashMap::new(),
            main_words: HashSet::new(),
            words: HashSet::new(),
            ignore_case,
        }
    }

    fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    fn add_source_line(&mut self, line: &str) {
        if let Some((keyword, value)) = parse_key_value(line) {
            self.add_entry(keyword.as_deref(), &value);
        }
    }

    fn write_to<W: Write>(&self, out: &mut DataOutput<W>) -> Result<()> {
        write_map(&self.map, out)?;
        write_words(&self.main_words, self.main_words.len(), out)?;
        write_words(&self.words, self.words.len(), out)
    }

    fn read_from<R: Read>(input: &mut DataInput<R>, ignore_case: bool) -> Result<Self> {
        let map = read_map(input, ignore_case)?;
        let main_words = read_words(input, ignore_case)?;
        let words = read_words(input, ignore_case)?;
        Ok(Self {
            map,
            main_words,
            words,
            ignore_case,
        })
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn noun_words(&self) -> impl Iterator<Item = &CharWindow> {
        self.map.keys()
    }

    fn restore_lines(&self) -> Vec<String> {
        restore_map_lines(&self.map, ",")
    }
}
