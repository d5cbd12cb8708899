//! 任意の値を持つ辞書
//!
//! キーごとに型付きの値(単一の文字列または文字列のリスト)の列を保持します。
//! メーカー・ブランド・カテゴリなどのID付き辞書に使われます。

use std::io::{Read, Write};

use hashbrown::{HashMap, HashSet};

use crate::char_window::{CharKey, CharWindow};
use crate::dictionary::codec::{DataInput, DataOutput};
use crate::dictionary::map::{parse_key_value, read_words, write_words};
use crate::dictionary::source::{DictionaryKind, DictionarySource};
use crate::errors::{Result, SangpumError};

const TYPE_SCALAR: u8 = 1;
const TYPE_LIST: u8 = 2;

/// 辞書の値。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CustomValue {
    /// 単一の文字列
    Scalar(CharWindow),
    /// 文字列のリスト
    List(Vec<CharWindow>),
}

impl CustomValue {
    fn restore(&self) -> String {
        match self {
            Self::Scalar(v) => v.to_string().trim().to_string(),
            Self::List(list) => {
                let parts: Vec<String> = list.iter().map(|v| v.to_string().trim().to_string()).collect();
                parts.join(",")
            }
        }
    }
}

/// 任意の値を持つ辞書。
#[derive(Clone, Debug, Default)]
pub struct CustomDictionary {
    map: HashMap<CharWindow, Vec<CustomValue>>,
    words: HashSet<CharWindow>,
    ignore_case: bool,
}

impl CustomDictionary {
    /// エントリを追加します。キーと各値は単語集合にも追加されます。
    pub fn add_entry(&mut self, keyword: Option<&str>, values: &[&str]) {
        let Some(keyword) = keyword else {
            return;
        };
        let key = CharWindow::from_str(keyword, self.ignore_case).trim();
        if key.is_empty() {
            return;
        }
        self.words.insert(key.clone());
        let mut list = Vec::with_capacity(values.len());
        for value in values {
            let value = CharWindow::from_str(value, self.ignore_case);
            self.words.insert(value.clone());
            list.push(CustomValue::Scalar(value));
        }
        self.map.insert(key, list);
    }

    /// キーに対応する値を返します。
    #[inline(always)]
    pub fn get(&self, key: CharKey<'_>) -> Option<&[CustomValue]> {
        self.map.get(&key).map(Vec::as_slice)
    }

    #[inline(always)]
    pub fn contains_key(&self, key: CharKey<'_>) -> bool {
        self.map.contains_key(&key)
    }

    #[inline(always)]
    pub fn contains_word(&self, key: CharKey<'_>) -> bool {
        self.words.contains(&key)
    }

    #[inline(always)]
    pub fn map(&self) -> &HashMap<CharWindow, Vec<CustomValue>> {
        &self.map
    }

    #[inline(always)]
    pub fn words(&self) -> &HashSet<CharWindow> {
        &self.words
    }
}

impl DictionarySource for CustomDictionary {
    const KIND: DictionaryKind = DictionaryKind::Custom;

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
        if let Some((keyword, value)) = parse_key_value(line) {
            self.add_entry(keyword.as_deref(), &[&value]);
        }
    }

    fn write_to<W: Write>(&self, out: &mut DataOutput<W>) -> Result<()> {
        out.write_vcount(self.map.len())?;
        for (key, values) in &self.map {
            out.write_window(key)?;
            out.write_vcount(values.len())?;
            for value in values {
                match value {
                    CustomValue::Scalar(v) => {
                        out.write_byte(TYPE_SCALAR)?;
                        out.write_window(v)?;
                    }
                    CustomValue::List(list) => {
                        out.write_byte(TYPE_LIST)?;
                        out.write_vcount(list.len())?;
                        for v in list {
                            out.write_window(v)?;
                        }
                    }
                }
            }
        }
        write_words(&self.words, self.words.len(), out)
    }

    fn read_from<R: Read>(input: &mut DataInput<R>, ignore_case: bool) -> Result<Self> {
        let size = input.read_vcount()?;
        let mut map = HashMap::with_capacity(size.min(1 << 16));
        for _ in 0..size {
            let key = input.read_window(ignore_case)?;
            let count = input.read_vcount()?;
            let mut values = Vec::with_capacity(count.min(64));
            for _ in 0..count {
                let position = input.position();
                match input.read_byte()? {
                    TYPE_SCALAR => values.push(CustomValue::Scalar(input.read_window(ignore_case)?)),
                    TYPE_LIST => {
                        let len = input.read_vcount()?;
                        let mut list = Vec::with_capacity(len.min(64));
                        for _ in 0..len {
                            list.push(input.read_window(ignore_case)?);
                        }
                        values.push(CustomValue::List(list));
                    }
                    _ => return Err(SangpumError::decode("custom value type", position)),
                }
            }
            map.insert(key, values);
        }
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
        let mut lines: Vec<String> = self
            .map
            .iter()
            .map(|(key, values)| {
                let parts: Vec<String> = values.iter().map(CustomValue::restore).collect();
                format!("{}\t{}", key, parts.join(","))
            })
            .collect();
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
    fn test_add_source_line() {
        let mut dict = CustomDictionary::with_ignore_case(true);
        dict.add_source_line("삼성전자\t1001");
        dict.add_source_line("키만");
        assert_eq!(dict.len(), 1);
        let values = dict.get(CharKey::exact(&key("삼성전자"))).unwrap();
        assert_eq!(values, &[CustomValue::Scalar(CharWindow::from_str("1001", true))]);
        assert!(dict.contains_word(CharKey::exact(&key("1001"))));
    }

    #[test]
    fn test_list_value_round_trip() {
        let mut dict = CustomDictionary::with_ignore_case(false);
        dict.add_entry(Some("apple"), &["10"]);
        dict.map.insert(
            CharWindow::from_str("lg", false),
            vec![CustomValue::List(vec![CharWindow::from("1"), CharWindow::from("2")])],
        );
        let mut out = DataOutput::new(vec![]);
        dict.write_to(&mut out).unwrap();
        let bytes = out.into_inner();
        let restored = CustomDictionary::read_from(&mut DataInput::new(bytes.as_slice()), false).unwrap();
        assert_eq!(restored.map(), dict.map());
        assert_eq!(restored.restore_lines(), vec!["apple\t10", "lg\t1,2"]);
    }

    #[test]
    fn test_unknown_value_type() {
        let mut out = DataOutput::new(vec![]);
        out.write_vint(1).unwrap();
        out.write_string("k").unwrap();
        out.write_vint(1).unwrap();
        out.write_byte(9).unwrap();
        let bytes = out.into_inner();
        let result = CustomDictionary::read_from(&mut DataInput::new(bytes.as_slice()), false);
        assert!(matches!(result, Err(SangpumError::Decode(_))));
    }
}
