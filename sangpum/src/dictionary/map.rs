//! キーと値リストの辞書
//!
//! [`MapDictionary`]はキーから値の列への対応を保持します。
//! [`InvertMapDictionary`]は同じ保存形式で、値からキーへの逆引きを保持します。

use std::io::{Read, Write};

use hashbrown::HashMap;

use crate::char_window::{CharKey, CharWindow};
use crate::dictionary::codec::{DataInput, DataOutput};
use crate::dictionary::source::{DictionaryKind, DictionarySource};
use crate::errors::Result;
use crate::utils::split_source_line;

/// キーと値リストの対応表。
pub type WindowMap = HashMap<CharWindow, Vec<CharWindow>>;

/// 対応表を書き出します。
pub(crate) fn write_map<W: Write>(map: &WindowMap, out: &mut DataOutput<W>) -> Result<()> {
    out.write_vcount(map.len())?;
    for (key, values) in map {
        out.write_window(key)?;
        out.write_vcount(values.len())?;
        for value in values {
            out.write_window(value)?;
        }
    }
    Ok(())
}

/// 対応表を読み込みます。
pub(crate) fn read_map<R: Read>(input: &mut DataInput<R>, ignore_case: bool) -> Result<WindowMap> {
    let size = input.read_vcount()?;
    let mut map = HashMap::with_capacity(size.min(1 << 16));
    for _ in 0..size {
        let key = input.read_window(ignore_case)?;
        let count = input.read_vcount()?;
        let mut values = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            values.push(input.read_window(ignore_case)?);
        }
        map.insert(key, values);
    }
    Ok(map)
}

/// 単語の集合を書き出します。
pub(crate) fn write_words<'a, W, I>(words: I, len: usize, out: &mut DataOutput<W>) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a CharWindow>,
{
    out.write_vcount(len)?;
    for word in words {
        out.write_window(word)?;
    }
    Ok(())
}

/// 単語の集合を読み込みます。
pub(crate) fn read_words<R: Read>(
    input: &mut DataInput<R>,
    ignore_case: bool,
) -> Result<hashbrown::HashSet<CharWindow>> {
    let size = input.read_vcount()?;
    let mut set = hashbrown::HashSet::with_capacity(size.min(1 << 16));
    for _ in 0..size {
        set.insert(input.read_window(ignore_case)?);
    }
    Ok(set)
}

/// ソース行を`(キー, 値)`に分割します。1列の行はキーなしになります。
pub(crate) fn parse_key_value(line: &str) -> Option<(Option<String>, String)> {
    let fields = split_source_line(line);
    match fields.as_slice() {
        [value] => Some((None, value.trim().to_string())),
        [keyword, value] => Some((Some(keyword.trim().to_string()), value.trim().to_string())),
        _ => None,
    }
}

pub(crate) fn restore_map_lines(map: &WindowMap, separator: &str) -> Vec<String> {
    let mut lines: Vec<String> = map
        .iter()
        .map(|(key, values)| {
            let joined: Vec<String> = values.iter().map(|v| v.to_string().trim().to_string()).collect();
            format!("{}\t{}", key, joined.join(separator))
        })
        .collect();
    lines.sort();
    lines
}

/// キーと値リストの辞書。
#[derive(Clone, Debug, Default)]
pub struct MapDictionary {
    map: WindowMap,
    ignore_case: bool,
}

impl MapDictionary {
    /// エントリを追加します。キーの内部の空白は取り除かれます。
    pub fn add_entry(&mut self, keyword: Option<&str>, values: &[&str]) {
        let Some(keyword) = keyword else {
            return;
        };
        let key = CharWindow::from_str(keyword, self.ignore_case).trim();
        if key.is_empty() {
            return;
        }
        let values = values
            .iter()
            .map(|v| CharWindow::from_str(v, self.ignore_case))
            .collect();
        self.map.insert(key.remove_whitespaces(), values);
    }

    /// キーが含まれるかを判定します。
    #[inline(always)]
    pub fn contains_key(&self, key: CharKey<'_>) -> bool {
        self.map.contains_key(&key)
    }

    /// キーに対応する値の列を返します。
    #[inline(always)]
    pub fn get(&self, key: CharKey<'_>) -> Option<&[CharWindow]> {
        self.map.get(&key).map(Vec::as_slice)
    }

    /// 対応表。
    #[inline(always)]
    pub fn map(&self) -> &WindowMap {
        &self.map
    }
}

impl DictionarySource for MapDictionary {
    const KIND: DictionaryKind = DictionaryKind::Map;

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
        if let Some((keyword, value)) = parse_key_value(line) {
            self.add_entry(keyword.as_deref(), &[&value]);
        }
    }

    fn write_to<W: Write>(&self, out: &mut DataOutput<W>) -> Result<()> {
        write_map(&self.map, out)
    }

    fn read_from<R: Read>(input: &mut DataInput<R>, ignore_case: bool) -> Result<Self> {
        Ok(Self {
            map: read_map(input, ignore_case)?,
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

/// 値からキーを引く逆引き辞書。
#[derive(Clone, Debug, Default)]
pub struct InvertMapDictionary {
    inner: MapDictionary,
}

impl InvertMapDictionary {
    /// エントリを追加します。各値がキーへの逆引きとして登録されます。
    pub fn add_entry(&mut self, keyword: Option<&str>, values: &[&str]) {
        let Some(keyword) = keyword else {
            return;
        };
        let ignore_case = self.inner.ignore_case;
        let key = CharWindow::from_str(keyword, ignore_case).trim();
        if key.is_empty() {
            return;
        }
        for value in values {
            self.inner
                .map
                .insert(CharWindow::from_str(value, ignore_case), vec![key.clone()]);
        }
    }

    /// 値が登録されているかを判定します。
    #[inline(always)]
    pub fn contains_key(&self, key: CharKey<'_>) -> bool {
        self.inner.contains_key(key)
    }

    /// 値に対応するキーを返します。
    #[inline(always)]
    pub fn get(&self, key: CharKey<'_>) -> Option<&[CharWindow]> {
        self.inner.get(key)
    }

    /// 対応表。
    #[inline(always)]
    pub fn map(&self) -> &WindowMap {
        self.inner.map()
    }
}

impl DictionarySource for InvertMapDictionary {
    const KIND: DictionaryKind = DictionaryKind::InvertMap;

    fn with_ignore_case(ignore_case: bool) -> Self {
        Self {
            inner: MapDictionary::with_ignore_case(ignore_case),
        }
    }

    fn ignore_case(&self) -> bool {
        self.inner.ignore_case
    }

    fn add_source_line(&mut self, line: &str) {
        if let Some((keyword, value)) = parse_key_value(line) {
            self.add_entry(keyword.as_deref(), &[&value]);
        }
    }

    fn write_to<W: Write>(&self, out: &mut DataOutput<W>) -> Result<()> {
        self.inner.write_to(out)
    }

    fn read_from<R: Read>(input: &mut DataInput<R>, ignore_case: bool) -> Result<Self> {
        Ok(Self {
            inner: MapDictionary::read_from(input, ignore_case)?,
        })
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn noun_words(&self) -> impl Iterator<Item = &CharWindow> {
        self.inner.map.keys()
    }

    fn restore_lines(&self) -> Vec<String> {
        self.inner.restore_lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_map_source_line() {
        let mut dict = MapDictionary::with_ignore_case(true);
        dict.add_source_line("삼성 전자\tSamsung");
        dict.add_source_line("단일값");
        dict.add_source_line("a\tb\tc");
        assert_eq!(dict.len(), 1);
        let values = dict.get(CharKey::exact(&key("삼성전자"))).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].to_string(), "Samsung");
    }

    #[test]
    fn test_map_round_trip() {
        let mut dict = MapDictionary::with_ignore_case(false);
        dict.add_entry(Some("lg"), &["엘지", "LG전자"]);
        dict.add_entry(Some("sony"), &["소니"]);
        let mut out = DataOutput::new(vec![]);
        dict.write_to(&mut out).unwrap();
        let bytes = out.into_inner();

        let restored = MapDictionary::read_from(&mut DataInput::new(bytes.as_slice()), false).unwrap();
        assert_eq!(restored.map(), dict.map());
        assert!(!restored.ignore_case());
    }

    #[test]
    fn test_invert_map() {
        let mut dict = InvertMapDictionary::with_ignore_case(true);
        dict.add_source_line("삼성전자\t삼성");
        dict.add_entry(Some("삼성전자"), &["samsung"]);
        let keys = dict.get(CharKey::exact(&key("SAMSUNG"))).unwrap();
        assert_eq!(keys[0].to_string(), "삼성전자");
        assert!(dict.contains_key(CharKey::exact(&key("삼성"))));
        assert!(!dict.contains_key(CharKey::exact(&key("삼성전자"))));
    }

    #[test]
    fn test_restore_lines() {
        let mut dict = MapDictionary::with_ignore_case(false);
        dict.add_entry(Some("b"), &["2", "3"]);
        dict.add_entry(Some("a"), &["1"]);
        assert_eq!(dict.restore_lines(), vec!["a\t1", "b\t2,3"]);
    }
}
