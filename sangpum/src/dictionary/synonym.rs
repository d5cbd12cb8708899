//! 同義語辞書
//!
//! キーから同義語リストへの対応を保持します。キー付きの行は一方向の同義語、
//! キーのない行は相互に同義語となる語の集まり(双方向)として登録されます。
//!
//! 双方向の同義語は保存時に区別されないため、[`two_way_closure`]で対応表から
//! 相互に参照し合う語の集まりを復元します。

use std::io::{Read, Write};

use hashbrown::{HashMap, HashSet};

use crate::char_window::{CharKey, CharWindow};
use crate::dictionary::codec::{DataInput, DataOutput};
use crate::dictionary::map::{
    parse_key_value, read_map, read_words, write_map, write_words, WindowMap,
};
use crate::dictionary::source::{DictionaryKind, DictionarySource};
use crate::errors::Result;

/// 同義語辞書。
#[derive(Clone, Debug, Default)]
pub struct SynonymDictionary {
    map: WindowMap,
    words: HashSet<CharWindow>,
    ignore_case: bool,
}

/// 既存の値の後ろに、重複しない新しい値を連結します。
fn merge_synonyms(previous: &[CharWindow], values: Vec<CharWindow>) -> Vec<CharWindow> {
    let mut merged = previous.to_vec();
    for value in values {
        if !merged.contains(&value) {
            merged.push(value);
        }
    }
    merged
}

impl SynonymDictionary {
    fn add_word(&mut self, word: &CharWindow) {
        self.words.insert(word.clone());
        if word.has_whitespaces() {
            for fragment in word.split_by_whitespace() {
                self.words.insert(fragment);
            }
        }
    }

    fn put_merged(&mut self, key: CharWindow, values: Vec<CharWindow>) {
        let values = match self.map.get(&key) {
            Some(previous) => merge_synonyms(previous, values),
            None => values,
        };
        if key.has_whitespaces() {
            self.map.insert(key.remove_whitespaces(), values.clone());
        }
        self.map.insert(key, values);
    }

    /// エントリを追加します。
    ///
    /// # 引数
    ///
    /// * `keyword` - 代表語。`None`または空の場合は双方向の同義語として登録されます。
    /// * `value` - カンマ区切りの同義語
    pub fn add_entry(&mut self, keyword: Option<&str>, value: &str) {
        let main = keyword
            .map(|k| CharWindow::from_str(k.trim(), self.ignore_case))
            .filter(|w| !w.is_empty());
        if let Some(main) = &main {
            self.add_word(main);
        }

        let mut raw: Vec<&str> = vec![];
        for synonym in value.split(',') {
            if !raw.contains(&synonym) {
                raw.push(synonym);
            }
        }
        let mut list: Vec<CharWindow> = vec![];
        for synonym in raw {
            let synonym = synonym.trim();
            if synonym.is_empty() {
                continue;
            }
            let word = CharWindow::from_str(synonym, self.ignore_case);
            self.add_word(&word);
            list.push(word);
        }

        match main {
            None => {
                for key in &list {
                    let values: Vec<CharWindow> =
                        list.iter().filter(|v| *v != key).cloned().collect();
                    if !values.is_empty() {
                        self.put_merged(key.clone(), values);
                    }
                }
            }
            Some(main) => {
                let values: Vec<CharWindow> = list.into_iter().filter(|v| *v != main).collect();
                if !values.is_empty() {
                    self.put_merged(main, values);
                }
            }
        }
    }

    /// 語の同義語リストを返します。
    #[inline(always)]
    pub fn get(&self, key: CharKey<'_>) -> Option<&[CharWindow]> {
        self.map.get(&key).map(Vec::as_slice)
    }

    /// 語が代表語として登録されているかを判定します。
    #[inline(always)]
    pub fn contains_key(&self, key: CharKey<'_>) -> bool {
        self.map.contains_key(&key)
    }

    /// 語が代表語・同義語・その断片のいずれかとして現れるかを判定します。
    #[inline(always)]
    pub fn contains_word(&self, key: CharKey<'_>) -> bool {
        self.words.contains(&key)
    }

    /// 対応表。
    #[inline(always)]
    pub fn map(&self) -> &WindowMap {
        &self.map
    }

    /// 登場するすべての語。
    #[inline(always)]
    pub fn words(&self) -> &HashSet<CharWindow> {
        &self.words
    }

    /// 語の双方向同義語を返します。[`two_way_closure`]を参照してください。
    pub fn two_way_synonyms(&self, word: &CharWindow) -> Option<Vec<CharWindow>> {
        two_way_closure(word, &self.map)
    }

    /// 語が一方向の同義語を持つかを判定します。
    ///
    /// 語の同義語のうち一つでも双方向の集まりに含まれないものがあれば真になります。
    pub fn is_one_way_synonym(&self, word: &CharWindow) -> bool {
        let Some(values) = self.map.get(word) else {
            return false;
        };
        let two_way = self.two_way_synonyms(word).unwrap_or_default();
        values.iter().any(|v| !two_way.contains(v))
    }
}

/// 代表語から相互に同義語として参照し合う語の集まりを求めます。
///
/// 代表語の同義語から出発し、代表語を同義語に含む語を集まりに加えていきます。
/// 集まりが固定するまで繰り返したあと、集まりの外を指す値を除き、他のいずれかの
/// 語から参照されていない語を取り除きます。
///
/// # 戻り値
///
/// 代表語を含めて2語以上が残った場合、整列した語のリスト。
/// 代表語が登録されていない場合や集まりが代表語だけになった場合は`None`。
pub fn two_way_closure(main: &CharWindow, map: &WindowMap) -> Option<Vec<CharWindow>> {
    let seed = map.get(main)?;
    let mut keys: Vec<CharWindow> = vec![main.clone()];
    let mut closure: HashMap<CharWindow, Vec<CharWindow>> = HashMap::new();
    closure.insert(main.clone(), seed.clone());

    let mut i = 0;
    while i < keys.len() {
        if let Some(synonyms) = map.get(&keys[i]) {
            log::trace!("[sangpum] SYN {} : {:?}", keys[i], synonyms);
            for synonym in synonyms {
                if keys.contains(synonym) {
                    continue;
                }
                if let Some(sub) = map.get(synonym) {
                    if sub.contains(main) {
                        keys.push(synonym.clone());
                        closure.insert(synonym.clone(), sub.clone());
                    }
                }
            }
        }
        i += 1;
    }

    if closure.len() > 1 {
        for values in closure.values_mut() {
            values.retain(|v| keys.contains(v));
        }
        let mut delete: Vec<&CharWindow> = vec![];
        for word in &keys {
            let missing = keys
                .iter()
                .filter(|&other| other != word)
                .any(|other| closure.get(other).is_some_and(|v| !v.contains(word)));
            if missing {
                delete.push(word);
            }
        }
        for word in delete {
            closure.remove(word);
        }
    }
    log::trace!("[sangpum] closure of {}: {:?}", main, closure.keys());

    if closure.len() > 1 {
        let mut words: Vec<CharWindow> = closure.into_keys().collect();
        words.sort();
        Some(words)
    } else {
        None
    }
}

impl DictionarySource for SynonymDictionary {
    const KIND: DictionaryKind = DictionaryKind::Synonym;

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
            self.add_entry(keyword.as_deref(), &value);
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
        let mut lines = HashSet::new();
        for (word, values) in &self.map {
            let two_way = two_way_closure(word, &self.map);
            let one_way: Vec<String> = values
                .iter()
                .filter(|v| !two_way.as_ref().is_some_and(|t| t.contains(v)))
                .map(|v| v.to_string().trim().to_string())
                .collect();
            if !one_way.is_empty() {
                lines.insert(format!("{}\t{}", word, one_way.join(",")));
            }
            if let Some(two_way) = two_way {
                let joined: Vec<String> = two_way.iter().map(|v| v.to_string().trim().to_string()).collect();
                lines.insert(format!("\t{}", joined.join(",")));
            }
        }
        let mut lines: Vec<String> = lines.into_iter().collect();
        lines.sort();
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> CharWindow {
        CharWindow::from_str(s, true)
    }

    fn names(list: &[CharWindow]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[track_caller]
    fn build(lines: &[&str]) -> SynonymDictionary {
        let mut dict = SynonymDictionary::with_ignore_case(true);
        for line in lines {
            dict.add_source_line(line);
        }
        dict
    }

    #[test]
    fn test_two_way_entry() {
        let dict = build(&["\tTV,티비,텔레비전"]);
        assert_eq!(names(dict.get(w("tv").key()).unwrap()), vec!["티비", "텔레비전"]);
        assert_eq!(names(dict.get(w("티비").key()).unwrap()), vec!["TV", "텔레비전"]);
        assert!(dict.contains_word(w("텔레비전").key()));
    }

    #[test]
    fn test_one_way_entry_with_spaces() {
        let dict = build(&["노트 북\tnotebook,랩탑,notebook"]);
        let values = names(dict.get(w("노트 북").key()).unwrap());
        assert_eq!(values, vec!["notebook", "랩탑"]);
        assert!(dict.contains_key(w("노트북").key()));
        assert!(dict.contains_word(w("노트").key()));
        assert!(dict.contains_word(w("북").key()));
        assert!(!dict.contains_key(w("랩탑").key()));
    }

    #[test]
    fn test_merge_with_previous_values() {
        let dict = build(&["a\tb,c", "a\tc,d"]);
        assert_eq!(names(dict.get(w("a").key()).unwrap()), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_two_way_closure_symmetry() {
        let dict = build(&["\tTV,티비,텔레비전", "TV\t모니터"]);
        let tv = dict.two_way_synonyms(&w("TV")).unwrap();
        assert_eq!(names(&tv), vec!["TV", "텔레비전", "티비"]);
        for word in &tv {
            let other = dict.two_way_synonyms(word).unwrap();
            assert!(other.contains(&w("TV")));
            assert!(tv.contains(word));
        }
        assert!(dict.is_one_way_synonym(&w("TV")));
        assert!(!dict.is_one_way_synonym(&w("티비")));
    }

    #[test]
    fn test_closure_collapses_to_seed() {
        let dict = build(&["a\tb", "b\tc"]);
        assert!(dict.two_way_synonyms(&w("a")).is_none());
        assert!(dict.two_way_synonyms(&w("zzz")).is_none());
        assert!(dict.is_one_way_synonym(&w("a")));
        assert!(!dict.is_one_way_synonym(&w("zzz")));
    }

    #[test]
    fn test_restore_lines() {
        let dict = build(&["\t갑,을", "갑\t병"]);
        assert_eq!(dict.restore_lines(), vec!["\t갑,을", "갑\t병"]);
    }

    #[test]
    fn test_round_trip() {
        let dict = build(&["\tTV,티비", "삼성 전자\tsamsung"]);
        let mut out = DataOutput::new(vec![]);
        dict.write_to(&mut out).unwrap();
        let bytes = out.into_inner();
        let restored = SynonymDictionary::read_from(&mut DataInput::new(bytes.as_slice()), true).unwrap();
        assert_eq!(restored.map(), dict.map());
        assert_eq!(restored.words(), dict.words());
    }
}
