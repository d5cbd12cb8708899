//! 辞書の共通インターフェース
//!
//! すべての辞書は[`DictionarySource`]を実装し、ソース行からの構築とバイナリ入出力を
//! 共通の手順で行います。名前付きの辞書は種類ごとの列挙型[`SourceDictionary`]として
//! 保持され、`match`で振り分けられます。

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

use rkyv::{Archive, Deserialize, Serialize};

use crate::char_window::{CharKey, CharWindow};
use crate::dictionary::codec::{DataInput, DataOutput};
use crate::dictionary::compound::CompoundDictionary;
use crate::dictionary::custom::CustomDictionary;
use crate::dictionary::map::{InvertMapDictionary, MapDictionary};
use crate::dictionary::set::SetDictionary;
use crate::dictionary::space::SpaceDictionary;
use crate::dictionary::synonym::SynonymDictionary;
use crate::errors::{Result, SangpumError};

/// 辞書の種類。
#[derive(
    Clone, Copy, Eq, PartialEq, Debug, Hash,
    Archive, Serialize, Deserialize,
)]
#[rkyv(
    compare(PartialEq),
    derive(Debug, Eq, PartialEq, Hash, Clone, Copy),
)]
#[repr(u8)]
pub enum DictionaryKind {
    /// 品詞確率辞書(システム辞書)
    System,
    /// 集合辞書
    Set,
    /// キーと値リストの辞書
    Map,
    /// 同義語辞書
    Synonym,
    /// 双方向の同義語辞書。保存形式は[`DictionaryKind::Synonym`]と同じです。
    Synonym2Way,
    /// 分かち書き辞書
    Space,
    /// 任意の値を持つ辞書
    Custom,
    /// 逆引き辞書
    InvertMap,
    /// 複合名詞辞書
    Compound,
}

impl DictionaryKind {
    /// 種類名を返します。
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Set => "SET",
            Self::Map => "MAP",
            Self::Synonym => "SYNONYM",
            Self::Synonym2Way => "SYNONYM_2WAY",
            Self::Space => "SPACE",
            Self::Custom => "CUSTOM",
            Self::InvertMap => "INVERT_MAP",
            Self::Compound => "COMPOUND",
        }
    }
}

impl ArchivedDictionaryKind {
    /// この[`ArchivedDictionaryKind`]を対応する[`DictionaryKind`]に変換します。
    pub fn to_native(&self) -> DictionaryKind {
        match self {
            ArchivedDictionaryKind::System => DictionaryKind::System,
            ArchivedDictionaryKind::Set => DictionaryKind::Set,
            ArchivedDictionaryKind::Map => DictionaryKind::Map,
            ArchivedDictionaryKind::Synonym => DictionaryKind::Synonym,
            ArchivedDictionaryKind::Synonym2Way => DictionaryKind::Synonym2Way,
            ArchivedDictionaryKind::Space => DictionaryKind::Space,
            ArchivedDictionaryKind::Custom => DictionaryKind::Custom,
            ArchivedDictionaryKind::InvertMap => DictionaryKind::InvertMap,
            ArchivedDictionaryKind::Compound => DictionaryKind::Compound,
        }
    }
}

impl FromStr for DictionaryKind {
    type Err = SangpumError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "system" => Self::System,
            "set" => Self::Set,
            "map" => Self::Map,
            "synonym" => Self::Synonym,
            "synonym_2way" => Self::Synonym2Way,
            "space" => Self::Space,
            "custom" => Self::Custom,
            "invert_map" => Self::InvertMap,
            "compound" => Self::Compound,
            _ => {
                return Err(SangpumError::invalid_argument(
                    "type",
                    format!("unknown dictionary type: {s}"),
                ));
            }
        })
    }
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 辞書の語をシステム辞書に名詞として追加するときの強さ。
#[derive(
    Clone, Copy, Eq, PartialEq, Debug, Hash,
    Archive, Serialize, Deserialize,
)]
#[rkyv(
    compare(PartialEq),
    derive(Debug, Eq, PartialEq, Hash, Clone, Copy),
)]
#[repr(u8)]
pub enum NounLevel {
    Max,
    High,
    Mid,
    Min,
}

impl ArchivedNounLevel {
    /// この[`ArchivedNounLevel`]を対応する[`NounLevel`]に変換します。
    pub fn to_native(&self) -> NounLevel {
        match self {
            ArchivedNounLevel::Max => NounLevel::Max,
            ArchivedNounLevel::High => NounLevel::High,
            ArchivedNounLevel::Mid => NounLevel::Mid,
            ArchivedNounLevel::Min => NounLevel::Min,
        }
    }
}

impl FromStr for NounLevel {
    type Err = SangpumError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "max" => Self::Max,
            "high" => Self::High,
            "mid" => Self::Mid,
            "min" => Self::Min,
            _ => {
                return Err(SangpumError::invalid_argument(
                    "tokenType",
                    format!("unknown token type: {s}"),
                ));
            }
        })
    }
}

/// ソース行から構築でき、バイナリとして入出力できる辞書。
pub trait DictionarySource: Sized {
    /// 辞書の種類。
    const KIND: DictionaryKind;

    /// 空の辞書を生成します。
    fn with_ignore_case(ignore_case: bool) -> Self;

    /// 大文字小文字を区別せずに比較するかどうか。
    fn ignore_case(&self) -> bool;

    /// ソースの1行を解析して追加します。形式の合わない行は無視されます。
    fn add_source_line(&mut self, line: &str);

    /// バイナリ形式で書き出します。
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合にエラーを返します。
    fn write_to<W: Write>(&self, out: &mut DataOutput<W>) -> Result<()>;

    /// バイナリ形式から読み込みます。
    ///
    /// # エラー
    ///
    /// ストリームが途中で切れている、または破損している場合にエラーを返します。
    fn read_from<R: Read>(input: &mut DataInput<R>, ignore_case: bool) -> Result<Self>;

    /// 主キーの数。
    fn len(&self) -> usize;

    /// 主キーがないかどうか。
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// システム辞書に名詞として追加する語。
    fn noun_words(&self) -> impl Iterator<Item = &CharWindow>;

    /// 辞書をソース行の形式に戻します。行は整列されています。
    fn restore_lines(&self) -> Vec<String>;

    /// ソース行の列から辞書を構築します。
    fn from_lines<I, S>(lines: I, ignore_case: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::with_ignore_case(ignore_case);
        for line in lines {
            dict.add_source_line(line.as_ref());
        }
        dict
    }

    /// バイト列に書き出します。
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = DataOutput::new(vec![]);
        self.write_to(&mut out)?;
        Ok(out.into_inner())
    }

    /// バイト列から読み込みます。
    fn from_bytes(bytes: &[u8], ignore_case: bool) -> Result<Self> {
        Self::read_from(&mut DataInput::new(bytes), ignore_case)
    }
}

/// 名前付きで登録される辞書。
#[derive(Clone, Debug)]
pub enum SourceDictionary {
    Set(SetDictionary),
    Map(MapDictionary),
    Synonym(SynonymDictionary),
    Space(SpaceDictionary),
    Custom(CustomDictionary),
    InvertMap(InvertMapDictionary),
    Compound(CompoundDictionary),
}

macro_rules! dispatch {
    ($self:expr, $d:ident => $body:expr) => {
        match $self {
            SourceDictionary::Set($d) => $body,
            SourceDictionary::Map($d) => $body,
            SourceDictionary::Synonym($d) => $body,
            SourceDictionary::Space($d) => $body,
            SourceDictionary::Custom($d) => $body,
            SourceDictionary::InvertMap($d) => $body,
            SourceDictionary::Compound($d) => $body,
        }
    };
}

impl SourceDictionary {
    /// 種類に対応する空の辞書を生成します。
    ///
    /// # エラー
    ///
    /// [`DictionaryKind::System`]は名前付き辞書として扱えないためエラーになります。
    pub fn new(kind: DictionaryKind, ignore_case: bool) -> Result<Self> {
        Ok(match kind {
            DictionaryKind::Set => Self::Set(SetDictionary::with_ignore_case(ignore_case)),
            DictionaryKind::Map => Self::Map(MapDictionary::with_ignore_case(ignore_case)),
            DictionaryKind::Synonym | DictionaryKind::Synonym2Way => {
                Self::Synonym(SynonymDictionary::with_ignore_case(ignore_case))
            }
            DictionaryKind::Space => Self::Space(SpaceDictionary::with_ignore_case(ignore_case)),
            DictionaryKind::Custom => Self::Custom(CustomDictionary::with_ignore_case(ignore_case)),
            DictionaryKind::InvertMap => {
                Self::InvertMap(InvertMapDictionary::with_ignore_case(ignore_case))
            }
            DictionaryKind::Compound => {
                Self::Compound(CompoundDictionary::with_ignore_case(ignore_case))
            }
            DictionaryKind::System => {
                return Err(SangpumError::invalid_argument(
                    "kind",
                    "the system dictionary is not a named dictionary",
                ));
            }
        })
    }

    /// 保存形式の種類。
    pub fn kind(&self) -> DictionaryKind {
        match self {
            Self::Set(_) => DictionaryKind::Set,
            Self::Map(_) => DictionaryKind::Map,
            Self::Synonym(_) => DictionaryKind::Synonym,
            Self::Space(_) => DictionaryKind::Space,
            Self::Custom(_) => DictionaryKind::Custom,
            Self::InvertMap(_) => DictionaryKind::InvertMap,
            Self::Compound(_) => DictionaryKind::Compound,
        }
    }

    /// `other`が同じ種類の辞書かどうか。
    #[inline(always)]
    pub fn same_variant(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// 内部の集合を`other`のものに置き換えます。
    ///
    /// # エラー
    ///
    /// 種類が異なる場合はエラーを返し、現在の内容は変更されません。
    pub fn reload(&mut self, other: Self) -> Result<()> {
        if !self.same_variant(&other) {
            return Err(SangpumError::invalid_argument(
                "dictionary",
                format!("Reload dictionary argument error. argument = {}", other.kind()),
            ));
        }
        *self = other;
        Ok(())
    }

    /// 大文字小文字を区別せずに比較するかどうか。
    pub fn ignore_case(&self) -> bool {
        dispatch!(self, d => d.ignore_case())
    }

    /// ソースの1行を追加します。
    pub fn add_source_line(&mut self, line: &str) {
        dispatch!(self, d => d.add_source_line(line))
    }

    /// 主キーの数。
    pub fn len(&self) -> usize {
        dispatch!(self, d => d.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// システム辞書に名詞として追加する語。
    pub fn noun_words(&self) -> Box<dyn Iterator<Item = &CharWindow> + '_> {
        dispatch!(self, d => Box::new(d.noun_words()))
    }

    /// ソース行の形式に戻します。
    pub fn restore_lines(&self) -> Vec<String> {
        dispatch!(self, d => d.restore_lines())
    }

    /// バイナリ形式で書き出します。
    pub fn write_to<W: Write>(&self, out: &mut DataOutput<W>) -> Result<()> {
        dispatch!(self, d => d.write_to(out))
    }

    /// バイト列に書き出します。
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        dispatch!(self, d => d.to_bytes())
    }

    /// 種類を指定してバイナリ形式から読み込みます。
    pub fn read_from<R: Read>(
        kind: DictionaryKind,
        input: &mut DataInput<R>,
        ignore_case: bool,
    ) -> Result<Self> {
        Ok(match kind {
            DictionaryKind::Set => Self::Set(SetDictionary::read_from(input, ignore_case)?),
            DictionaryKind::Map => Self::Map(MapDictionary::read_from(input, ignore_case)?),
            DictionaryKind::Synonym | DictionaryKind::Synonym2Way => {
                Self::Synonym(SynonymDictionary::read_from(input, ignore_case)?)
            }
            DictionaryKind::Space => Self::Space(SpaceDictionary::read_from(input, ignore_case)?),
            DictionaryKind::Custom => {
                Self::Custom(CustomDictionary::read_from(input, ignore_case)?)
            }
            DictionaryKind::InvertMap => {
                Self::InvertMap(InvertMapDictionary::read_from(input, ignore_case)?)
            }
            DictionaryKind::Compound => {
                Self::Compound(CompoundDictionary::read_from(input, ignore_case)?)
            }
            DictionaryKind::System => return Self::new(kind, ignore_case),
        })
    }

    /// 種類を指定してバイト列から読み込みます。
    pub fn from_bytes(kind: DictionaryKind, bytes: &[u8], ignore_case: bool) -> Result<Self> {
        Self::read_from(kind, &mut DataInput::new(bytes), ignore_case)
    }

    /// 主キーとして登録されているかを判定します。
    pub fn contains_key(&self, key: CharKey<'_>) -> bool {
        match self {
            Self::Set(d) => d.contains(key),
            Self::Map(d) => d.contains_key(key),
            Self::Synonym(d) => d.contains_key(key),
            Self::Space(d) => d.contains_key(key),
            Self::Custom(d) => d.contains_key(key),
            Self::InvertMap(d) => d.contains_key(key),
            Self::Compound(d) => d.contains_key(key),
        }
    }

    /// 主キー以外の語も含めて、辞書に現れるかを判定します。
    pub fn contains_word(&self, key: CharKey<'_>) -> bool {
        match self {
            Self::Set(d) => d.contains(key),
            Self::Map(d) => d.contains_key(key),
            Self::Synonym(d) => d.contains_word(key),
            Self::Space(d) => d.contains_word(key),
            Self::Custom(d) => d.contains_word(key),
            Self::InvertMap(d) => d.contains_key(key),
            Self::Compound(d) => d.contains_word(key),
        }
    }

    /// キーに対応する値の列を返します。値が文字列の列でない辞書では`None`です。
    pub fn get(&self, key: CharKey<'_>) -> Option<&[CharWindow]> {
        match self {
            Self::Map(d) => d.get(key),
            Self::Synonym(d) => d.get(key),
            Self::Space(d) => d.get(key),
            Self::InvertMap(d) => d.get(key),
            Self::Compound(d) => d.get(key),
            Self::Set(_) | Self::Custom(_) => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetDictionary> {
        match self {
            Self::Set(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapDictionary> {
        match self {
            Self::Map(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_synonym(&self) -> Option<&SynonymDictionary> {
        match self {
            Self::Synonym(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_space(&self) -> Option<&SpaceDictionary> {
        match self {
            Self::Space(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&CustomDictionary> {
        match self {
            Self::Custom(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_invert_map(&self) -> Option<&InvertMapDictionary> {
        match self {
            Self::InvertMap(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&CompoundDictionary> {
        match self {
            Self::Compound(d) => Some(d),
            _ => None,
        }
    }
}

/// `(id, keyword, value)`の組から、種類ごとのソース行を組み立てます。
///
/// - 同義語: `keyword<TAB>value`、キーワードが空なら`value`のみ(双方向)
/// - 任意値: `keyword<TAB>id`、IDが空なら`keyword`のみ
/// - その他: `keyword<TAB>value`、値が空なら`keyword`のみ
pub fn source_line(kind: DictionaryKind, id: &str, keyword: &str, value: &str) -> String {
    let (head, tail) = match kind {
        DictionaryKind::Synonym | DictionaryKind::Synonym2Way => {
            if keyword.is_empty() {
                return format!("\t{value}");
            }
            (keyword, value)
        }
        DictionaryKind::Custom => (keyword, id),
        _ => (keyword, value),
    };
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{head}\t{tail}")
    }
}

/// `(id, keyword, value)`の組の列から1つの辞書を構築します。
///
/// # 引数
///
/// * `kind` - 辞書の種類
/// * `ignore_case` - 大文字小文字を区別しない比較を行うかどうか
/// * `triples` - `(id, keyword, value)`の組
///
/// # 戻り値
///
/// 構築された辞書と、処理した組の数。
///
/// # エラー
///
/// `kind`が[`DictionaryKind::System`]の場合にエラーを返します。
pub fn compile_dictionary_one<I, S>(
    kind: DictionaryKind,
    ignore_case: bool,
    triples: I,
) -> Result<(SourceDictionary, usize)>
where
    I: IntoIterator<Item = (S, S, S)>,
    S: AsRef<str>,
{
    let mut dict = SourceDictionary::new(kind, ignore_case)?;
    let mut count = 0;
    for (id, keyword, value) in triples {
        let line = source_line(kind, id.as_ref(), keyword.as_ref(), value.as_ref());
        dict.add_source_line(&line);
        count += 1;
    }
    Ok((dict, count))
}

/// バイナリ辞書ファイルを読み込みます。
///
/// ファイルが存在しない場合はエラーを記録して空の辞書を返します。
///
/// # エラー
///
/// ファイルが破損している場合はエラーを返します。
pub fn read_dictionary_file<P>(
    path: P,
    kind: DictionaryKind,
    ignore_case: bool,
) -> Result<SourceDictionary>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        log::error!("[sangpum] Dictionary file does not exist. file={}", path.display());
        return SourceDictionary::new(kind, ignore_case);
    }
    let rdr = BufReader::new(File::open(path)?);
    SourceDictionary::read_from(kind, &mut DataInput::new(rdr), ignore_case)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("synonym_2way".parse::<DictionaryKind>().unwrap(), DictionaryKind::Synonym2Way);
        assert_eq!("INVERT_MAP".parse::<DictionaryKind>().unwrap(), DictionaryKind::InvertMap);
        assert!("unknown".parse::<DictionaryKind>().is_err());
        assert_eq!("High".parse::<NounLevel>().unwrap(), NounLevel::High);
    }

    #[test]
    fn test_reload_type_check() {
        let mut dict = SourceDictionary::new(DictionaryKind::Set, true).unwrap();
        dict.add_source_line("cm");
        let other = SourceDictionary::new(DictionaryKind::Map, true).unwrap();
        let result = dict.reload(other);
        assert!(matches!(result, Err(SangpumError::InvalidArgument(_))));
        assert!(dict.contains_key(CharKey::exact(&key("cm"))));

        let mut new = SourceDictionary::new(DictionaryKind::Set, true).unwrap();
        new.add_source_line("kg");
        dict.reload(new).unwrap();
        assert!(!dict.contains_key(CharKey::exact(&key("cm"))));
        assert!(dict.contains_key(CharKey::exact(&key("kg"))));
    }

    #[test]
    fn test_compile_dictionary_one() {
        let triples = vec![
            ("1", "", "TV,티비"),
            ("2", "노트북", "랩탑"),
        ];
        let (dict, count) =
            compile_dictionary_one(DictionaryKind::Synonym2Way, true, triples).unwrap();
        assert_eq!(count, 2);
        let synonym = dict.as_synonym().unwrap();
        assert!(synonym.contains_key(CharKey::exact(&key("티비"))));
        assert!(synonym.contains_key(CharKey::exact(&key("노트북"))));

        let (dict, _) = compile_dictionary_one(
            DictionaryKind::Custom,
            true,
            vec![("1001", "삼성", "")],
        )
        .unwrap();
        assert_eq!(dict.restore_lines(), vec!["삼성\t1001"]);

        assert!(compile_dictionary_one(DictionaryKind::System, true, Vec::<(&str, &str, &str)>::new()).is_err());
    }

    #[test]
    fn test_source_line() {
        assert_eq!(source_line(DictionaryKind::Set, "1", "usb", ""), "usb");
        assert_eq!(source_line(DictionaryKind::Map, "1", "a", "b"), "a\tb");
        assert_eq!(source_line(DictionaryKind::Synonym, "1", "", "a,b"), "\ta,b");
        assert_eq!(source_line(DictionaryKind::Custom, "7", "a", "b"), "a\t7");
    }

    #[test]
    fn test_read_dictionary_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_dictionary_file(dir.path().join("none.dict"), DictionaryKind::Space, true).unwrap();
        assert!(missing.is_empty());
        assert_eq!(missing.kind(), DictionaryKind::Space);

        let dict = SourceDictionary::Set(SetDictionary::from_lines(["개", "kg"], true));
        let path = dir.path().join("unit.dict");
        std::fs::write(&path, dict.to_bytes().unwrap()).unwrap();
        let loaded = read_dictionary_file(&path, DictionaryKind::Set, true).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains_word(CharKey::exact(&key("KG"))));

        std::fs::write(&path, [0xFF, 0xFF]).unwrap();
        assert!(read_dictionary_file(&path, DictionaryKind::Set, true).is_err());
    }

    #[test]
    fn test_every_kind_round_trips_through_bytes() {
        let kinds = [
            (DictionaryKind::Set, "usb"),
            (DictionaryKind::Map, "a\tb"),
            (DictionaryKind::Synonym, "a\tb,c"),
            (DictionaryKind::Space, "무선 마우스"),
            (DictionaryKind::Custom, "a\t1"),
            (DictionaryKind::InvertMap, "a\tb"),
            (DictionaryKind::Compound, "ab\ta,b"),
        ];
        for (kind, line) in kinds {
            let mut dict = SourceDictionary::new(kind, false).unwrap();
            dict.add_source_line(line);
            let bytes = dict.to_bytes().unwrap();
            let restored = SourceDictionary::from_bytes(kind, &bytes, false).unwrap();
            assert!(restored.same_variant(&dict));
            assert!(!restored.ignore_case());
            assert_eq!(restored.restore_lines(), dict.restore_lines(), "{kind}");
        }
    }
}
