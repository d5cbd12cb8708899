//! 辞書の管理
//!
//! [`ProductNameDictionary`]は、1つのシステム辞書(品詞確率辞書)と名前付きの辞書群を
//! 保持します。各辞書は[`ArcSwap`]で包まれており、再読み込みは新しい世代を丸ごと
//! 構築してから辞書ごとにポインタを差し替えることで行われます。解析側は
//! 解析の開始時に[`DictionarySnapshot`]を取得し、解析中は同じ世代を参照し続けます。
//!
//! # 辞書の構築
//!
//! マニフェスト([`DictionaryManifest`])に従って個別のバイナリ辞書ファイルから
//! 読み込むか、全辞書を1つにまとめたバンドルファイルから読み込みます。
//!
//! # バンドル形式
//!
//! | 範囲 | 内容 |
//! |------|------|
//! | `MODEL_MAGIC` | マジックバイト |
//! | 32バイト | ペイロードのSHA-256 |
//! | パディング | 16バイト境界までの`0xFF` |
//! | ペイロード | `rkyv`でシリアライズした辞書群 |

pub mod codec;
pub mod compound;
pub mod custom;
pub mod manifest;
pub mod map;
pub mod set;
pub mod source;
pub mod space;
pub mod synonym;
pub mod tag_prob;

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use hashbrown::HashMap;
use memmap2::Mmap;
use rkyv::rancor::Error;
use rkyv::util::AlignedVec;
use rkyv::{
    access, api::serialize_using, ser::allocator::Arena, ser::sharing::Share,
    ser::writer::IoWriter, ser::Serializer, util::with_arena, Archive, Deserialize,
    Serialize,
};
use sha2::{Digest, Sha256};

use crate::char_window::CharKey;
use crate::dictionary::codec::DataInput;
use crate::errors::{Result, SangpumError};

pub use crate::dictionary::compound::CompoundDictionary;
pub use crate::dictionary::custom::{CustomDictionary, CustomValue};
pub use crate::dictionary::manifest::{DictionaryManifest, DictionarySetting};
pub use crate::dictionary::map::{InvertMapDictionary, MapDictionary};
pub use crate::dictionary::set::SetDictionary;
pub use crate::dictionary::source::{
    compile_dictionary_one, read_dictionary_file, DictionaryKind, DictionarySource, NounLevel,
    SourceDictionary,
};
pub use crate::dictionary::space::SpaceDictionary;
pub use crate::dictionary::synonym::{two_way_closure, SynonymDictionary};
pub use crate::dictionary::tag_prob::{PosTag, TagProb, TagProbDictionary};

/// バンドルファイルを識別するマジックバイト。
///
/// バージョンは保存形式のバージョンで、クレートのバージョンとは独立しています。
pub const MODEL_MAGIC: &[u8] = b"SangpumDictionaryRkyv 0.1\n";

const MODEL_MAGIC_LEN: usize = MODEL_MAGIC.len();
const DIGEST_LEN: usize = 32;
const HEADER_LEN: usize = MODEL_MAGIC_LEN + DIGEST_LEN;
const RKYV_ALIGNMENT: usize = 16;
const PADDING_LEN: usize = (RKYV_ALIGNMENT - (HEADER_LEN % RKYV_ALIGNMENT)) % RKYV_ALIGNMENT;
const DATA_START: usize = HEADER_LEN + PADDING_LEN;

/// バンドル内の1つの辞書。`data`は辞書のバイナリ形式そのものです。
#[derive(Archive, Serialize, Deserialize)]
struct DictionaryBlob {
    name: String,
    kind: DictionaryKind,
    level: Option<NounLevel>,
    ignore_case: bool,
    seq: i32,
    label: String,
    data: Vec<u8>,
}

#[derive(Archive, Serialize, Deserialize)]
struct BundleInner {
    system: DictionaryBlob,
    dictionaries: Vec<DictionaryBlob>,
}

/// 名前付き辞書の構築時の情報。
#[derive(Clone, Debug)]
pub struct DictionaryEntry {
    /// 辞書名
    pub name: String,
    /// マニフェスト上の種類
    pub kind: DictionaryKind,
    /// システム辞書に名詞として追加するときの強さ
    pub level: Option<NounLevel>,
    pub seq: i32,
    pub label: String,
    /// 辞書本体
    pub dictionary: SourceDictionary,
}

impl DictionaryEntry {
    /// 新しいエントリを生成します。
    pub fn new<S: Into<String>>(name: S, kind: DictionaryKind, dictionary: SourceDictionary) -> Self {
        Self {
            name: name.into(),
            kind,
            level: None,
            seq: 0,
            label: String::new(),
            dictionary,
        }
    }

    /// 名詞の強さを設定します。
    pub fn with_level(mut self, level: Option<NounLevel>) -> Self {
        self.level = level;
        self
    }
}

/// 名前付き辞書への差し替え可能な参照。
///
/// 再読み込みの前後でハンドル自体は同じものが使われ、中身だけが差し替わります。
pub struct DictionaryHandle {
    name: String,
    kind: DictionaryKind,
    level: Option<NounLevel>,
    seq: i32,
    label: String,
    dictionary: ArcSwap<SourceDictionary>,
}

impl DictionaryHandle {
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn kind(&self) -> DictionaryKind {
        self.kind
    }

    #[inline(always)]
    pub fn level(&self) -> Option<NounLevel> {
        self.level
    }

    #[inline(always)]
    pub fn seq(&self) -> i32 {
        self.seq
    }

    #[inline(always)]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 現在の辞書を返します。
    #[inline(always)]
    pub fn load(&self) -> Arc<SourceDictionary> {
        self.dictionary.load_full()
    }

    /// 辞書を差し替えます。
    ///
    /// # エラー
    ///
    /// 種類が異なる場合はエラーを返し、現在の辞書はそのまま残ります。
    pub fn reload(&self, dictionary: Arc<SourceDictionary>) -> Result<()> {
        if !self.dictionary.load().same_variant(&dictionary) {
            return Err(SangpumError::invalid_argument(
                "dictionary",
                format!(
                    "Reload dictionary argument error. argument = {} for {}",
                    dictionary.kind(),
                    self.name
                ),
            ));
        }
        self.dictionary.store(dictionary);
        Ok(())
    }
}

/// 解析1回分の辞書の固定ビュー。
#[derive(Clone)]
pub struct DictionarySnapshot {
    system: Arc<TagProbDictionary>,
    dictionaries: Vec<Arc<SourceDictionary>>,
    index: Arc<HashMap<String, usize>>,
}

impl DictionarySnapshot {
    /// システム辞書。
    #[inline(always)]
    pub fn system(&self) -> &TagProbDictionary {
        &self.system
    }

    /// 名前で辞書を引きます。
    #[inline(always)]
    pub fn get(&self, name: &str) -> Option<&SourceDictionary> {
        self.index.get(name).map(|&i| self.dictionaries[i].as_ref())
    }

    pub fn set(&self, name: &str) -> Option<&SetDictionary> {
        self.get(name).and_then(SourceDictionary::as_set)
    }

    pub fn synonym(&self, name: &str) -> Option<&SynonymDictionary> {
        self.get(name).and_then(SourceDictionary::as_synonym)
    }

    pub fn space(&self, name: &str) -> Option<&SpaceDictionary> {
        self.get(name).and_then(SourceDictionary::as_space)
    }

    pub fn compound(&self, name: &str) -> Option<&CompoundDictionary> {
        self.get(name).and_then(SourceDictionary::as_compound)
    }

    /// 名前の辞書に語が主キーとして含まれるかを判定します。辞書がなければ偽です。
    #[inline(always)]
    pub fn contains(&self, name: &str, key: CharKey<'_>) -> bool {
        self.get(name).is_some_and(|d| d.contains_key(key))
    }
}

/// 商品名解析用の辞書群。
pub struct ProductNameDictionary {
    system: ArcSwap<TagProbDictionary>,
    handles: Vec<Arc<DictionaryHandle>>,
    index: Arc<HashMap<String, usize>>,
}

impl ProductNameDictionary {
    /// システム辞書と名前付き辞書から辞書群を構築します。
    ///
    /// `level`が設定された辞書の語はシステム辞書に名詞として追加されます。
    /// 同じ名前の辞書が複数ある場合は後のものが使われます。
    pub fn from_parts<I>(mut system: TagProbDictionary, entries: I) -> Self
    where
        I: IntoIterator<Item = DictionaryEntry>,
    {
        let mut handles: Vec<Arc<DictionaryHandle>> = vec![];
        let mut index = HashMap::new();
        for entry in entries {
            system.append_additional_noun_entry(entry.dictionary.noun_words(), entry.level);
            let handle = Arc::new(DictionaryHandle {
                name: entry.name.clone(),
                kind: entry.kind,
                level: entry.level,
                seq: entry.seq,
                label: entry.label,
                dictionary: ArcSwap::from_pointee(entry.dictionary),
            });
            match index.get(&entry.name) {
                Some(&i) => handles[i] = handle,
                None => {
                    index.insert(entry.name, handles.len());
                    handles.push(handle);
                }
            }
        }
        Self {
            system: ArcSwap::from_pointee(system),
            handles,
            index: Arc::new(index),
        }
    }

    /// マニフェストに従って辞書ファイルを読み込みます。
    ///
    /// 存在しない、または読み込めない辞書ファイルはエラーを記録したうえで空の辞書になります。
    /// 未知の種類の辞書は記録したうえで読み飛ばします。
    pub fn load(manifest: &DictionaryManifest) -> Self {
        let system = match manifest.system() {
            Some(setting) => load_system(manifest, setting),
            None => {
                log::error!("[sangpum] The manifest has no system dictionary.");
                TagProbDictionary::with_ignore_case(true)
            }
        };

        let mut entries = vec![];
        for setting in &manifest.dictionary {
            let kind = match setting.kind() {
                Ok(DictionaryKind::System) => continue,
                Ok(kind) => kind,
                Err(e) => {
                    log::error!("[sangpum] Skip dictionary {}: {}", setting.name, e);
                    continue;
                }
            };
            let level = setting.noun_level().unwrap_or_else(|e| {
                log::error!("[sangpum] Ignore token type of {}: {}", setting.name, e);
                None
            });
            let path = manifest.resolve_path(setting);
            let dictionary = match read_dictionary_file(&path, kind, setting.ignore_case) {
                Ok(d) => d,
                Err(e) => {
                    log::error!("[sangpum] Failed to read {}: {}", path.display(), e);
                    match SourceDictionary::new(kind, setting.ignore_case) {
                        Ok(d) => d,
                        Err(_) => continue,
                    }
                }
            };
            log::info!(
                "[sangpum] Dictionary loaded. name={} type={} entries={}",
                setting.name,
                kind,
                dictionary.len()
            );
            entries.push(DictionaryEntry {
                name: setting.name.clone(),
                kind,
                level,
                seq: setting.seq,
                label: setting.label.clone(),
                dictionary,
            });
        }
        Self::from_parts(system, entries)
    }

    /// マニフェストファイルを読み込み、辞書群を構築します。
    ///
    /// # エラー
    ///
    /// マニフェストが読めない、またはYAMLとして不正な場合にエラーを返します。
    pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manifest = DictionaryManifest::load_from_file(path)?;
        Ok(Self::load(&manifest))
    }

    /// 新しい世代の辞書群で現在の辞書を置き換えます。
    ///
    /// システム辞書と、同じ名前を持つ各辞書の中身がそれぞれ1回のポインタ差し替えで
    /// 置き換わります。ハンドルは再利用されるため、既存の参照はそのまま有効です。
    /// 現在の辞書群にない名前の辞書は無視されます。
    ///
    /// # エラー
    ///
    /// 同じ名前で種類の異なる辞書がある場合、何も置き換えずにエラーを返します。
    pub fn reload(&self, new: ProductNameDictionary) -> Result<()> {
        let mut pairs = vec![];
        for handle in &new.handles {
            let Some(current) = self.handle(handle.name()) else {
                log::warn!("[sangpum] Skip unknown dictionary on reload: {}", handle.name());
                continue;
            };
            let dictionary = handle.load();
            if !current.load().same_variant(&dictionary) {
                return Err(SangpumError::invalid_argument(
                    "dictionary",
                    format!(
                        "Reload dictionary argument error. argument = {} for {}",
                        dictionary.kind(),
                        current.name()
                    ),
                ));
            }
            pairs.push((current, dictionary));
        }

        self.system.store(new.system.load_full());
        for (current, dictionary) in pairs {
            log::info!(
                "[sangpum] Dictionary reloaded. name={} entries={}",
                current.name(),
                dictionary.len()
            );
            current.reload(dictionary)?;
        }
        Ok(())
    }

    /// 現在の辞書の固定ビューを取得します。
    pub fn snapshot(&self) -> DictionarySnapshot {
        DictionarySnapshot {
            system: self.system.load_full(),
            dictionaries: self.handles.iter().map(|h| h.load()).collect(),
            index: self.index.clone(),
        }
    }

    /// 現在のシステム辞書。
    pub fn system(&self) -> Arc<TagProbDictionary> {
        self.system.load_full()
    }

    /// 名前で辞書のハンドルを引きます。
    pub fn handle(&self, name: &str) -> Option<&Arc<DictionaryHandle>> {
        self.index.get(name).map(|&i| &self.handles[i])
    }

    /// すべての辞書のハンドル。
    pub fn handles(&self) -> &[Arc<DictionaryHandle>] {
        &self.handles
    }

    /// 語を含む辞書の名前を返します。システム辞書は`"system"`として現れます。
    pub fn find(&self, word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        let key = CharKey::exact(&chars);
        let mut names = vec![];
        if self.system.load().find(key).is_some() {
            names.push("system".to_string());
        }
        for handle in &self.handles {
            if handle.load().contains_word(key) {
                names.push(handle.name().to_string());
            }
        }
        names
    }

    /// 辞書群をバンドル形式で書き出します。
    ///
    /// # エラー
    ///
    /// 書き込み、またはシリアライズに失敗した場合にエラーを返します。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        let system = self.system.load();
        let inner = BundleInner {
            system: DictionaryBlob {
                name: "system".to_string(),
                kind: DictionaryKind::System,
                level: None,
                ignore_case: system.ignore_case(),
                seq: 0,
                label: String::new(),
                data: system.to_bytes()?,
            },
            dictionaries: self
                .handles
                .iter()
                .map(|h| {
                    let dictionary = h.load();
                    Ok(DictionaryBlob {
                        name: h.name.clone(),
                        kind: h.kind,
                        level: h.level,
                        ignore_case: dictionary.ignore_case(),
                        seq: h.seq,
                        label: h.label.clone(),
                        data: dictionary.to_bytes()?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let mut payload = Vec::new();
        with_arena(|arena: &mut Arena| {
            let writer = IoWriter::new(&mut payload);
            let mut serializer = Serializer::new(writer, arena.acquire(), Share::new());
            serialize_using::<_, rkyv::rancor::Error>(&inner, &mut serializer)
        })
        .map_err(|e| {
            SangpumError::invalid_state("rkyv serialization failed".to_string(), e.to_string())
        })?;

        wtr.write_all(MODEL_MAGIC)?;
        wtr.write_all(&Sha256::digest(&payload))?;
        wtr.write_all(&[0xFF; PADDING_LEN])?;
        wtr.write_all(&payload)?;
        Ok(())
    }

    /// リーダーからバンドルを読み込みます。
    ///
    /// # エラー
    ///
    /// マジックバイトやダイジェストが一致しない場合、または内容が破損している場合に
    /// エラーを返します。
    pub fn read<R: Read>(mut rdr: R) -> Result<Self> {
        let mut header = [0; DATA_START];
        rdr.read_exact(&mut header)?;
        check_magic(&header, "rdr")?;

        let mut buffer = Vec::new();
        rdr.read_to_end(&mut buffer)?;
        check_digest(&header, &buffer)?;

        let mut aligned_bytes = AlignedVec::<RKYV_ALIGNMENT>::with_capacity(buffer.len());
        aligned_bytes.extend_from_slice(&buffer);
        Self::from_payload(&aligned_bytes)
    }

    /// zstdで圧縮されたバンドルを読み込みます。
    pub fn from_zstd<R: Read>(rdr: R) -> Result<Self> {
        Self::read(zstd::Decoder::new(rdr)?)
    }

    /// ファイルパスからバンドルを読み込みます。
    ///
    /// 拡張子が`.zst`のファイルは展開しながら読み込みます。それ以外はメモリマップを使用します。
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SangpumError::invalid_argument("path", format!("Failed to open dictionary file: {}", e))
        })?;
        if path.extension().is_some_and(|ext| ext == "zst") {
            return Self::from_zstd(BufReader::new(file));
        }

        let mmap = unsafe { Mmap::map(&file)? };
        let (Some(header), Some(data_bytes)) = (mmap.get(..DATA_START), mmap.get(DATA_START..))
        else {
            return Err(SangpumError::invalid_argument(
                "path",
                "Dictionary file too small or corrupted.",
            ));
        };
        check_magic(header, "path")?;
        check_digest(header, data_bytes)?;
        Self::from_payload(data_bytes)
    }

    fn from_payload(data_bytes: &[u8]) -> Result<Self> {
        let archived = access::<ArchivedBundleInner, Error>(data_bytes).map_err(|e| {
            SangpumError::invalid_state(
                "rkyv validation failed. The dictionary file may be corrupted or incompatible."
                    .to_string(),
                e.to_string(),
            )
        })?;

        let system = TagProbDictionary::read_from(
            &mut DataInput::new(archived.system.data.as_slice()),
            archived.system.ignore_case,
        )?;
        let mut entries = Vec::with_capacity(archived.dictionaries.len());
        for blob in archived.dictionaries.iter() {
            let kind = blob.kind.to_native();
            let dictionary =
                SourceDictionary::from_bytes(kind, blob.data.as_slice(), blob.ignore_case)?;
            entries.push(DictionaryEntry {
                name: blob.name.as_str().to_string(),
                kind,
                level: blob.level.as_ref().map(|l| l.to_native()),
                seq: blob.seq.to_native(),
                label: blob.label.as_str().to_string(),
                dictionary,
            });
        }
        Ok(Self::from_parts(system, entries))
    }
}

fn check_magic(header: &[u8], arg: &'static str) -> Result<()> {
    if !header.starts_with(MODEL_MAGIC) {
        return Err(SangpumError::invalid_argument(
            arg,
            "The magic number of the input dictionary mismatches.",
        ));
    }
    Ok(())
}

fn check_digest(header: &[u8], payload: &[u8]) -> Result<()> {
    let expected = &header[MODEL_MAGIC_LEN..HEADER_LEN];
    if Sha256::digest(payload).as_slice() != expected {
        return Err(SangpumError::invalid_state(
            "The dictionary bundle is corrupted.",
            "sha256 digest mismatch",
        ));
    }
    Ok(())
}

fn load_system(manifest: &DictionaryManifest, setting: &DictionarySetting) -> TagProbDictionary {
    let path = manifest.resolve_path(setting);
    if !path.exists() {
        log::error!("[sangpum] Dictionary file does not exist. file={}", path.display());
        return TagProbDictionary::with_ignore_case(setting.ignore_case);
    }
    let result = File::open(&path)
        .map_err(SangpumError::from)
        .and_then(|f| {
            TagProbDictionary::read_from(&mut DataInput::new(BufReader::new(f)), setting.ignore_case)
        });
    match result {
        Ok(system) => {
            log::info!(
                "[sangpum] System dictionary loaded. file={} entries={}",
                path.display(),
                system.len()
            );
            system
        }
        Err(e) => {
            log::error!("[sangpum] Failed to read {}: {}", path.display(), e);
            TagProbDictionary::with_ignore_case(setting.ignore_case)
        }
    }
}
