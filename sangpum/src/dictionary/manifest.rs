//! 辞書マニフェスト
//!
//! 読み込む辞書の一覧をYAMLで記述します。
//!
//! ```yaml
//! basePath: /opt/sangpum
//! dictionary:
//!   - name: system
//!     type: system
//!   - name: unit
//!     type: set
//!     tokenType: max
//!     filePath: dict/unit.dict
//!   - name: synonym
//!     type: synonym
//!     ignoreCase: true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dictionary::source::{DictionaryKind, NounLevel};
use crate::errors::Result;

fn default_ignore_case() -> bool {
    true
}

/// マニフェストのルート。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryManifest {
    /// 辞書ファイルの基準ディレクトリ
    #[serde(rename = "basePath", default)]
    pub base_path: Option<String>,

    /// 辞書の一覧
    #[serde(default)]
    pub dictionary: Vec<DictionarySetting>,

    /// マニフェストファイルのあるディレクトリ
    #[serde(skip)]
    pub dir: PathBuf,
}

/// 1つの辞書の設定。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionarySetting {
    pub name: String,

    /// 辞書の種類(大文字小文字は区別しない)
    #[serde(rename = "type")]
    pub kind: String,

    /// システム辞書に名詞として追加するときの強さ
    #[serde(rename = "tokenType", default)]
    pub token_type: Option<String>,

    #[serde(rename = "ignoreCase", default = "default_ignore_case")]
    pub ignore_case: bool,

    #[serde(rename = "filePath", default)]
    pub file_path: Option<String>,

    #[serde(default)]
    pub seq: i32,

    #[serde(default)]
    pub label: String,
}

impl DictionarySetting {
    /// 辞書の種類を解釈します。
    ///
    /// # エラー
    ///
    /// 未知の種類の場合にエラーを返します。
    pub fn kind(&self) -> Result<DictionaryKind> {
        self.kind.trim().parse()
    }

    /// 名詞の強さを解釈します。未指定または空の場合は`None`です。
    ///
    /// # エラー
    ///
    /// 未知の値の場合にエラーを返します。
    pub fn noun_level(&self) -> Result<Option<NounLevel>> {
        match self.token_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

impl DictionaryManifest {
    /// YAMLファイルからマニフェストを読み込みます。
    ///
    /// # エラー
    ///
    /// ファイルが読めない場合、またはYAMLとして不正な場合にエラーを返します。
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::load_from_str(&content, dir)
    }

    /// YAML文字列からマニフェストを読み込みます。
    ///
    /// # 引数
    ///
    /// * `yaml` - マニフェストの内容
    /// * `dir` - 相対パスの基準となるディレクトリ
    pub fn load_from_str<P: Into<PathBuf>>(yaml: &str, dir: P) -> Result<Self> {
        let mut manifest: Self = serde_yaml::from_str(yaml)?;
        manifest.dir = dir.into();
        Ok(manifest)
    }

    /// 辞書ファイルの基準ディレクトリ。
    ///
    /// `basePath`が存在すればそれを、なければマニフェストのディレクトリを使います。
    pub fn base_dir(&self) -> PathBuf {
        match &self.base_path {
            Some(base) if Path::new(base).exists() => PathBuf::from(base),
            _ => self.dir.clone(),
        }
    }

    /// 辞書ファイルのパスを解決します。
    ///
    /// `filePath`を基準ディレクトリに連結したパスが存在しなければ、
    /// `<マニフェストのディレクトリ>/dict/<name>.dict`を返します。
    pub fn resolve_path(&self, setting: &DictionarySetting) -> PathBuf {
        if let Some(file_path) = setting.file_path.as_deref().filter(|p| !p.is_empty()) {
            let path = self.base_dir().join(file_path);
            if path.exists() {
                return path;
            }
        }
        self.dir.join("dict").join(format!("{}.dict", setting.name))
    }

    /// システム辞書の設定。
    pub fn system(&self) -> Option<&DictionarySetting> {
        self.dictionary
            .iter()
            .find(|s| matches!(s.kind(), Ok(DictionaryKind::System)))
    }
}
