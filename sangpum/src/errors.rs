//! エラー型の定義
//!
//! このモジュールは、sangpumライブラリで使用されるすべてのエラー型を定義します。

/// sangpum専用のResult型
///
/// エラー型としてデフォルトで[`SangpumError`]を使用します。
pub type Result<T, E = SangpumError> = std::result::Result<T, E>;

/// sangpumのエラー型
///
/// 辞書の読み込み、再読み込み、バンドルの検証などで発生するエラーを表現します。
/// 解析処理そのものはエラーを返しません。探索上限の超過などは実行単位で吸収されます。
#[derive(Debug, thiserror::Error)]
pub enum SangpumError {
    /// 再読み込み時の種類の不一致や、マニフェストの不正な値
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 受け付けられない形式の入力
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// バンドルの検証失敗など、内部状態の不整合
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// バイナリ辞書のデコードエラー
    ///
    /// ストリームが途中で切れている、または破損している場合に発生します。
    #[error(transparent)]
    Decode(DecodeError),

    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),

    #[error(transparent)]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// 辞書ファイル中の文字列がUTF-8でない
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    FromUtf8(#[from] std::string::FromUtf8Error),

    /// I/Oエラー
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// YAML設定ファイルのパースエラー
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// rkyvシリアライゼーションエラー
    #[error(transparent)]
    RkyvError(#[from] rkyv::rancor::Error),

    /// 一時ファイルの永続化エラー
    #[error(transparent)]
    PathPersist(#[from] tempfile::PersistError),
}

impl SangpumError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }

    /// デコードエラーを生成します
    ///
    /// # 引数
    ///
    /// * `what` - 読み込もうとしていた要素
    /// * `position` - ストリーム上のバイト位置
    pub(crate) fn decode(what: &'static str, position: usize) -> Self {
        Self::Decode(DecodeError { what, position })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug, thiserror::Error)]
#[error("invalid argument `{arg}`: {msg}")]
pub struct InvalidArgumentError {
    pub(crate) arg: &'static str,
    pub(crate) msg: String,
}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug, thiserror::Error)]
#[error("invalid {arg} format: {msg}")]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,
    pub(crate) msg: String,
}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug, thiserror::Error)]
#[error("{msg}: {cause}")]
pub struct InvalidStateError {
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

/// バイナリ辞書ストリームのデコードに失敗した場合のエラー
#[derive(Debug, thiserror::Error)]
#[error("failed to decode {what} at byte {position}")]
pub struct DecodeError {
    /// 読み込もうとしていた要素
    pub(crate) what: &'static str,

    /// 失敗したバイト位置
    pub(crate) position: usize,
}
