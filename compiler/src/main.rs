//! Sangpum 辞書コンパイラのメインエントリーポイント
//!
//! テキストのソースからバイナリ辞書を構築するサブコマンド、バイナリ辞書を
//! ソース行に戻すサブコマンド、マニフェストの辞書群を1つのバンドルにまとめる
//! サブコマンドを提供します。

mod build;
mod bundle;
mod restore;

use std::fs::File;
use std::io;
use std::path::Path;

use clap::Parser;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{build::BuildError, bundle::BundleError, restore::RestoreError};

/// コマンドライン引数の構造体
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// ソースファイルからバイナリ辞書を構築します
    ///
    /// ソース行、または`id<TAB>keyword<TAB>value`の組から1つの辞書を生成します。
    Build(build::Args),

    /// バイナリ辞書をソース行に戻します
    Restore(restore::Args),

    /// マニフェストの辞書群を1つのバンドルにまとめます
    ///
    /// 出力はzstdで圧縮されたrkyv形式です。
    Bundle(bundle::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
#[derive(Debug, Error)]
pub enum CompileError {
    /// 辞書構築中のエラー
    #[error(transparent)]
    BuildError(#[from] BuildError),
    /// ソース行への復元中のエラー
    #[error(transparent)]
    RestoreError(#[from] RestoreError),
    /// バンドル作成中のエラー
    #[error(transparent)]
    BundleError(#[from] BundleError),
}

/// 一時ファイルに書き出してから`path`に置き換えます。
///
/// 書き込みの途中で失敗しても`path`の既存のファイルは壊れません。
///
/// # エラー
///
/// 一時ファイルの作成、書き込み、置き換えに失敗した場合にエラーを返します。
pub(crate) fn persist_with<F, E>(path: &Path, write: F) -> Result<(), E>
where
    F: FnOnce(&mut File) -> Result<(), E>,
    E: From<io::Error> + From<tempfile::PersistError>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// メイン関数
///
/// コマンドライン引数をパースし、指定されたサブコマンドを実行します。
///
/// # エラー
///
/// 各サブコマンドの実行中にエラーが発生した場合、そのエラーが返されます。
fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Restore(args) => Ok(restore::run(args)?),
        Command::Bundle(args) => Ok(bundle::run(args)?),
    }
}
