//! バイナリ辞書をソース行に戻すモジュール

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use sangpum::dictionary::{DictionaryKind, DictionarySource, SourceDictionary};
use sangpum::{SangpumError, TagProbDictionary};

/// 復元コマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "restore", about = "A program to restore source lines from a binary dictionary.")]
pub struct Args {
    /// Binary dictionary file.
    #[clap(short = 'i', long)]
    dict_in: PathBuf,

    /// Dictionary type the file was built as.
    #[clap(short = 't', long = "type")]
    kind: String,

    /// Output file. Writes to stdout when omitted.
    #[clap(short = 'o', long)]
    source_out: Option<PathBuf>,

    /// The dictionary was built case-sensitively.
    #[clap(long)]
    case_sensitive: bool,
}

/// 復元処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 出力ファイルの置き換えに失敗
    #[error("Failed to persist the output: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// 辞書の読み込みエラー
    #[error("Failed to read the dictionary: {0}")]
    Sangpum(#[from] SangpumError),
}

/// 復元コマンドを実行する
///
/// # エラー
///
/// 辞書ファイルが読めない、または破損している場合に`RestoreError`を返します。
pub fn run(args: Args) -> Result<(), RestoreError> {
    let kind: DictionaryKind = args.kind.parse()?;
    let bytes = std::fs::read(&args.dict_in)?;
    let lines = restore_lines(kind, !args.case_sensitive, &bytes)?;

    match &args.source_out {
        Some(path) => {
            crate::persist_with(path, |file| -> Result<(), RestoreError> {
                write_lines(BufWriter::new(file), &lines)?;
                Ok(())
            })?;
            eprintln!("Restored {} lines to {}", lines.len(), path.display());
        }
        None => write_lines(BufWriter::new(io::stdout().lock()), &lines)?,
    }
    Ok(())
}

/// バイナリ辞書をソース行に戻す
///
/// # エラー
///
/// バイナリが途中で切れている、または破損している場合にエラーを返します。
pub fn restore_lines(kind: DictionaryKind, ignore_case: bool, bytes: &[u8]) -> Result<Vec<String>, SangpumError> {
    if kind == DictionaryKind::System {
        return Ok(TagProbDictionary::from_bytes(bytes, ignore_case)?.restore_lines());
    }
    Ok(SourceDictionary::from_bytes(kind, bytes, ignore_case)?.restore_lines())
}

fn write_lines<W: Write>(mut out: W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
