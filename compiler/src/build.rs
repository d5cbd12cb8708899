//! 辞書のビルドモジュール
//!
//! テキストのソースから1つの名前付き辞書、またはシステム辞書を構築し、
//! バイナリ形式で書き出します。

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use sangpum::dictionary::{DictionaryKind, DictionarySource, SourceDictionary, compile_dictionary_one};
use sangpum::utils::split_fields;
use sangpum::{SangpumError, TagProbDictionary};

/// ビルドコマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "build", about = "A program to build a binary dictionary.")]
pub struct Args {
    /// Source file. One source line per entry unless `--triples` is given.
    #[clap(short = 'i', long)]
    source_in: PathBuf,

    /// Dictionary type: system, set, map, synonym, synonym_2way, space, custom,
    /// invert_map or compound.
    #[clap(short = 't', long = "type")]
    kind: String,

    /// File to which the binary dictionary is output.
    #[clap(short = 'o', long)]
    dict_out: PathBuf,

    /// Compares keys case-sensitively.
    #[clap(long)]
    case_sensitive: bool,

    /// Reads `id<TAB>keyword<TAB>value` rows instead of source lines.
    #[clap(long)]
    triples: bool,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 出力ファイルの置き換えに失敗
    #[error("Failed to persist the output: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// 辞書構築エラー
    #[error("Dictionary building failed: {0}")]
    Sangpum(#[from] SangpumError),
}

/// ビルドコマンドを実行する
///
/// # エラー
///
/// ファイルの読み書きや辞書構築に失敗した場合、`BuildError`を返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    let kind: DictionaryKind = args.kind.parse()?;
    let source = std::fs::read_to_string(&args.source_in)?;

    println!("Compiling the {} dictionary...", kind);
    let (bytes, count) = build_dictionary(kind, !args.case_sensitive, args.triples, &source)?;

    println!("Writing the dictionary...");
    crate::persist_with(&args.dict_out, |file| -> Result<(), BuildError> {
        file.write_all(&bytes)?;
        Ok(())
    })?;

    println!(
        "Successfully built the dictionary to {} ({} entries)",
        args.dict_out.display(),
        count
    );
    Ok(())
}

/// ソースからバイナリ辞書を構築する
///
/// # 引数
///
/// * `kind` - 辞書の種類
/// * `ignore_case` - 大文字小文字を区別しない比較を行うかどうか
/// * `triples` - ソースが`(id, keyword, value)`の組かどうか
/// * `source` - ソースの内容
///
/// # 戻り値
///
/// バイナリ形式の辞書と、主キーの数
pub fn build_dictionary(
    kind: DictionaryKind,
    ignore_case: bool,
    triples: bool,
    source: &str,
) -> Result<(Vec<u8>, usize), SangpumError> {
    if kind == DictionaryKind::System {
        let dict = TagProbDictionary::from_lines(source.lines(), ignore_case);
        return Ok((dict.to_bytes()?, dict.len()));
    }
    let dict = if triples {
        let rows = source.lines().filter(|l| !l.trim().is_empty()).map(|line| {
            let mut fields = split_fields(line, b'\t').into_iter();
            let mut next = || fields.next().unwrap_or_default();
            (next(), next(), next())
        });
        compile_dictionary_one(kind, ignore_case, rows)?.0
    } else {
        let mut dict = SourceDictionary::new(kind, ignore_case)?;
        for line in source.lines() {
            dict.add_source_line(line);
        }
        dict
    };
    Ok((dict.to_bytes()?, dict.len()))
}
