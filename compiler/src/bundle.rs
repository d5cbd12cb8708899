//! マニフェストの辞書群をバンドルにまとめるモジュール

use std::io;
use std::path::PathBuf;

use clap::Parser;
use sangpum::dictionary::DictionarySource;
use sangpum::{ProductNameDictionary, SangpumError};

/// バンドルコマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "bundle", about = "A program to pack all dictionaries of a manifest.")]
pub struct Args {
    /// Dictionary manifest (YAML).
    #[clap(short = 'm', long)]
    manifest_in: PathBuf,

    /// File to which the bundle is output (in zstd).
    #[clap(short = 'o', long)]
    bundle_out: PathBuf,

    /// Reads the written bundle back and checks it.
    #[clap(long)]
    verify: bool,
}

/// バンドル作成中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 出力ファイルの置き換えに失敗
    #[error("Failed to persist the output: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// 辞書の読み込み、または書き出しのエラー
    #[error("Dictionary bundling failed: {0}")]
    Sangpum(#[from] SangpumError),

    /// 書き出したバンドルが元の辞書群と一致しない
    #[error("Verification failed: {0}")]
    Verify(String),
}

/// バンドルコマンドを実行する
///
/// # エラー
///
/// マニフェストが読めない場合や、書き出しに失敗した場合に`BundleError`を返します。
pub fn run(args: Args) -> Result<(), BundleError> {
    println!("Loading dictionaries from {}...", args.manifest_in.display());
    let dict = ProductNameDictionary::load_manifest(&args.manifest_in)?;
    println!("system\tSYSTEM\t{}", dict.system().len());
    for handle in dict.handles() {
        println!("{}\t{}\t{}", handle.name(), handle.kind(), handle.load().len());
    }

    println!("Writing the bundle...");
    crate::persist_with(&args.bundle_out, |file| -> Result<(), BundleError> {
        let mut encoder = zstd::Encoder::new(file, 19)?;
        dict.write(&mut encoder)?;
        encoder.finish()?;
        Ok(())
    })?;

    if args.verify {
        let restored = ProductNameDictionary::from_path(&args.bundle_out)?;
        if restored.handles().len() != dict.handles().len() {
            return Err(BundleError::Verify(format!(
                "expected {} dictionaries, found {}",
                dict.handles().len(),
                restored.handles().len()
            )));
        }
        for handle in dict.handles() {
            let same = restored
                .handle(handle.name())
                .is_some_and(|h| h.load().restore_lines() == handle.load().restore_lines());
            if !same {
                return Err(BundleError::Verify(format!("dictionary {} differs", handle.name())));
            }
        }
        println!("Verified the bundle.");
    }

    println!("Successfully wrote the bundle to {}", args.bundle_out.display());
    Ok(())
}
