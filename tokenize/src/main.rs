//! 商品名の解析を実行するユーティリティ
//!
//! このバイナリは、標準入力から読み込んだ行を商品名として解析し、
//! 指定された出力形式(plain、detail)で結果を出力します。

use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use sangpum::{Analyzer, AnalyzerOption, ProductNameDictionary, SangpumError, Worker};

/// 出力モード
#[derive(Clone, Debug)]
enum OutputMode {
    Plain,
    Detail,
}

impl FromStr for OutputMode {
    type Err = &'static str;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "plain" => Ok(Self::Plain),
            "detail" => Ok(Self::Detail),
            _ => Err("Could not parse a mode"),
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "tokenize", about = "Splits product names into search terms")]
struct Args {
    /// Dictionary bundle (rkyv, optionally in zstd).
    #[clap(short = 'i', long, conflicts_with = "manifest")]
    bundle: Option<PathBuf>,

    /// Dictionary manifest (YAML).
    #[clap(short = 'm', long)]
    manifest: Option<PathBuf>,

    /// Output mode. Choices are plain and detail.
    #[clap(short = 'O', long, default_value = "plain")]
    output_mode: OutputMode,

    /// Produces query terms instead of index terms.
    #[clap(short = 'q', long)]
    query: bool,

    /// Emits the whole input as one more term (query terms only).
    #[clap(long)]
    full_string: bool,

    /// Upper-cases emitted terms.
    #[clap(short = 'U', long)]
    uppercase: bool,

    /// Emits stop words with the STOPWORD type instead of dropping them.
    #[clap(long)]
    keep_stopword: bool,

    /// Disables synonym expansion.
    #[clap(long)]
    no_synonym: bool,

    /// Searches the whole lattice even when a candidate has been found.
    #[clap(long)]
    exhaustive: bool,
}

/// 実行中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
enum TokenizeError {
    /// 辞書の指定がない
    #[error("Either --bundle or --manifest must be specified.")]
    MissingDictionary,

    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 辞書の読み込みエラー
    #[error("Failed to load the dictionary: {0}")]
    Sangpum(#[from] SangpumError),
}

impl Args {
    fn analyzer_option(&self) -> AnalyzerOption {
        AnalyzerOption::default()
            .use_for_query(self.query)
            .use_full_string(self.full_string)
            .to_uppercase(self.uppercase)
            .use_stopword(!self.keep_stopword)
            .use_synonym(!self.no_synonym)
            .fast_result(!self.exhaustive)
    }

    fn load_dictionary(&self) -> Result<ProductNameDictionary, TokenizeError> {
        match (&self.bundle, &self.manifest) {
            (Some(path), _) => Ok(ProductNameDictionary::from_path(path)?),
            (None, Some(path)) => Ok(ProductNameDictionary::load_manifest(path)?),
            (None, None) => Err(TokenizeError::MissingDictionary),
        }
    }
}

fn write_plain<W: Write>(out: &mut W, worker: &Worker) -> io::Result<()> {
    for (i, t) in worker.token_iter().enumerate() {
        if i != 0 {
            out.write_all(if t.position_increment() == 0 { b"/" } else { b" " })?;
        }
        out.write_all(t.surface().as_bytes())?;
    }
    out.write_all(b"\n")
}

fn write_detail<W: Write>(out: &mut W, worker: &Worker) -> io::Result<()> {
    for t in worker.token_iter() {
        let range = t.range_char();
        write!(
            out,
            "{}\t{}\t{}..{}\tpos_inc={}",
            t.surface(),
            t.token_type(),
            range.start,
            range.end,
            t.position_increment(),
        )?;
        if !t.synonyms().is_empty() {
            write!(out, "\tsynonyms={}", t.synonyms().join(","))?;
        }
        if !t.extra_terms().is_empty() {
            let extra: Vec<_> = t
                .extra_terms()
                .iter()
                .map(|e| format!("{}:{}", e.term, e.token_type))
                .collect();
            write!(out, "\textra={}", extra.join(","))?;
        }
        out.write_all(b"\n")?;
    }
    out.write_all(b"EOS\n")
}

/// メイン関数
///
/// 辞書をロードし、標準入力から読み込んだ行を解析して、
/// 指定された形式で結果を標準出力に出力します。
fn main() -> Result<(), TokenizeError> {
    let args = Args::parse();

    eprintln!("Loading the dictionary...");
    let dict = args.load_dictionary()?;
    let analyzer = Analyzer::new(dict).option(args.analyzer_option());
    let mut worker = analyzer.new_worker();

    eprintln!("Ready to tokenize");

    let is_tty = atty::is(atty::Stream::Stdout);

    let out = io::stdout();
    let mut out = BufWriter::new(out.lock());
    for line in io::stdin().lock().lines() {
        let line = line?;
        worker.reset_sentence(line);
        worker.analyze();
        match args.output_mode {
            OutputMode::Plain => write_plain(&mut out, &worker)?,
            OutputMode::Detail => write_detail(&mut out, &worker)?,
        }
        if is_tty {
            out.flush()?;
        }
    }
    out.flush()?;

    Ok(())
}
