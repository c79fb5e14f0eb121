//! 辞書バンドルのビルドモジュール
//!
//! このモジュールは、プレーンテキストのソーステーブルから
//! rkyv形式のバイナリ辞書バンドルを構築する機能を提供します。

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use morfema::errors::MorfemaError;
use morfema::DictionaryBuilder;

/// ビルドコマンドの引数
///
/// 辞書バンドルをビルドするために必要な入力ファイルと出力先を
/// 指定します。
#[derive(Parser, Debug)]
#[command(name = "build", about = "A program to build the dictionary bundle.")]
pub struct Args {
    /// Tag table file (gramtab.txt).
    #[arg(short = 't', long)]
    gramtab_in: PathBuf,

    /// Grammeme hierarchy file (grammemes.txt).
    #[arg(short = 'g', long)]
    grammemes_in: PathBuf,

    /// Paradigm table file (paradigms.txt).
    #[arg(short = 'p', long)]
    paradigms_in: PathBuf,

    /// Lexeme placement file (lexemes.txt).
    #[arg(short = 'l', long)]
    lexemes_in: PathBuf,

    /// Known prefix file (prefixes.txt). Optional.
    #[arg(short = 'k', long)]
    prefixes_in: Option<PathBuf>,

    /// File to which the binary bundle is output.
    #[arg(short = 'o', long)]
    dict_out: PathBuf,

    /// Revision string of the source corpus, stored in the bundle metadata.
    #[arg(short = 'r', long, default_value = "unknown")]
    revision: String,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 辞書構築エラー
    #[error("Dictionary building failed: {0}")]
    Morfema(#[from] MorfemaError),
}

/// ソーステーブルからバンドルを構築して書き出します。
///
/// # エラー
///
/// 入力ファイルが開けない場合、ソースフォーマットが不正な場合、
/// または出力の書き込みに失敗した場合にエラーを返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    eprintln!("Compiling the dictionary...");

    let prefixes = args
        .prefixes_in
        .as_ref()
        .map(|p| File::open(p).map(BufReader::new))
        .transpose()?;
    let data = DictionaryBuilder::from_readers(
        BufReader::new(File::open(&args.gramtab_in)?),
        BufReader::new(File::open(&args.grammemes_in)?),
        BufReader::new(File::open(&args.paradigms_in)?),
        BufReader::new(File::open(&args.lexemes_in)?),
        prefixes,
        &args.revision,
    )?;

    let mut wtr = BufWriter::new(File::create(&args.dict_out)?);
    data.write(&mut wtr)?;
    wtr.flush()?;

    eprintln!("Wrote the bundle to {}", args.dict_out.display());
    Ok(())
}
