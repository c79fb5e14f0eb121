//! バンドル確認モジュール
//!
//! このモジュールは、構築済みの辞書バンドルを読み込み、
//! メタデータと各テーブルのサイズを表示する機能を提供します。

use std::io;
use std::path::PathBuf;

use clap::Parser;
use morfema::errors::MorfemaError;
use morfema::{Dictionary, LoadMode};

/// 確認コマンドの引数
#[derive(Parser, Debug)]
#[command(name = "inspect", about = "A program to inspect a dictionary bundle.")]
pub struct Args {
    /// Dictionary bundle to inspect.
    #[arg(short = 'i', long)]
    dict_in: PathBuf,

    /// Skips archive validation. Use only for trusted bundles.
    #[arg(long)]
    unchecked: bool,
}

/// バンドル確認中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// バンドル読み込みエラー
    #[error("Loading the bundle failed: {0}")]
    Morfema(#[from] MorfemaError),
}

/// バンドルを読み込んで内容を表示します。
///
/// # エラー
///
/// バンドルが開けない場合、または検証に失敗した場合にエラーを
/// 返します。
pub fn run(args: Args) -> Result<(), InspectError> {
    let mode = if args.unchecked {
        LoadMode::Unchecked
    } else {
        LoadMode::Validate
    };
    let dict = Dictionary::from_path(&args.dict_in, mode)?;

    let meta = dict.meta();
    println!("format_version: {}", meta.format_version);
    println!("source_revision: {}", meta.source_revision);
    println!("compiled_at: {}", meta.compiled_at);
    println!("tags: {}", dict.tag_set().len());
    println!("paradigms: {}", dict.paradigms().len());
    Ok(())
}
