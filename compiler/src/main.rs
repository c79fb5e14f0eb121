//! Morfema 辞書コンパイラのメインエントリーポイント
//!
//! このモジュールは、形態素解析用の辞書バンドルを構築するための
//! サブコマンドを提供します。ソーステーブルからのビルドと、
//! 構築済みバンドルの内容確認をサポートします。

mod build;
mod inspect;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::build::BuildError;
use crate::inspect::InspectError;

/// コマンドライン引数の構造体
///
/// `clap`を使用してコマンドライン引数をパースします。
#[derive(Parser, Debug)]
#[command(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[command(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Subcommand, Debug)]
enum Command {
    /// ソーステーブルからバイナリ辞書バンドルを構築します
    ///
    /// 辞書ソースファイル(gramtab.txt, paradigms.txt等)から
    /// rkyv形式のバンドルを生成します。
    Build(build::Args),

    /// 構築済みバンドルのメタデータとテーブルサイズを表示します
    Inspect(inspect::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
#[derive(Debug, Error)]
pub enum CompileError {
    /// 辞書ビルド中のエラー
    #[error(transparent)]
    Build(#[from] BuildError),
    /// バンドル確認中のエラー
    #[error(transparent)]
    Inspect(#[from] InspectError),
}

fn main() -> Result<(), CompileError> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Inspect(args) => Ok(inspect::run(args)?),
    }
}
