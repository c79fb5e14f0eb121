//! 形態素解析を実行するユーティリティ
//!
//! このバイナリは、標準入力から読み込んだテキストを空白で区切り、
//! 各単語を形態素解析して指定された出力形式（parse、tag、lemma）で
//! 結果を出力します。

use std::error::Error;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use morfema::{LoadMode, MorphAnalyzer};

/// 出力モード
#[derive(Clone, Debug)]
enum OutputMode {
    Parse,
    Tag,
    Lemma,
}

/// `OutputMode` の `FromStr` 実装
impl FromStr for OutputMode {
    type Err = &'static str;

    /// 文字列から出力モードをパースする
    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "parse" => Ok(Self::Parse),
            "tag" => Ok(Self::Tag),
            "lemma" => Ok(Self::Lemma),
            _ => Err("Could not parse a mode"),
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "analyze", about = "Predicts morphological interpretations")]
struct Args {
    /// Dictionary bundle. When omitted, the path is resolved from the
    /// MORFEMA_DICT_PATH environment variable or the installed default.
    #[arg(short = 'i', long)]
    dict: Option<PathBuf>,

    /// Output mode. Choices are parse, tag, and lemma.
    #[arg(short = 'O', long, default_value = "parse")]
    output_mode: OutputMode,

    /// Skips archive validation. Use only for trusted bundles.
    #[arg(long)]
    unchecked: bool,
}

/// メイン関数
///
/// 辞書をロードし、標準入力から読み込んだテキストを形態素解析して、
/// 指定された形式で結果を標準出力に出力します。
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mode = if args.unchecked {
        LoadMode::Unchecked
    } else {
        LoadMode::Validate
    };

    eprintln!("Loading the dictionary...");
    let morph = match &args.dict {
        Some(path) => MorphAnalyzer::from_path(path, mode)?,
        None => MorphAnalyzer::new(mode)?,
    };
    eprintln!("Ready to analyze");

    let is_tty = atty::is(atty::Stream::Stdout);

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    let lines = std::io::stdin().lock().lines();
    for line in lines {
        let line = line?;
        match args.output_mode {
            OutputMode::Parse => {
                for word in line.split_whitespace() {
                    for p in morph.parse_bound(word) {
                        writeln!(
                            &mut out,
                            "{}\t{}\t{}\t{:.3}",
                            p.word(),
                            p.tag().raw(),
                            p.normal_form(),
                            p.estimate(),
                        )?;
                    }
                }
                out.write_all(b"EOS\n")?;
            }
            OutputMode::Tag => {
                for word in line.split_whitespace() {
                    let tags: Vec<&str> = morph
                        .tag(word)
                        .into_iter()
                        .map(|id| morph.dictionary().tag_set().get(id).raw())
                        .collect();
                    writeln!(&mut out, "{}\t{}", word, tags.join("|"))?;
                }
                out.write_all(b"EOS\n")?;
            }
            OutputMode::Lemma => {
                let mut first = true;
                for word in line.split_whitespace() {
                    if !first {
                        out.write_all(b" ")?;
                    }
                    first = false;
                    let mut lemmas = morph.normal_forms(word);
                    let lemma = if lemmas.is_empty() {
                        word.to_string()
                    } else {
                        lemmas.remove(0)
                    };
                    out.write_all(lemma.as_bytes())?;
                }
                out.write_all(b"\n")?;
            }
        }
        if is_tty {
            out.flush()?;
        }
    }

    Ok(())
}
