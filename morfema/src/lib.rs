//! # Morfema
//!
//! Morfemaは、パラダイム圧縮された語彙に基づく形態素解析器の実装です。
//!
//! ## 概要
//!
//! このライブラリは、ロシア語をはじめとする屈折の豊富な言語の単語に
//! 形態素的な解釈（文法タグ・正規形・活用族）を割り当てます。
//! 既知語はパラダイム圧縮された辞書で検索され、未知語は順序付きの
//! ヒューリスティックユニット列によって推測されます。
//! rkyvシリアライゼーションフォーマットを使用することで、
//! 辞書バンドルの読み込みを高速化しています。
//!
//! ## 主な機能
//!
//! - **辞書検索**: е→ё補正を伴う近似一致と同音異義語の展開
//! - **未知語推測**: 句読点・ラテン文字・ハイフン・接辞に基づく
//!   フォールバックのパイプライン
//! - **派生操作**: レキシーム展開、正規形の計算、グラメーム集合への屈折
//! - **辞書構築**: プレーンテキストのソーステーブルからのビルド
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use morfema::{Dictionary, DictionaryBuilder, MorphAnalyzer};
//!
//! let gramtab = "NOUN,inan femn sing,nomn\nNOUN,inan femn plur,nomn";
//! let grammemes = "POST,\nNOUN,POST\nNMbr,\nsing,NMbr\nplur,NMbr";
//! let paradigms = ",0,а;,1,и";
//! let lexemes = "книг,0";
//!
//! let data = DictionaryBuilder::from_readers(
//!     gramtab.as_bytes(),
//!     grammemes.as_bytes(),
//!     paradigms.as_bytes(),
//!     lexemes.as_bytes(),
//!     None::<&[u8]>,
//!     "demo",
//! )?;
//! let morph = MorphAnalyzer::from_dictionary(Dictionary::from_data(data))?;
//!
//! let parses = morph.parse_bound("книги");
//! assert_eq!(parses.len(), 1);
//! assert_eq!(parses[0].word(), "книги");
//! assert_eq!(parses[0].normal_form(), "книга");
//! assert_eq!(parses[0].tag().raw(), "NOUN,inan femn plur,nomn");
//! assert!(parses[0].is_known());
//!
//! let lexeme = parses[0].lexeme()?;
//! assert_eq!(lexeme.len(), 2);
//! assert_eq!(lexeme[0].word(), "книга");
//! # Ok(())
//! # }
//! ```

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// 形態素解析のパイプライン
pub mod analyzer;

/// 辞書データ構造とビルダー
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 解析結果コンテナ
pub mod parse;

/// 未知語のためのヒューリスティックユニット
pub mod units;

/// ユーティリティ
pub mod utils;


pub use crate::analyzer::{MorphAnalyzer, DICT_PATH_ENV};
pub use crate::dictionary::{Dictionary, DictionaryBuilder, DictionaryData, LoadMode, Meta};
pub use crate::errors::{MorfemaError, Result};
pub use crate::parse::{BoundParse, DerivationStep, MethodKind, ParadigmLoc, Parse, TagId};

/// このライブラリのバージョン
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
