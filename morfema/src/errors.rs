//! エラー型の定義
//!
//! このモジュールは、Morfemaライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt;

/// Morfema専用のResult型
///
/// エラー型としてデフォルトで[`MorfemaError`]を使用します。
pub type Result<T, E = MorfemaError> = std::result::Result<T, E>;

/// Morfemaのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
#[derive(Debug, thiserror::Error)]
pub enum MorfemaError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// 辞書ソーステーブルやバイナリバンドルの形式が不正な場合に発生します。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    ///
    /// コンポーネント間の契約違反（例: 別のコンポーネントが生成した解析結果の
    /// 再構築を要求された場合）に発生します。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 設定エラー
    ///
    /// 辞書パスが解決できないなど、解析器の構築に必要な設定が
    /// 欠落している場合に発生します。
    #[error(transparent)]
    Configuration(ConfigurationError),

    /// 整数変換エラー
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// 整数パースエラー
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),

    /// ディレクトリが指定されたエラー
    ///
    /// ファイルが期待される場所にディレクトリが指定された場合に発生します。
    #[error("The path '{0}' is a directory, but a file was expected.")]
    PathIsDirectory(std::path::PathBuf),

    /// I/Oエラー
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// rkyvシリアライゼーションエラー
    #[error(transparent)]
    Rkyv(#[from] rkyv::rancor::Error),
}

impl MorfemaError {
    /// 無効な引数エラーを生成します
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }

    /// 設定エラーを生成します
    pub(crate) fn configuration<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Configuration(ConfigurationError { msg: msg.into() })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

/// 設定が不足している場合に使用されるエラー
///
/// 解析器は部分的に構築されることはなく、このエラーが返された時点で
/// 構築そのものが失敗します。
#[derive(Debug)]
pub struct ConfigurationError {
    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConfigurationError: {}", self.msg)
    }
}

impl Error for ConfigurationError {}
