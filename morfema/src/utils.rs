//! 内部ユーティリティ関数
//!
//! このモジュールには、辞書ソーステーブルの解析で使用される
//! CSV行の分割ヘルパーが含まれています。

use csv_core::ReadFieldResult;

/// CSV形式の行を解析してフィールドのベクターに分割する
///
/// ダブルクォートで囲まれたフィールドや、フィールド内のカンマも正しく処理します。
///
/// # 例
///
/// ```
/// # use morfema::utils::parse_csv_row;
/// let fields = parse_csv_row("книг,0");
/// assert_eq!(fields, vec!["книг", "0"]);
///
/// let quoted = parse_csv_row("\"а,б\",1");
/// assert_eq!(quoted, vec!["а,б", "1"]);
/// ```
pub fn parse_csv_row(row: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        let end = match result {
            ReadFieldResult::InputEmpty => true,
            ReadFieldResult::Field { .. } => false,
            ReadFieldResult::End => true,
            _ => unreachable!(),
        };
        fields.push(String::from_utf8_lossy(&output[..nout]).into_owned());
        if end {
            break;
        }
        bytes = &bytes[nin..];
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_row() {
        assert_eq!(&["книг", "0"], parse_csv_row("книг,0").as_slice());
    }

    #[test]
    fn test_parse_csv_row_empty_fields() {
        assert_eq!(&["", "12", ""], parse_csv_row(",12,").as_slice());
    }
}
