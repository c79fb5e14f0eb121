//! 辞書構築のためのビルダー
//!
//! このモジュールは、プレーンテキストのソーステーブルから
//! [`DictionaryData`]を構築するためのビルダーを提供します。

use std::io::Read;
use std::time::SystemTime;

use hashbrown::HashMap;

use crate::dictionary::paradigm::ParadigmSet;
use crate::dictionary::tag::GrammemeLink;
use crate::dictionary::words::{PredictionSuffixesBuilder, WordMapBuilder};
use crate::dictionary::{DictionaryData, Meta};
use crate::errors::{MorfemaError, Result};
use crate::parse::ParadigmLoc;
use crate::utils;

/// バンドルフォーマットのバージョン
const FORMAT_VERSION: &str = "1";

/// ビルダーが常に登録するサービスタグ
///
/// 形状認識ユニットと未知語フォールバックが参照するタグです。
/// ソーステーブルに含まれていない場合のみ追加されます。
const SERVICE_TAGS: &[&str] = &["PNCT", "LATN", "NUMB,intg", "NUMB,real", "UNKN"];

/// 文字列を整数IDに置き換えるインターナ
#[derive(Default)]
struct StringInterner {
    ids: HashMap<String, u16>,
    strings: Vec<String>,
}

impl StringInterner {
    fn intern(&mut self, s: &str) -> Result<u16> {
        if let Some(&id) = self.ids.get(s) {
            return Ok(id);
        }
        let id = u16::try_from(self.strings.len())?;
        self.ids.insert(s.to_string(), id);
        self.strings.push(s.to_string());
        Ok(id)
    }
}

/// ソーステーブルから[`DictionaryData`]を構築するビルダー
pub struct DictionaryBuilder {}

impl DictionaryBuilder {
    /// ソーステーブルのリーダーから新しい[`DictionaryData`]を作成します。
    ///
    /// # 引数
    ///
    ///  - `gramtab_rdr`: タグテーブル `gramtab.txt` のリーダー
    ///    （1行に1つの生のタグ文字列。行番号がタグIDになります）
    ///  - `grammemes_rdr`: グラメーム階層 `grammemes.txt` のリーダー
    ///    （1行に `グラメーム,親`。親が空の場合はルート）
    ///  - `paradigms_rdr`: パラダイム表 `paradigms.txt` のリーダー
    ///    （1行に1パラダイム。スロットは `;` 区切り、各スロットは
    ///    `接頭辞,タグID,接尾辞`。行番号がパラダイムIDになります）
    ///  - `lexemes_rdr`: レキシーム配置表 `lexemes.txt` のリーダー
    ///    （1行に `語幹,パラダイムID`）
    ///  - `prefixes_rdr`: 既知接頭辞表 `prefixes.txt` のリーダー
    ///    （1行に1接頭辞。省略可能）
    ///  - `source_revision`: ソースコーパスのリビジョン文字列
    ///
    /// 各レキシームについてパラダイムの全スロットの表層形が生成され、
    /// 語彙ストアと接尾辞予測テーブルに登録されます。
    /// サービスタグ（`PNCT`など）が欠けている場合は自動的に追加されます。
    ///
    /// # エラー
    ///
    /// 入力フォーマットが不正な場合、または参照先のID・テーブルサイズが
    /// 上限を超える場合にエラーを返します。
    pub fn from_readers<G, H, P, L, K>(
        gramtab_rdr: G,
        grammemes_rdr: H,
        paradigms_rdr: P,
        lexemes_rdr: L,
        prefixes_rdr: Option<K>,
        source_revision: &str,
    ) -> Result<DictionaryData>
    where
        G: Read,
        H: Read,
        P: Read,
        L: Read,
        K: Read,
    {
        let gramtab = Self::parse_gramtab(gramtab_rdr)?;
        let grammemes = Self::parse_grammemes(grammemes_rdr)?;
        let paradigms = Self::parse_paradigms(paradigms_rdr, gramtab.len())?;
        let prediction_prefixes = match prefixes_rdr {
            Some(rdr) => Self::parse_prefixes(rdr)?,
            None => vec![],
        };

        let mut words = WordMapBuilder::new();
        let mut suffixes = PredictionSuffixesBuilder::new();
        let lexemes = read_to_string(lexemes_rdr)?;
        for (i, line) in lexemes.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let cols = utils::parse_csv_row(line);
            if cols.len() != 2 {
                return Err(MorfemaError::invalid_format(
                    "lexemes_rdr",
                    format!("line {}: expected `stem,para_id`, got {line:?}", i + 1),
                ));
            }
            let stem = &cols[0];
            let para_id: u16 = cols[1].parse()?;
            if usize::from(para_id) >= paradigms.len() {
                return Err(MorfemaError::invalid_format(
                    "lexemes_rdr",
                    format!("line {}: paradigm id {para_id} is out of range", i + 1),
                ));
            }
            for (idx, slot) in paradigms.paradigm_info(para_id).iter().enumerate() {
                let mut word =
                    String::with_capacity(slot.prefix.len() + stem.len() + slot.suffix.len());
                word.push_str(slot.prefix);
                word.push_str(stem);
                word.push_str(slot.suffix);
                let value = ParadigmLoc {
                    para_id,
                    idx: idx as u16,
                }
                .pack();
                suffixes.observe(&word, value);
                words.add_record(word, value);
            }
        }

        Ok(DictionaryData {
            meta: Meta {
                format_version: FORMAT_VERSION.to_string(),
                source_revision: source_revision.to_string(),
                compiled_at: epoch_secs().to_string(),
            },
            gramtab,
            grammemes,
            paradigms,
            words: words.build()?,
            prediction_prefixes,
            prediction_suffixes: suffixes.build()?,
        })
    }

    fn parse_gramtab<R>(rdr: R) -> Result<Vec<String>>
    where
        R: Read,
    {
        let buf = read_to_string(rdr)?;
        let mut gramtab: Vec<String> =
            buf.lines().filter(|l| !l.is_empty()).map(str::to_string).collect();
        for &service in SERVICE_TAGS {
            if !gramtab.iter().any(|t| t == service) {
                gramtab.push(service.to_string());
            }
        }
        if u16::try_from(gramtab.len()).is_err() {
            return Err(MorfemaError::invalid_format(
                "gramtab_rdr",
                "too many tags: tag ids must fit in 16 bits",
            ));
        }
        Ok(gramtab)
    }

    fn parse_grammemes<R>(rdr: R) -> Result<Vec<GrammemeLink>>
    where
        R: Read,
    {
        let buf = read_to_string(rdr)?;
        let mut grammemes = vec![];
        for (i, line) in buf.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let cols = utils::parse_csv_row(line);
            if cols.len() != 2 {
                return Err(MorfemaError::invalid_format(
                    "grammemes_rdr",
                    format!("line {}: expected `grammeme,parent`, got {line:?}", i + 1),
                ));
            }
            grammemes.push(GrammemeLink {
                name: cols[0].clone(),
                parent: cols[1].clone(),
            });
        }
        Ok(grammemes)
    }

    fn parse_paradigms<R>(rdr: R, n_tags: usize) -> Result<ParadigmSet>
    where
        R: Read,
    {
        let buf = read_to_string(rdr)?;
        let mut suffixes = StringInterner::default();
        let mut prefixes = StringInterner::default();
        let mut data = vec![];
        let mut offsets = vec![0u32];
        let mut n_paradigms = 0usize;
        for (i, line) in buf.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let mut suffix_ids = vec![];
            let mut tag_ids = vec![];
            let mut prefix_ids = vec![];
            for slot in line.split(';') {
                let cols = utils::parse_csv_row(slot);
                if cols.len() != 3 {
                    return Err(MorfemaError::invalid_format(
                        "paradigms_rdr",
                        format!(
                            "line {}: expected `prefix,tag_id,suffix`, got {slot:?}",
                            i + 1
                        ),
                    ));
                }
                let tag_id: u16 = cols[1].parse()?;
                if usize::from(tag_id) >= n_tags {
                    return Err(MorfemaError::invalid_format(
                        "paradigms_rdr",
                        format!("line {}: tag id {tag_id} is out of range", i + 1),
                    ));
                }
                prefix_ids.push(prefixes.intern(&cols[0])?);
                tag_ids.push(tag_id);
                suffix_ids.push(suffixes.intern(&cols[2])?);
            }
            // フラットなパラダイム符号化: [接尾辞ID×N | タグID×N | 接頭辞ID×N]
            data.extend_from_slice(&suffix_ids);
            data.extend_from_slice(&tag_ids);
            data.extend_from_slice(&prefix_ids);
            offsets.push(u32::try_from(data.len())?);
            n_paradigms += 1;
        }
        if u16::try_from(n_paradigms).is_err() {
            return Err(MorfemaError::invalid_format(
                "paradigms_rdr",
                "too many paradigms: paradigm ids must fit in 16 bits",
            ));
        }
        Ok(ParadigmSet::new(
            data,
            offsets,
            suffixes.strings,
            prefixes.strings,
        ))
    }

    fn parse_prefixes<R>(rdr: R) -> Result<Vec<String>>
    where
        R: Read,
    {
        let buf = read_to_string(rdr)?;
        let mut prefixes: Vec<String> =
            buf.lines().filter(|l| !l.is_empty()).map(str::to_string).collect();
        // 接頭辞除去ユニットは長い一致を優先するため、長さの降順で保持する
        prefixes.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        prefixes.dedup();
        Ok(prefixes)
    }
}

fn read_to_string<R>(mut rdr: R) -> Result<String>
where
    R: Read,
{
    let mut buf = String::new();
    rdr.read_to_string(&mut buf)?;
    Ok(buf)
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(
        gramtab: &str,
        grammemes: &str,
        paradigms: &str,
        lexemes: &str,
    ) -> Result<DictionaryData> {
        DictionaryBuilder::from_readers(
            gramtab.as_bytes(),
            grammemes.as_bytes(),
            paradigms.as_bytes(),
            lexemes.as_bytes(),
            None::<&[u8]>,
            "test",
        )
    }

    #[test]
    fn test_minimal_tables() {
        let data = build(
            "NOUN,inan femn sing,nomn\nNOUN,inan femn plur,nomn",
            "POST,\nNOUN,POST",
            ",0,а;,1,и",
            "книг,0",
        )
        .unwrap();
        assert_eq!(data.paradigms.len(), 1);
        assert!(data.words.contains("книга"));
        assert!(data.words.contains("книги"));
        assert!(!data.words.contains("книг"));
        // サービスタグが追加されている
        assert!(data.gramtab.iter().any(|t| t == "PNCT"));
        assert!(data.gramtab.iter().any(|t| t == "UNKN"));
    }

    #[test]
    fn test_service_tags_are_not_duplicated() {
        let data = build("PNCT\nNOUN", "", "", "").unwrap();
        assert_eq!(data.gramtab.iter().filter(|t| *t == "PNCT").count(), 1);
    }

    #[test]
    fn test_oor_tag_id() {
        let result = build("NOUN", "", ",7,а", "");
        assert!(result.is_err());
    }

    #[test]
    fn test_oor_paradigm_id() {
        let result = build("NOUN", "", ",0,а", "книг,3");
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_slot() {
        let result = build("NOUN", "", ",0", "");
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_tag_id() {
        let result = build("NOUN", "", ",x,а", "");
        assert!(result.is_err());
    }

    #[test]
    fn test_prefixes_sorted_longest_first() {
        let data = DictionaryBuilder::from_readers(
            "NOUN".as_bytes(),
            "".as_bytes(),
            "".as_bytes(),
            "".as_bytes(),
            Some("по\nнаи\nне".as_bytes()),
            "test",
        )
        .unwrap();
        assert_eq!(data.prediction_prefixes, vec!["наи", "не", "по"]);
    }
}
