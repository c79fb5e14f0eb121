//! パラダイムストア
//!
//! このモジュールは、パラダイム圧縮された活用表を管理します。
//! 一つのパラダイムはN個のスロット（= 一つのレキシームの活用形の数）から
//! なり、`[接尾辞ID×N | タグID×N | 接頭辞ID×N]`という長さ3Nの
//! フラットな整数列として符号化されます。スロット0は常に正規形です。

use rkyv::{Archive, Deserialize, Serialize};

use crate::parse::TagId;

/// すべてのパラダイムと接辞文字列テーブルを保持するストア
///
/// パラダイム本体は一つのフラット配列に連結され、`offsets`で
/// 各パラダイムのスライスが特定されます。
#[derive(Archive, Serialize, Deserialize)]
pub struct ParadigmSet {
    data: Vec<u16>,
    offsets: Vec<u32>,
    suffixes: Vec<String>,
    prefixes: Vec<String>,
}

/// パラダイムの1スロット分の情報
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParadigmSlot<'a> {
    /// スロットの接頭辞
    pub prefix: &'a str,

    /// スロットのタグID
    pub tag_id: TagId,

    /// スロットの接尾辞
    pub suffix: &'a str,
}

impl ParadigmSet {
    pub(crate) fn new(
        data: Vec<u16>,
        offsets: Vec<u32>,
        suffixes: Vec<String>,
        prefixes: Vec<String>,
    ) -> Self {
        Self {
            data,
            offsets,
            suffixes,
            prefixes,
        }
    }

    /// パラダイムの数を取得します。
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 指定されたパラダイムの符号化列を取得します。
    #[inline(always)]
    fn encoded(&self, para_id: u16) -> &[u16] {
        let i = para_id as usize;
        &self.data[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }

    /// 指定されたパラダイムのスロット数を取得します。
    #[inline(always)]
    pub fn slot_count(&self, para_id: u16) -> usize {
        self.encoded(para_id).len() / 3
    }

    /// 指定されたスロットのタグIDを取得します。O(1)です。
    #[inline(always)]
    pub fn tag_id_at(&self, para_id: u16, idx: u16) -> TagId {
        let encoded = self.encoded(para_id);
        let n = encoded.len() / 3;
        encoded[n + idx as usize]
    }

    /// 指定されたスロットの接頭辞と接尾辞を取得します。
    #[inline(always)]
    pub(crate) fn affixes(&self, para_id: u16, idx: u16) -> (&str, &str) {
        let encoded = self.encoded(para_id);
        let n = encoded.len() / 3;
        let suffix_id = encoded[idx as usize];
        let prefix_id = encoded[2 * n + idx as usize];
        (
            &self.prefixes[prefix_id as usize],
            &self.suffixes[suffix_id as usize],
        )
    }

    /// パラダイムの全スロットを復号します。
    ///
    /// レキシーム展開や外部からの内省に使用されます。
    pub fn paradigm_info(&self, para_id: u16) -> Vec<ParadigmSlot<'_>> {
        let n = self.slot_count(para_id);
        let mut slots = Vec::with_capacity(n);
        for idx in 0..n {
            let idx = idx as u16;
            let (prefix, suffix) = self.affixes(para_id, idx);
            slots.push(ParadigmSlot {
                prefix,
                tag_id: self.tag_id_at(para_id, idx),
                suffix,
            });
        }
        slots
    }

    /// 表層形から語幹を取り出します。
    ///
    /// スロットの接頭辞を左から、接尾辞を右から、それぞれの長さで
    /// 取り除きます。接尾辞が空の場合は接頭辞の除去以外には何も
    /// 行いません。
    ///
    /// # パニック
    ///
    /// 表層形がこのスロットの接頭辞・接尾辞を構造的に持たない場合は
    /// パニックします。呼び出し側は、該当パラダイムのスロットに
    /// 一致することが既知の表層形のみを渡す必要があります。
    pub fn stem<'w>(&self, para_id: u16, idx: u16, word: &'w str) -> &'w str {
        let (prefix, suffix) = self.affixes(para_id, idx);
        assert!(
            word.len() >= prefix.len() + suffix.len()
                && word.starts_with(prefix)
                && word.ends_with(suffix),
            "word {word:?} does not fit paradigm {para_id} slot {idx} ({prefix:?}, {suffix:?})",
        );
        &word[prefix.len()..word.len() - suffix.len()]
    }

    /// 表層形から正規形（スロット0の形）を再構築します。
    ///
    /// `idx == 0`の場合、表層形自体が正規形なのでそのまま返します。
    pub fn normal_form(&self, para_id: u16, idx: u16, word: &str) -> String {
        if idx == 0 {
            return word.to_string();
        }
        let stem = self.stem(para_id, idx, word);
        let (prefix, suffix) = self.affixes(para_id, 0);
        let mut normal = String::with_capacity(prefix.len() + stem.len() + suffix.len());
        normal.push_str(prefix);
        normal.push_str(stem);
        normal.push_str(suffix);
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// パラダイム0: (-, 0, "а"), (-, 1, "и")
    /// パラダイム1: ("наи", 2, "ший"), ("", 3, "")
    fn sample() -> ParadigmSet {
        ParadigmSet::new(
            vec![
                1, 2, 0, 1, 0, 0, //
                3, 0, 2, 3, 1, 0,
            ],
            vec![0, 6, 12],
            vec!["".to_string(), "а".to_string(), "и".to_string(), "ший".to_string()],
            vec!["".to_string(), "наи".to_string()],
        )
    }

    #[test]
    fn test_slot_layout() {
        let set = sample();
        assert_eq!(set.len(), 2);
        assert_eq!(set.slot_count(0), 2);
        assert_eq!(set.tag_id_at(0, 0), 0);
        assert_eq!(set.tag_id_at(0, 1), 1);
        assert_eq!(set.affixes(0, 0), ("", "а"));
        assert_eq!(set.affixes(0, 1), ("", "и"));
        assert_eq!(set.affixes(1, 0), ("наи", "ший"));
        assert_eq!(set.affixes(1, 1), ("", ""));
    }

    #[test]
    fn test_paradigm_info() {
        let set = sample();
        assert_eq!(
            set.paradigm_info(0),
            vec![
                ParadigmSlot { prefix: "", tag_id: 0, suffix: "а" },
                ParadigmSlot { prefix: "", tag_id: 1, suffix: "и" },
            ]
        );
    }

    #[test]
    fn test_stem() {
        let set = sample();
        assert_eq!(set.stem(0, 0, "книга"), "книг");
        assert_eq!(set.stem(0, 1, "книги"), "книг");
        assert_eq!(set.stem(1, 0, "наилучший"), "луч");
    }

    #[test]
    fn test_stem_empty_suffix_keeps_word() {
        let set = sample();
        // 空の接尾辞は「何も取り除かない」であり「すべて取り除く」ではない
        assert_eq!(set.stem(1, 1, "луч"), "луч");
    }

    #[test]
    #[should_panic]
    fn test_stem_mismatch_panics() {
        let set = sample();
        let _ = set.stem(0, 0, "кот");
    }

    #[test]
    fn test_normal_form() {
        let set = sample();
        assert_eq!(set.normal_form(0, 1, "книги"), "книга");
        assert_eq!(set.normal_form(0, 0, "книга"), "книга");
        assert_eq!(set.normal_form(1, 1, "луч"), "наилучший");
    }
}
