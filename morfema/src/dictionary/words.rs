//! 語彙ストア
//!
//! このモジュールは、表層形から`(パラダイムID, スロット番号)`の組への
//! マッピングを管理します。完全一致検索に加えて、混同しやすい文字の
//! 置換規則を適用した近似一致検索（例: е→ё）と、接頭辞による
//! 辞書順列挙を提供します。

pub(crate) mod trie;

use std::collections::BTreeMap;

use rkyv::{Archive, Deserialize, Serialize};

use crate::dictionary::words::trie::{PrefixLeaves, Trie, TrieBuilder};
use crate::errors::Result;

/// 混同しやすい文字の置換規則
///
/// 近似一致検索でのみ適用される`(元の文字, 置換先)`のペアの集合です。
/// 完全一致検索では決して適用されません。
#[derive(Clone, Debug, Default)]
pub struct SubstitutionRules {
    pairs: Vec<(char, char)>,
}

impl SubstitutionRules {
    /// ペアの列から置換規則を作成します。
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, char)>,
    {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// е→ёの標準規則を作成します。
    ///
    /// ロシア語のёはеと綴られることが多いため、
    /// 辞書検索の既定の規則として使用されます。
    pub fn yo() -> Self {
        Self::from_pairs([('е', 'ё')])
    }

    /// 指定された文字の置換候補を返します。
    pub(crate) fn alternatives(&self, c: char) -> impl Iterator<Item = char> + '_ {
        self.pairs
            .iter()
            .filter(move |&&(from, to)| from == c && to != c)
            .map(|&(_, to)| to)
    }
}

/// ポスティングリスト
///
/// IDの集合を、長さと値を交互に並べた一つの配列として格納します。
#[derive(Archive, Serialize, Deserialize)]
pub(crate) struct Postings {
    data: Vec<u32>,
}

impl Postings {
    /// 指定されたオフセットのIDイテレータを取得します。
    #[inline(always)]
    pub(crate) fn ids(&'_ self, offset: usize) -> impl Iterator<Item = u32> + '_ {
        let len = self.data[offset] as usize;
        self.data[offset + 1..offset + 1 + len].iter().copied()
    }
}

/// ポスティングリストを構築するビルダー
#[derive(Default)]
pub(crate) struct PostingsBuilder {
    data: Vec<u32>,
}

impl PostingsBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// IDリストを追加し、そのオフセットを返します。
    pub(crate) fn push(&mut self, ids: &[u32]) -> Result<usize> {
        let offset = self.data.len();
        self.data.push(u32::try_from(ids.len())?);
        self.data.extend_from_slice(ids);
        Ok(offset)
    }

    pub(crate) fn build(self) -> Postings {
        Postings { data: self.data }
    }
}

/// 単語をトライ構造で管理するマップ
///
/// 一つの表層形は複数の値（同音異義語）を持つことができます。
#[derive(Archive, Serialize, Deserialize)]
pub struct WordMap {
    trie: Trie,
    postings: Postings,
}

impl WordMap {
    /// 表層形が登録されているかを判定します。
    ///
    /// 置換規則は適用されません。
    #[inline(always)]
    pub fn contains(&self, word: &str) -> bool {
        self.trie.find(word).is_some()
    }

    /// 置換規則を適用して到達可能なすべての綴りとその値を取得します。
    ///
    /// # 戻り値
    ///
    /// `(補正済みの綴り, 値のベクター)`のペアのベクター。
    /// 未補正の綴り（登録されている場合）が先頭に並びます。
    pub fn similar_items(
        &self,
        word: &str,
        rules: &SubstitutionRules,
    ) -> Vec<(String, Vec<u32>)> {
        self.trie
            .similar_leaves(word, rules)
            .into_iter()
            .map(|(fixed, offset)| (fixed, self.postings.ids(offset as usize).collect()))
            .collect()
    }

    /// 補正済みの綴りを省略した近似一致検索を行います。
    ///
    /// タグ付けのみを行う高速パスで使用されます。
    pub fn similar_item_values(&self, word: &str, rules: &SubstitutionRules) -> Vec<Vec<u32>> {
        self.trie
            .similar_leaves(word, rules)
            .into_iter()
            .map(|(_, offset)| self.postings.ids(offset as usize).collect())
            .collect()
    }

    /// 置換規則を適用して到達可能な綴りのみを取得します。
    pub fn similar_keys(&self, word: &str, rules: &SubstitutionRules) -> Vec<String> {
        self.trie
            .similar_leaves(word, rules)
            .into_iter()
            .map(|(fixed, _)| fixed)
            .collect()
    }

    /// 接頭辞配下のエントリを辞書順で列挙するイテレータを取得します。
    ///
    /// 同じ表層形に複数の値が登録されている場合、表層形は値ごとに
    /// 繰り返し返されます。呼び出しごとに独立した有限のイテレータです。
    pub fn iter<'a>(&'a self, prefix: &str) -> WordEntries<'a> {
        WordEntries {
            map: self,
            leaves: self.trie.prefix_leaves(prefix),
            word: String::new(),
            values: vec![].into_iter(),
        }
    }
}

/// [`WordMap::iter`]が返すエントリのイテレータ
pub struct WordEntries<'a> {
    map: &'a WordMap,
    leaves: PrefixLeaves<'a>,
    word: String,
    values: std::vec::IntoIter<u32>,
}

impl Iterator for WordEntries<'_> {
    type Item = (String, u32);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.values.next() {
                return Some((self.word.clone(), value));
            }
            let (word, offset) = self.leaves.next()?;
            self.word = word;
            self.values = self
                .map
                .postings
                .ids(offset as usize)
                .collect::<Vec<_>>()
                .into_iter();
        }
    }
}

/// 単語マップを構築するビルダー
#[derive(Default)]
pub struct WordMapBuilder {
    map: BTreeMap<String, Vec<u32>>,
}

impl WordMapBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// 表層形と値を登録します。
    #[inline(always)]
    pub fn add_record(&mut self, word: String, value: u32) {
        self.map.entry(word).or_default().push(value);
    }

    pub fn build(self) -> Result<WordMap> {
        let mut trie = TrieBuilder::new();
        let mut postings = PostingsBuilder::new();
        for (word, values) in self.map {
            let offset = postings.push(&values)?;
            trie.insert(&word, u32::try_from(offset)?);
        }
        Ok(WordMap {
            trie: trie.build(),
            postings: postings.build(),
        })
    }
}

/// 接尾辞予測テーブル
///
/// 辞書に生成されたすべての表層形の末尾1〜N文字を、その形が属する
/// `(パラダイムID, スロット番号)`と出現回数に対応付けたテーブルです。
/// 未知語の接尾辞ベース推測で使用されます。
#[derive(Archive, Serialize, Deserialize)]
pub struct PredictionSuffixes {
    trie: Trie,
    data: Vec<u32>,
    totals: Vec<u32>,
}

/// 接尾辞予測で考慮する末尾文字数の上限
pub(crate) const MAX_SUFFIX_LEN: usize = 5;

impl PredictionSuffixes {
    /// 接尾辞に対応する`(値, 出現回数)`のイテレータを取得します。
    pub(crate) fn lookup(&'_ self, suffix: &str) -> Option<impl Iterator<Item = (u32, u32)> + '_> {
        let offset = self.trie.find(suffix)? as usize;
        let len = self.data[offset] as usize;
        let pairs = &self.data[offset + 1..offset + 1 + 2 * len];
        Some(pairs.chunks_exact(2).map(|p| (p[0], p[1])))
    }

    /// 指定された接尾辞長の総観測数を取得します。
    pub(crate) fn total_for_len(&self, len: usize) -> u32 {
        self.totals.get(len).copied().unwrap_or(0)
    }
}

/// 接尾辞予測テーブルを構築するビルダー
#[derive(Default)]
pub(crate) struct PredictionSuffixesBuilder {
    map: BTreeMap<String, BTreeMap<u32, u32>>,
    totals: Vec<u32>,
}

impl PredictionSuffixesBuilder {
    pub(crate) fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            totals: vec![0; MAX_SUFFIX_LEN + 1],
        }
    }

    /// 表層形の末尾1〜N文字を観測として追加します。
    pub(crate) fn observe(&mut self, word: &str, value: u32) {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() < 2 {
            return;
        }
        let max = MAX_SUFFIX_LEN.min(chars.len() - 1);
        for n in 1..=max {
            let suffix: String = chars[chars.len() - n..].iter().collect();
            *self.map.entry(suffix).or_default().entry(value).or_insert(0) += 1;
            self.totals[n] += 1;
        }
    }

    pub(crate) fn build(self) -> Result<PredictionSuffixes> {
        let mut trie = TrieBuilder::new();
        let mut data = vec![];
        for (suffix, entries) in self.map {
            let offset = u32::try_from(data.len())?;
            data.push(u32::try_from(entries.len())?);
            for (value, count) in entries {
                data.push(value);
                data.push(count);
            }
            trie.insert(&suffix, offset);
        }
        Ok(PredictionSuffixes {
            trie: trie.build(),
            data,
            totals: self.totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> WordMap {
        let mut b = WordMapBuilder::new();
        b.add_record("ёлка".to_string(), 10);
        b.add_record("ёлка".to_string(), 11);
        b.add_record("елей".to_string(), 20);
        b.add_record("кот".to_string(), 30);
        b.build().unwrap()
    }

    #[test]
    fn test_contains_is_strict() {
        let map = sample_map();
        assert!(map.contains("ёлка"));
        assert!(!map.contains("елка"));
    }

    #[test]
    fn test_similar_items_applies_rules() {
        let map = sample_map();
        let items = map.similar_items("елка", &SubstitutionRules::yo());
        assert_eq!(items, vec![("ёлка".to_string(), vec![10, 11])]);
        let values = map.similar_item_values("елка", &SubstitutionRules::yo());
        assert_eq!(values, vec![vec![10, 11]]);
        assert_eq!(
            map.similar_keys("елка", &SubstitutionRules::yo()),
            vec!["ёлка".to_string()]
        );
    }

    #[test]
    fn test_similar_items_without_rules() {
        let map = sample_map();
        assert!(map
            .similar_items("елка", &SubstitutionRules::default())
            .is_empty());
        let items = map.similar_items("елей", &SubstitutionRules::yo());
        assert_eq!(items, vec![("елей".to_string(), vec![20])]);
    }

    #[test]
    fn test_iter_repeats_homonyms() {
        let map = sample_map();
        let all: Vec<_> = map.iter("").collect();
        assert_eq!(
            all,
            vec![
                ("елей".to_string(), 20),
                ("кот".to_string(), 30),
                ("ёлка".to_string(), 10),
                ("ёлка".to_string(), 11),
            ]
        );
    }

    #[test]
    fn test_prediction_suffixes() {
        let mut b = PredictionSuffixesBuilder::new();
        b.observe("книга", 1);
        b.observe("книги", 2);
        let table = b.build().unwrap();
        let hits: Vec<_> = table.lookup("нига").unwrap().collect();
        assert_eq!(hits, vec![(1, 1)]);
        assert_eq!(table.total_for_len(4), 2);
        assert!(table.lookup("зга").is_none());
    }
}
