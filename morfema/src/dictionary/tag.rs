//! 文法タグテーブル
//!
//! このモジュールは、小さな整数IDから文法タグへのカタログと、
//! グラメーム（文法素性）の圏構造を管理します。圏構造は屈折時の
//! グラメーム上書き計算（同じ圏のグラメームは置換、それ以外は保持）に
//! 使用されます。

use hashbrown::{HashMap, HashSet};
use rkyv::{Archive, Deserialize, Serialize};

use crate::parse::TagId;

/// グラメーム階層の1エントリ
///
/// `parent`が空文字列の場合はルートグラメームです。
/// 同じ親を持つグラメーム同士は互いに排他（同じ圏）とみなされます。
#[derive(Archive, Serialize, Deserialize, Clone, Debug)]
pub struct GrammemeLink {
    pub name: String,
    pub parent: String,
}

/// 文法タグ
///
/// 生のテキスト形式（表示・ラウンドトリップ用）と、
/// そこから展開されたグラメーム集合を保持する不変の値です。
#[derive(Clone, Debug)]
pub struct Tag {
    raw: String,
    grammemes: HashSet<String>,
}

/// 生産的でない語類を示すグラメーム
///
/// 接辞ベースの推測ユニットは、これらを含むタグの候補を除外します。
const NON_PRODUCTIVE: &[&str] = &[
    "NUMR", "NPRO", "PRED", "PREP", "CONJ", "PRCL", "INTJ", "Apro",
];

impl Tag {
    /// 生のテキスト形式からタグを作成します。
    ///
    /// グラメームはカンマと空白で区切られます
    /// （例: `"NOUN,inan femn sing,nomn"`）。
    pub(crate) fn from_raw(raw: &str) -> Self {
        let grammemes = raw
            .split([',', ' '])
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            raw: raw.to_string(),
            grammemes,
        }
    }

    /// 生のテキスト形式を取得します。
    #[inline(always)]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// グラメーム集合を取得します。
    #[inline(always)]
    pub fn grammemes(&self) -> &HashSet<String> {
        &self.grammemes
    }

    /// 指定されたグラメームを含むかを判定します。
    #[inline(always)]
    pub fn contains(&self, grammeme: &str) -> bool {
        self.grammemes.contains(grammeme)
    }

    /// 指定されたグラメーム集合をすべて含むかを判定します。
    pub fn contains_all<'a, I>(&self, grammemes: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        grammemes.into_iter().all(|g| self.grammemes.contains(g))
    }

    /// このタグが生産的な語類に属するかを判定します。
    pub fn is_productive(&self) -> bool {
        !NON_PRODUCTIVE.iter().any(|g| self.grammemes.contains(*g))
    }
}

/// タグIDから[`Tag`]への不変のカタログ
///
/// 辞書のロード時に一度だけ構築され、以後は読み取り専用です。
pub struct TagSet {
    tags: Vec<Tag>,
    categories: HashMap<String, u32>,
}

impl TagSet {
    /// 生のタグ文字列テーブルとグラメーム階層からカタログを構築します。
    pub(crate) fn from_tables(gramtab: &[String], links: &[GrammemeLink]) -> Self {
        let mut parent_ids: HashMap<&str, u32> = HashMap::new();
        let mut categories = HashMap::new();
        for link in links {
            if link.parent.is_empty() {
                continue;
            }
            let next = parent_ids.len() as u32;
            let id = *parent_ids.entry(link.parent.as_str()).or_insert(next);
            categories.insert(link.name.clone(), id);
        }
        Self {
            tags: gramtab.iter().map(|raw| Tag::from_raw(raw)).collect(),
            categories,
        }
    }

    /// タグの数を取得します。
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// 指定されたIDのタグを取得します。
    #[inline(always)]
    pub fn get(&self, id: TagId) -> &Tag {
        &self.tags[id as usize]
    }

    /// 生のテキスト形式が一致するタグのIDを検索します。
    pub fn find(&self, raw: &str) -> Option<TagId> {
        self.tags
            .iter()
            .position(|t| t.raw() == raw)
            .map(|i| i as TagId)
    }

    /// 要求されたグラメームを上書きとして適用した新しい集合を計算します。
    ///
    /// タグのグラメームのうち、要求されたグラメームと同じ圏に属するものは
    /// 置き換えられ、それ以外は保持されます。圏が不明な要求グラメームは
    /// 何も置き換えずに追加されます。屈折の際に、指定されなかった圏を
    /// 保ったまま目的の形へ誘導するために使用されます。
    pub fn updated_grammemes(
        &self,
        tag: &Tag,
        required: &HashSet<String>,
    ) -> HashSet<String> {
        let displaced: HashSet<u32> = required
            .iter()
            .filter_map(|g| self.categories.get(g))
            .copied()
            .collect();
        let mut updated: HashSet<String> = tag
            .grammemes()
            .iter()
            .filter(|g| match self.categories.get(*g) {
                Some(category) => !displaced.contains(category),
                None => true,
            })
            .cloned()
            .collect();
        updated.extend(required.iter().cloned());
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> Vec<GrammemeLink> {
        [
            ("POST", ""),
            ("NOUN", "POST"),
            ("ADJF", "POST"),
            ("NMbr", ""),
            ("sing", "NMbr"),
            ("plur", "NMbr"),
            ("CAse", ""),
            ("nomn", "CAse"),
            ("gent", "CAse"),
        ]
        .iter()
        .map(|&(name, parent)| GrammemeLink {
            name: name.to_string(),
            parent: parent.to_string(),
        })
        .collect()
    }

    fn sample() -> TagSet {
        TagSet::from_tables(
            &[
                "NOUN,inan femn sing,nomn".to_string(),
                "NOUN,inan femn plur,nomn".to_string(),
                "PNCT".to_string(),
            ],
            &links(),
        )
    }

    #[test]
    fn test_from_raw_splits_grammemes() {
        let tag = Tag::from_raw("NOUN,inan femn sing,nomn");
        assert!(tag.contains("NOUN"));
        assert!(tag.contains("sing"));
        assert!(tag.contains("nomn"));
        assert_eq!(tag.grammemes().len(), 5);
        assert_eq!(tag.raw(), "NOUN,inan femn sing,nomn");
    }

    #[test]
    fn test_find() {
        let set = sample();
        assert_eq!(set.find("PNCT"), Some(2));
        assert_eq!(set.find("LATN"), None);
    }

    #[test]
    fn test_updated_grammemes_replaces_same_category() {
        let set = sample();
        let tag = set.get(0);
        let required: HashSet<String> = ["plur".to_string()].into_iter().collect();
        let updated = set.updated_grammemes(tag, &required);
        assert!(updated.contains("plur"));
        assert!(!updated.contains("sing"));
        assert!(updated.contains("nomn"));
        assert!(updated.contains("NOUN"));
    }

    #[test]
    fn test_updated_grammemes_unknown_category_is_added() {
        let set = sample();
        let tag = set.get(0);
        let required: HashSet<String> = ["Geox".to_string()].into_iter().collect();
        let updated = set.updated_grammemes(tag, &required);
        assert!(updated.contains("Geox"));
        assert!(updated.contains("sing"));
    }

    #[test]
    fn test_is_productive() {
        assert!(Tag::from_raw("NOUN,inan femn sing,nomn").is_productive());
        assert!(!Tag::from_raw("PREP").is_productive());
        assert!(!Tag::from_raw("NPRO,1per sing,nomn").is_productive());
    }
}
