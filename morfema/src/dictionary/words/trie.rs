//! フラット配列トライによる文字列検索
//!
//! このモジュールは、語彙ストアの基盤となるトライ構造を提供します。
//! 通常の完全一致検索に加えて、置換規則を適用した近似一致検索と、
//! 辞書順の接頭辞列挙をサポートします。

use std::ops::Range;

use rkyv::{Archive, Deserialize, Serialize};

use crate::dictionary::words::SubstitutionRules;

/// フラット配列で表現されたトライ
///
/// ノード`i`の子エッジは`labels[edge_start[i]..edge_start[i+1]]`に
/// ラベル昇順で格納されます。`values[i]`は終端ノードの値に1を加えたもので、
/// 0は「値なし」を意味します。すべてのフィールドが`Vec<u32>`であるため、
/// rkyvアーカイブとの相性が良い構造です。
#[derive(Archive, Serialize, Deserialize)]
pub(crate) struct Trie {
    edge_start: Vec<u32>,
    labels: Vec<u32>,
    targets: Vec<u32>,
    values: Vec<u32>,
}

/// ルートノードのID
const ROOT: u32 = 0;

impl Trie {
    /// 指定されたノードの値を取得します。
    #[inline(always)]
    fn value(&self, node: u32) -> Option<u32> {
        let v = self.values[node as usize];
        if v == 0 {
            None
        } else {
            Some(v - 1)
        }
    }

    /// 指定されたノードの子エッジの範囲を取得します。
    #[inline(always)]
    fn edge_range(&self, node: u32) -> Range<usize> {
        let n = node as usize;
        self.edge_start[n] as usize..self.edge_start[n + 1] as usize
    }

    /// 指定された文字に対応する子ノードを取得します。
    #[inline(always)]
    fn child(&self, node: u32, c: char) -> Option<u32> {
        let range = self.edge_range(node);
        let labels = &self.labels[range.clone()];
        labels
            .binary_search(&(c as u32))
            .ok()
            .map(|i| self.targets[range.start + i])
    }

    /// 文字列をたどって到達するノードを取得します。
    fn descend(&self, word: &str) -> Option<u32> {
        let mut node = ROOT;
        for c in word.chars() {
            node = self.child(node, c)?;
        }
        Some(node)
    }

    /// 文字列に完全一致する終端の値を取得します。
    ///
    /// 置換規則は適用されません。
    pub(crate) fn find(&self, word: &str) -> Option<u32> {
        self.descend(word).and_then(|node| self.value(node))
    }

    /// 置換規則を適用して到達可能なすべての終端を取得します。
    ///
    /// 各位置で元の文字を先に試し、その後に置換候補を試すため、
    /// 未補正の綴り（存在する場合）が補正済みの綴りより先に並びます。
    ///
    /// # 戻り値
    ///
    /// `(補正済みの綴り, 値)`のペアのベクター
    pub(crate) fn similar_leaves(
        &self,
        word: &str,
        rules: &SubstitutionRules,
    ) -> Vec<(String, u32)> {
        let chars: Vec<char> = word.chars().collect();
        let mut out = vec![];
        let mut buf = String::with_capacity(word.len());
        self.similar_dfs(ROOT, &chars, rules, &mut buf, &mut out);
        out
    }

    fn similar_dfs(
        &self,
        node: u32,
        rest: &[char],
        rules: &SubstitutionRules,
        buf: &mut String,
        out: &mut Vec<(String, u32)>,
    ) {
        let Some((&c, rest)) = rest.split_first() else {
            if let Some(value) = self.value(node) {
                out.push((buf.clone(), value));
            }
            return;
        };
        if let Some(child) = self.child(node, c) {
            buf.push(c);
            self.similar_dfs(child, rest, rules, buf, out);
            buf.pop();
        }
        for alt in rules.alternatives(c) {
            if let Some(child) = self.child(node, alt) {
                buf.push(alt);
                self.similar_dfs(child, rest, rules, buf, out);
                buf.pop();
            }
        }
    }

    /// 接頭辞の下にあるすべての終端を辞書順で列挙するイテレータを取得します。
    ///
    /// 呼び出しごとに独立したイテレータが生成され、再開可能です。
    pub(crate) fn prefix_leaves<'a>(&'a self, prefix: &str) -> PrefixLeaves<'a> {
        match self.descend(prefix) {
            Some(node) => PrefixLeaves {
                trie: self,
                stack: vec![],
                chars: prefix.chars().collect(),
                pending: Some(node),
            },
            None => PrefixLeaves {
                trie: self,
                stack: vec![],
                chars: vec![],
                pending: None,
            },
        }
    }
}

/// 接頭辞配下の終端を辞書順で返すイテレータ
///
/// 明示的なスタックによる深さ優先探索で、遅延的に終端を生成します。
pub(crate) struct PrefixLeaves<'a> {
    trie: &'a Trie,
    stack: Vec<(u32, usize)>,
    chars: Vec<char>,
    pending: Option<u32>,
}

impl Iterator for PrefixLeaves<'_> {
    type Item = (String, u32);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.pending.take() {
                self.stack.push((node, 0));
                if let Some(value) = self.trie.value(node) {
                    return Some((self.chars.iter().collect(), value));
                }
                continue;
            }
            let &(node, cursor) = self.stack.last()?;
            let range = self.trie.edge_range(node);
            if range.start + cursor >= range.end {
                self.stack.pop();
                if !self.stack.is_empty() {
                    self.chars.pop();
                }
                continue;
            }
            if let Some(frame) = self.stack.last_mut() {
                frame.1 += 1;
            }
            let edge = range.start + cursor;
            let label = char::from_u32(self.trie.labels[edge])
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            self.chars.push(label);
            self.pending = Some(self.trie.targets[edge]);
        }
    }
}

/// トライを構築するビルダー
///
/// 挿入順は任意で、`build`時に子エッジがラベル順に整列されます。
#[derive(Default)]
pub(crate) struct TrieBuilder {
    children: Vec<Vec<(u32, u32)>>,
    values: Vec<u32>,
}

impl TrieBuilder {
    pub(crate) fn new() -> Self {
        Self {
            children: vec![vec![]],
            values: vec![0],
        }
    }

    /// 文字列と値を登録します。同じ文字列の値は上書きされます。
    pub(crate) fn insert(&mut self, word: &str, value: u32) {
        let mut node = 0usize;
        for c in word.chars() {
            let code = c as u32;
            let found = self.children[node]
                .iter()
                .find(|&&(label, _)| label == code)
                .map(|&(_, target)| target);
            node = match found {
                Some(target) => target as usize,
                None => {
                    let id = self.children.len();
                    self.children.push(vec![]);
                    self.values.push(0);
                    self.children[node].push((code, id as u32));
                    id
                }
            };
        }
        self.values[node] = value + 1;
    }

    /// トライを構築します。
    pub(crate) fn build(mut self) -> Trie {
        let num_edges: usize = self.children.iter().map(Vec::len).sum();
        let mut edge_start = Vec::with_capacity(self.children.len() + 1);
        let mut labels = Vec::with_capacity(num_edges);
        let mut targets = Vec::with_capacity(num_edges);
        edge_start.push(0);
        for edges in &mut self.children {
            edges.sort_unstable_by_key(|&(label, _)| label);
            for &(label, target) in edges.iter() {
                labels.push(label);
                targets.push(target);
            }
            edge_start.push(labels.len() as u32);
        }
        Trie {
            edge_start,
            labels,
            targets,
            values: self.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(words: &[(&str, u32)]) -> Trie {
        let mut b = TrieBuilder::new();
        for &(w, v) in words {
            b.insert(w, v);
        }
        b.build()
    }

    #[test]
    fn test_find_exact() {
        let trie = build(&[("кот", 0), ("коты", 1), ("код", 2)]);
        assert_eq!(trie.find("кот"), Some(0));
        assert_eq!(trie.find("коты"), Some(1));
        assert_eq!(trie.find("код"), Some(2));
        assert_eq!(trie.find("ко"), None);
        assert_eq!(trie.find("котик"), None);
    }

    #[test]
    fn test_find_does_not_substitute() {
        let trie = build(&[("ёлка", 0)]);
        let rules = SubstitutionRules::from_pairs([('е', 'ё')]);
        assert_eq!(trie.find("елка"), None);
        assert_eq!(trie.similar_leaves("елка", &rules).len(), 1);
    }

    #[test]
    fn test_similar_exact_spelling_first() {
        let trie = build(&[("елка", 0), ("ёлка", 1)]);
        let rules = SubstitutionRules::from_pairs([('е', 'ё')]);
        let leaves = trie.similar_leaves("елка", &rules);
        assert_eq!(
            leaves,
            vec![("елка".to_string(), 0), ("ёлка".to_string(), 1)]
        );
    }

    #[test]
    fn test_prefix_leaves_order() {
        let trie = build(&[("код", 2), ("кот", 0), ("коты", 1), ("лес", 3)]);
        let all: Vec<_> = trie.prefix_leaves("").collect();
        assert_eq!(
            all,
            vec![
                ("код".to_string(), 2),
                ("кот".to_string(), 0),
                ("коты".to_string(), 1),
                ("лес".to_string(), 3),
            ]
        );
        let kot: Vec<_> = trie.prefix_leaves("кот").collect();
        assert_eq!(
            kot,
            vec![("кот".to_string(), 0), ("коты".to_string(), 1)]
        );
        assert!(trie.prefix_leaves("мёд").next().is_none());
    }
}
