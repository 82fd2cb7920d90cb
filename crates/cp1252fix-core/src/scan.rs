//! 目标字节检测与行号归属
//!
//! 用映射表的全部键构建一个 Aho-Corasick 自动机，单遍扫描整个缓冲区：
//! - 出现次数：整段内容的命中总数（同一行重复出现会重复计数）；
//! - 行号列表：1 起始，按 `\n` 计数；同一行同一字节只记一次。
//! 两者在同一行重复出现时会不一致，这是预期行为。
use anyhow::{Context, Result};
use std::collections::BTreeMap;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::bytemap::ByteMap;

/// 单个字节值的命中情况
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteHits {
    /// 整段内容中的出现次数
    pub count: usize,
    /// 出现过该字节的行号（升序、去重）
    pub lines: Vec<usize>,
}

/// 单个文件的扫描结果；只包含至少命中一次的字节
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    hits: BTreeMap<u8, ByteHits>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn get(&self, byte: u8) -> Option<&ByteHits> {
        self.hits.get(&byte)
    }

    pub fn lines(&self, byte: u8) -> Option<&[usize]> {
        self.hits.get(&byte).map(|h| h.lines.as_slice())
    }

    pub fn occurrences(&self, byte: u8) -> usize {
        self.hits.get(&byte).map_or(0, |h| h.count)
    }

    pub fn total_occurrences(&self) -> usize {
        self.hits.values().map(|h| h.count).sum()
    }

    /// 按字节值升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (u8, &ByteHits)> {
        self.hits.iter().map(|(b, h)| (*b, h))
    }
}

/// 基于映射表键集合的扫描器（可复用于多个文件）
pub struct Scanner {
    ac: AhoCorasick,
    /// 自动机模式下标 → 字节值
    keys: Vec<u8>,
}

impl Scanner {
    pub fn new(map: &ByteMap) -> Result<Self> {
        let keys: Vec<u8> = map.keys().collect();
        let ac = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .build(keys.iter().map(|k| [*k]))
            .context("build byte automaton")?;
        Ok(Self { ac, keys })
    }

    pub fn scan(&self, content: &[u8]) -> ScanResult {
        let mut hits: BTreeMap<u8, ByteHits> = BTreeMap::new();
        let mut line = 1usize;
        let mut cursor = 0usize;

        for m in self.ac.find_iter(content) {
            let pos = m.start();
            line += memchr::memchr_iter(b'\n', &content[cursor..pos]).count();
            cursor = pos;

            let byte = self.keys[m.pattern().as_usize()];
            let entry = hits.entry(byte).or_default();
            entry.count += 1;
            // 行号单调递增，只需与末尾比较即可去重
            if entry.lines.last() != Some(&line) {
                entry.lines.push(line);
            }
        }

        ScanResult { hits }
    }
}
