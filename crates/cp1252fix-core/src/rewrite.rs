//! 字节替换与结果落盘
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use aho_corasick::AhoCorasick;

use crate::bytemap::ByteMap;

/// 替换策略
/// - Chained：按映射表顺序逐条做全局替换，后一轮作用于前一轮的输出（历史行为）。
///   替换序列中含有其他键的字节时会被再次替换，例如 `€`（E2 82 AC）中的 0x82。
/// - Simultaneous：单遍同时替换，只作用于原始字节位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceStrategy {
    #[default]
    Chained,
    Simultaneous,
}

/// 改写结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: Vec<u8>,
    pub total_replacements: usize,
}

/// 整段内容中某字节的出现次数
pub fn count_occurrences(content: &[u8], byte: u8) -> usize {
    memchr::memchr_iter(byte, content).count()
}

/// 将 `buf` 中所有 `byte` 替换为 `replacement`，返回替换次数；无命中时不改动缓冲区
pub fn replace_byte(buf: &mut Vec<u8>, byte: u8, replacement: &[u8]) -> usize {
    let count = count_occurrences(buf.as_slice(), byte);
    if count == 0 {
        return 0;
    }
    let mut out = Vec::with_capacity(buf.len() + count * replacement.len().saturating_sub(1));
    let mut last = 0usize;
    for pos in memchr::memchr_iter(byte, buf.as_slice()) {
        out.extend_from_slice(&buf[last..pos]);
        out.extend_from_slice(replacement);
        last = pos + 1;
    }
    out.extend_from_slice(&buf[last..]);
    *buf = out;
    count
}

/// 按映射表改写内容（可复用于多个文件）
pub struct Rewriter {
    map: ByteMap,
    /// 仅 Simultaneous 策略需要；None 表示逐轮替换
    ac: Option<AhoCorasick>,
}

impl Rewriter {
    pub fn new(map: &ByteMap, strategy: ReplaceStrategy) -> Result<Self> {
        let ac = match strategy {
            ReplaceStrategy::Chained => None,
            ReplaceStrategy::Simultaneous => {
                Some(AhoCorasick::new(map.keys().map(|k| [k])).context("build byte automaton")?)
            }
        };
        Ok(Self { map: map.clone(), ac })
    }

    pub fn rewrite(&self, content: Vec<u8>) -> Rewrite {
        match &self.ac {
            None => self.rewrite_chained(content),
            Some(ac) => self.rewrite_simultaneous(ac, content),
        }
    }

    fn rewrite_chained(&self, mut content: Vec<u8>) -> Rewrite {
        let mut total = 0usize;
        for e in self.map.entries() {
            total += replace_byte(&mut content, e.source, e.replacement.as_bytes());
        }
        Rewrite { content, total_replacements: total }
    }

    fn rewrite_simultaneous(&self, ac: &AhoCorasick, content: Vec<u8>) -> Rewrite {
        let total = ac.find_iter(content.as_slice()).count();
        if total == 0 {
            return Rewrite { content, total_replacements: 0 };
        }
        let replacements: Vec<&[u8]> = self.map.entries().iter().map(|e| e.replacement.as_bytes()).collect();
        let content = ac.replace_all_bytes(&content, replacements.as_slice());
        Rewrite { content, total_replacements: total }
    }
}

/// 计算输出路径：无后缀时覆盖原文件；否则为 `{stem}{suffix}{.ext}`。
///
/// 扩展名取最后一个 `.` 之后的部分；没有扩展名时后缀直接追加在文件名末尾。
pub fn derive_output_path(path: &Path, suffix: Option<&str>) -> PathBuf {
    let suffix = match suffix {
        Some(s) if !s.is_empty() => s,
        _ => return path.to_path_buf(),
    };
    let mut name = OsString::from(path.file_stem().unwrap_or_default());
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// 整体写出改写后的内容
pub fn persist(path: &Path, content: &[u8]) -> io::Result<()> {
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytemap::QuoteStyle;

    const TARGETS: [u8; 25] = [
        0x80, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x8B, 0x8C, 0x91, 0x92, 0x93, 0x94, 0x95, 0x96,
        0x97, 0x98, 0x99, 0x9A, 0x9B, 0x9C, 0x9F,
    ];

    fn rewriter(strategy: ReplaceStrategy) -> Rewriter {
        Rewriter::new(&ByteMap::default(), strategy).unwrap()
    }

    #[test]
    fn absent_byte_counts_zero_and_replace_is_noop() {
        let haystacks: [&[u8]; 5] = [
            b"",
            b"plain ascii only, nothing high\n",
            b"plain text \x81 with \x9D undefined bytes",
            // UTF-8 的延续字节（0x80..0xBF）不是独立的 CP1252 字节
            "\u{20AC} \u{2019} \u{201C} \u{2122} caf\u{e9}".as_bytes(),
            "\u{0160}\u{0152}\u{0178}\u{2030}".as_bytes(),
        ];
        for s in haystacks {
            for b in TARGETS.iter().copied().filter(|b| !s.contains(b)) {
                assert_eq!(count_occurrences(s, b), 0);
                let mut buf = s.to_vec();
                assert_eq!(replace_byte(&mut buf, b, b"X"), 0, "0x{b:02X}");
                assert_eq!(buf, s);
            }
        }
    }

    #[test]
    fn continuation_bytes_of_valid_utf8_are_still_counted_as_raw_bytes() {
        // € = E2 82 AC：0x82 以原始字节出现，count 如实计数
        let euro = "\u{20AC}".as_bytes();
        assert_eq!(count_occurrences(euro, 0x82), 1);
        assert_eq!(count_occurrences(euro, 0x80), 0);
    }

    #[test]
    fn chained_rewriter_builds_no_automaton() {
        assert!(rewriter(ReplaceStrategy::Chained).ac.is_none());
        assert!(rewriter(ReplaceStrategy::Simultaneous).ac.is_some());
    }

    #[test]
    fn replaces_and_sums_counts() {
        let input = b"It\x92s \x93quoted\x94 and don\x92t".to_vec();
        assert_eq!(count_occurrences(&input, 0x92), 2);
        assert_eq!(count_occurrences(&input, 0x93), 1);

        let out = rewriter(ReplaceStrategy::Chained).rewrite(input);
        assert_eq!(out.total_replacements, 4);
        assert_eq!(out.content, b"It's \"quoted\" and don't".to_vec());
        assert_eq!(count_occurrences(&out.content, 0x92), 0);
        assert_eq!(count_occurrences(&out.content, 0x93), 0);
    }

    #[test]
    fn scan_counts_match_rewrite_total() {
        let input = b"a\x92b\x92c\x93".to_vec();
        let scan = crate::scan::Scanner::new(&ByteMap::default()).unwrap().scan(&input);
        assert_eq!(scan.occurrences(0x92), 2);
        assert_eq!(scan.occurrences(0x93), 1);

        let out = rewriter(ReplaceStrategy::Chained).rewrite(input);
        assert_eq!(out.total_replacements, 3);
        assert_eq!(count_occurrences(&out.content, 0x92), 0);
        assert_eq!(count_occurrences(&out.content, 0x93), 0);
    }

    #[test]
    fn rewrite_is_idempotent_on_clean_input() {
        let clean = b"nothing to see here\n".to_vec();
        for strategy in [ReplaceStrategy::Chained, ReplaceStrategy::Simultaneous] {
            let out = rewriter(strategy).rewrite(clean.clone());
            assert_eq!(out.total_replacements, 0);
            assert_eq!(out.content, clean);
        }
    }

    #[test]
    fn chained_passes_reprocess_earlier_replacements() {
        // 0x80 → E2 82 AC；0x82 这一轮替换其中的 0x82 → E2 E2 80 9A AC；
        // 0x9A 这一轮再替换 0x9A → E2 E2 80 C5 A1 AC
        let out = rewriter(ReplaceStrategy::Chained).rewrite(vec![0x80]);
        assert_eq!(out.total_replacements, 3);
        assert_eq!(out.content, vec![0xE2, 0xE2, 0x80, 0xC5, 0xA1, 0xAC]);
    }

    #[test]
    fn simultaneous_pass_maps_original_positions_only() {
        let input = vec![0x80, b' ', 0x8C, b' ', 0x98, b' ', 0x82];
        let out = rewriter(ReplaceStrategy::Simultaneous).rewrite(input);
        assert_eq!(out.total_replacements, 4);
        assert_eq!(String::from_utf8(out.content).unwrap(), "\u{20AC} \u{0152} \u{02DC} \u{201A}");
    }

    #[test]
    fn strategies_agree_on_quotes() {
        let input = b"\x91a\x92 \x93b\x94 \x96 \x85".to_vec();
        let a = rewriter(ReplaceStrategy::Chained).rewrite(input.clone());
        let b = rewriter(ReplaceStrategy::Simultaneous).rewrite(input);
        assert_eq!(a, b);
        assert_eq!(String::from_utf8(a.content).unwrap(), "'a' \"b\" \u{2013} \u{2026}");
    }

    #[test]
    fn curly_quote_map() {
        let map = ByteMap::cp1252(QuoteStyle::Curly);
        let out = Rewriter::new(&map, ReplaceStrategy::Simultaneous).unwrap().rewrite(b"\x93hi\x94 it\x92s".to_vec());
        assert_eq!(String::from_utf8(out.content).unwrap(), "\u{201C}hi\u{201D} it\u{2019}s");
    }

    #[test]
    fn output_path_with_suffix() {
        assert_eq!(derive_output_path(Path::new("a/b.txt"), Some("_utf8")), PathBuf::from("a/b_utf8.txt"));
        assert_eq!(derive_output_path(Path::new("a/b.tar.gz"), Some("_x")), PathBuf::from("a/b.tar_x.gz"));
        assert_eq!(derive_output_path(Path::new("a/README"), Some("_utf8")), PathBuf::from("a/README_utf8"));
        assert_eq!(derive_output_path(Path::new(".bashrc"), Some("_utf8")), PathBuf::from(".bashrc_utf8"));
    }

    #[test]
    fn output_path_without_suffix_is_input() {
        assert_eq!(derive_output_path(Path::new("a/b.txt"), None), PathBuf::from("a/b.txt"));
        assert_eq!(derive_output_path(Path::new("a/b.txt"), Some("")), PathBuf::from("a/b.txt"));
    }
}
