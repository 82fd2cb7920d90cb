//! 文件分类：二进制 / 已是 UTF-8（或 ASCII）/ 待转换候选
//!
//! 只看文件开头的固定长度前缀，先做零字节判定，再做 UTF-8 判定。
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// 分类所用前缀长度（字节）
pub const PREFIX_LEN: usize = 4096;

/// 额外多读的字节数，用来补齐在 `PREFIX_LEN` 处被切断的多字节字符（UTF-8 最长 4 字节）
pub const PREFIX_TAIL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClassification {
    /// 前缀中含有 NUL 字节
    Binary,
    /// 前缀是完全合法的 UTF-8（含纯 ASCII）
    AlreadyUnicode,
    /// 其余情况：需要扫描/改写
    Candidate,
}

impl FileClassification {
    pub fn is_candidate(self) -> bool {
        matches!(self, FileClassification::Candidate)
    }

    /// 用于报告输出的短标签
    pub fn label(self) -> &'static str {
        match self {
            FileClassification::Binary => "binary",
            FileClassification::AlreadyUnicode => "already unicode",
            FileClassification::Candidate => "candidate",
        }
    }
}

fn window(prefix: &[u8]) -> &[u8] {
    &prefix[..prefix.len().min(PREFIX_LEN)]
}

/// 前缀内只要出现一个 0x00 即视为二进制
pub fn is_binary(prefix: &[u8]) -> bool {
    memchr::memchr(0, window(prefix)).is_some()
}

/// 前 `PREFIX_LEN` 字节能完整通过 UTF-8 校验时返回 true（置信度满分）。
///
/// 校验范围延伸到 `PREFIX_TAIL` 个额外字节，跨越边界的字符由它们补齐；
/// 只要第一个非法/残缺位置落在 `PREFIX_LEN` 之后就算通过。
/// 夹带 CP1252 高位字节的文本一定无法通过校验，因此仍是候选。
pub fn is_already_unicode(prefix: &[u8]) -> bool {
    let w = &prefix[..prefix.len().min(PREFIX_LEN + PREFIX_TAIL)];
    match std::str::from_utf8(w) {
        Ok(_) => true,
        Err(e) => e.valid_up_to() >= PREFIX_LEN,
    }
}

/// 先判二进制（代价低，且避免把二进制送去做 UTF-8 判定）
pub fn classify(prefix: &[u8]) -> FileClassification {
    if is_binary(prefix) {
        FileClassification::Binary
    } else if is_already_unicode(prefix) {
        FileClassification::AlreadyUnicode
    } else {
        FileClassification::Candidate
    }
}

/// 读取文件开头至多 `PREFIX_LEN + PREFIX_TAIL` 字节
pub fn read_prefix(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(PREFIX_LEN + PREFIX_TAIL);
    file.take((PREFIX_LEN + PREFIX_TAIL) as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
