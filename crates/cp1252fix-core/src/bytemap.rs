//! CP1252 高位标点字节（0x80–0x9F）到 UTF-8 替换序列的映射表
use thiserror::Error;

/// 0x91–0x94 的映射风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    /// 映射为 ASCII `'` 与 `"`（历史行为）
    #[default]
    Plain,
    /// 映射为 U+2018/U+2019/U+201C/U+201D
    Curly,
}

/// 映射表相关错误（主要来自命令行 `--only` 参数）
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ByteMapError {
    #[error("invalid byte literal `{0}` (expected hex such as 0x92)")]
    InvalidLiteral(String),
    #[error("byte 0x{0:02X} is outside the 0x80-0x9F range")]
    OutOfRange(u8),
    #[error("byte 0x{0:02X} is undefined in CP1252")]
    Undefined(u8),
}

/// 单条映射：源字节 → UTF-8 替换序列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub source: u8,
    pub replacement: &'static str,
}

/// CP1252 未定义的字节，永不匹配
pub const UNDEFINED_BYTES: [u8; 7] = [0x81, 0x8D, 0x8E, 0x8F, 0x90, 0x9D, 0x9E];

const fn entry(source: u8, replacement: &'static str) -> MapEntry {
    MapEntry { source, replacement }
}

/// 完整映射（按字节升序；该顺序即改写时的替换顺序）
const CP1252_PUNCTUATION: [MapEntry; 25] = [
    entry(0x80, "\u{20AC}"), // €
    entry(0x82, "\u{201A}"), // ‚
    entry(0x83, "\u{0192}"), // ƒ
    entry(0x84, "\u{201E}"), // „
    entry(0x85, "\u{2026}"), // …
    entry(0x86, "\u{2020}"), // †
    entry(0x87, "\u{2021}"), // ‡
    entry(0x88, "\u{02C6}"), // ˆ
    entry(0x89, "\u{2030}"), // ‰
    entry(0x8A, "\u{0160}"), // Š
    entry(0x8B, "\u{2039}"), // ‹
    entry(0x8C, "\u{0152}"), // Œ
    entry(0x91, "'"),
    entry(0x92, "'"),
    entry(0x93, "\""),
    entry(0x94, "\""),
    entry(0x95, "\u{2022}"), // •
    entry(0x96, "\u{2013}"), // –
    entry(0x97, "\u{2014}"), // —
    entry(0x98, "\u{02DC}"), // ˜
    entry(0x99, "\u{2122}"), // ™
    entry(0x9A, "\u{0161}"), // š
    entry(0x9B, "\u{203A}"), // ›
    entry(0x9C, "\u{0153}"), // œ
    entry(0x9F, "\u{0178}"), // Ÿ
];

const CURLY_QUOTES: [MapEntry; 4] = [
    entry(0x91, "\u{2018}"),
    entry(0x92, "\u{2019}"),
    entry(0x93, "\u{201C}"),
    entry(0x94, "\u{201D}"),
];

/// 有序、不可变的字节映射表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteMap {
    entries: Vec<MapEntry>,
}

impl ByteMap {
    /// 构建完整的 CP1252 标点映射
    pub fn cp1252(quotes: QuoteStyle) -> Self {
        let entries = CP1252_PUNCTUATION
            .iter()
            .map(|e| match quotes {
                QuoteStyle::Plain => *e,
                QuoteStyle::Curly => CURLY_QUOTES
                    .iter()
                    .find(|q| q.source == e.source)
                    .copied()
                    .unwrap_or(*e),
            })
            .collect();
        Self { entries }
    }

    /// 仅保留 `keys` 中列出的条目（保持原有顺序）；`keys` 为空时返回完整副本。
    ///
    /// `restricted_to(&[0x92])` 即旧版只处理 0x92 的转换器。
    pub fn restricted_to(&self, keys: &[u8]) -> Result<Self, ByteMapError> {
        if keys.is_empty() {
            return Ok(self.clone());
        }
        for &k in keys {
            validate_key(k)?;
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| keys.contains(&e.source))
            .copied()
            .collect();
        Ok(Self { entries })
    }

    pub fn lookup(&self, byte: u8) -> Option<&'static str> {
        self.entries.iter().find(|e| e.source == byte).map(|e| e.replacement)
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.iter().map(|e| e.source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ByteMap {
    fn default() -> Self {
        Self::cp1252(QuoteStyle::Plain)
    }
}

fn validate_key(byte: u8) -> Result<(), ByteMapError> {
    if !(0x80..=0x9F).contains(&byte) {
        return Err(ByteMapError::OutOfRange(byte));
    }
    if UNDEFINED_BYTES.contains(&byte) {
        return Err(ByteMapError::Undefined(byte));
    }
    Ok(())
}

/// 解析命令行中的字节字面量：`0x92`、`0X92`、`\x92` 或裸十六进制 `92`
pub fn parse_byte_literal(s: &str) -> Result<u8, ByteMapError> {
    let t = s.trim();
    let hex = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .or_else(|| t.strip_prefix("\\x"))
        .unwrap_or(t);
    let byte = u8::from_str_radix(hex, 16).map_err(|_| ByteMapError::InvalidLiteral(s.to_string()))?;
    validate_key(byte)?;
    Ok(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_unique_keys_in_range() {
        let map = ByteMap::default();
        assert_eq!(map.len(), 25);
        let keys: Vec<u8> = map.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(keys, sorted, "keys must be unique and ascending");
        assert!(keys.iter().all(|k| (0x80..=0x9F).contains(k)));
    }

    #[test]
    fn undefined_bytes_are_not_mapped() {
        let map = ByteMap::default();
        for b in UNDEFINED_BYTES {
            assert_eq!(map.lookup(b), None, "0x{b:02X}");
        }
        assert_eq!(map.lookup(b'a'), None);
        assert_eq!(map.lookup(0xA0), None);
    }

    #[test]
    fn plain_quotes_by_default() {
        let map = ByteMap::default();
        assert_eq!(map.lookup(0x91), Some("'"));
        assert_eq!(map.lookup(0x92), Some("'"));
        assert_eq!(map.lookup(0x93), Some("\""));
        assert_eq!(map.lookup(0x94), Some("\""));
        assert_eq!(map.lookup(0x80), Some("€"));
        assert_eq!(map.lookup(0x99), Some("™"));
    }

    #[test]
    fn curly_quotes_only_touch_quote_bytes() {
        let plain = ByteMap::cp1252(QuoteStyle::Plain);
        let curly = ByteMap::cp1252(QuoteStyle::Curly);
        assert_eq!(curly.lookup(0x92), Some("\u{2019}"));
        assert_eq!(curly.lookup(0x93), Some("\u{201C}"));
        for e in plain.entries().iter().filter(|e| !(0x91..=0x94).contains(&e.source)) {
            assert_eq!(curly.lookup(e.source), Some(e.replacement));
        }
    }

    #[test]
    fn restricted_map_keeps_only_requested_keys() {
        let legacy = ByteMap::default().restricted_to(&[0x92]).unwrap();
        assert_eq!(legacy.len(), 1);
        assert_eq!(legacy.lookup(0x92), Some("'"));
        assert_eq!(legacy.lookup(0x93), None);

        let full = ByteMap::default().restricted_to(&[]).unwrap();
        assert_eq!(full, ByteMap::default());
    }

    #[test]
    fn restricted_map_rejects_unknown_keys() {
        let map = ByteMap::default();
        assert_eq!(map.restricted_to(&[0x8D]), Err(ByteMapError::Undefined(0x8D)));
        assert_eq!(map.restricted_to(&[0x41]), Err(ByteMapError::OutOfRange(0x41)));
    }

    #[test]
    fn parses_byte_literals() {
        assert_eq!(parse_byte_literal("0x92"), Ok(0x92));
        assert_eq!(parse_byte_literal("0X9f"), Ok(0x9F));
        assert_eq!(parse_byte_literal("\\x80"), Ok(0x80));
        assert_eq!(parse_byte_literal("93"), Ok(0x93));
        assert_eq!(parse_byte_literal("0x90"), Err(ByteMapError::Undefined(0x90)));
        assert_eq!(parse_byte_literal("0x41"), Err(ByteMapError::OutOfRange(0x41)));
        assert!(matches!(parse_byte_literal("zz"), Err(ByteMapError::InvalidLiteral(_))));
    }
}
