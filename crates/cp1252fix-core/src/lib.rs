//! CP1252 智能标点扫描与转换核心库
//!
//! 设计要点：
//! - 只处理 CP1252 的 0x80–0x9F 标点区间，映射为对应的 UTF-8 序列；不是通用转码库。
//! - 先用文件前 4096 字节分类：含 NUL 视为二进制，完全合法的 UTF-8/ASCII 视为无需转换，两者均跳过。
//! - 预览模式只报告每个字节的出现次数与行号；改写模式整体替换后原地覆盖或写入带后缀的新文件。
//! - 单线程顺序处理，文件之间互不影响。

mod bytemap;
mod classify;
mod convert;
mod error;
mod options;
mod report;
mod rewrite;
mod scan;

pub use bytemap::{parse_byte_literal, ByteMap, ByteMapError, MapEntry, QuoteStyle, UNDEFINED_BYTES};
pub use classify::{classify, is_already_unicode, is_binary, read_prefix, FileClassification, PREFIX_LEN, PREFIX_TAIL};
pub use convert::{convert_path, walk_files, ConversionOutcome, Converter, FileOutcome};
pub use error::FileError;
pub use options::{ConvertOptions, ReportFormat, RunStats};
pub use report::{byte_label, format_conversion, format_findings};
pub use rewrite::{count_occurrences, derive_output_path, persist, replace_byte, ReplaceStrategy, Rewrite, Rewriter};
pub use scan::{ByteHits, ScanResult, Scanner};
