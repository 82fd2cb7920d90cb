//! 转换选项与统计信息（模块）
use crate::bytemap::QuoteStyle;
use crate::rewrite::ReplaceStrategy;

/// 报告输出格式
/// - Text：每个文件一行可读文本（默认）。
/// - Json：每个文件一行 JSON 对象，便于脚本消费。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// 转换选项
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// 为 true 时改写文件；否则只报告
    pub write: bool,
    /// 打印 `Scanning: <path>` 与跳过提示
    pub debug: bool,
    /// 输出文件名后缀（插在扩展名之前）；None 表示原地覆盖
    pub suffix: Option<String>,
    pub format: ReportFormat,
    /// 替换策略；选择弯引号时会强制使用 Simultaneous
    pub strategy: ReplaceStrategy,
    pub quotes: QuoteStyle,
    /// 只处理这些字节；为空表示整张映射表
    pub only: Vec<u8>,
    /// 单文件 I/O 失败时记录并继续，而不是中止
    pub keep_going: bool,
}

/// 运行统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub files_visited: usize,
    pub files_skipped_binary: usize,
    pub files_skipped_unicode: usize,
    pub files_with_matches: usize,
    pub files_written: usize,
    pub total_occurrences: usize,
    pub total_replacements: usize,
    pub files_failed: usize,
}
