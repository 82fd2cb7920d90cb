//! 报告输出（文本 / JSON 行）
//!
//! 文本格式（稳定，供脚本解析）：
//! - 预览：`Found in <path>: 0x92 x2 (lines 1, 3); 0x93 x1 (line 2)`
//! - 改写：`Converted: <path> (<n> replacements)` 或 `Converted: <path> -> <new> (<n> replacements)`
//! - 调试：`Scanning: <path>`、`Skipped (binary): <path>`
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use crate::classify::FileClassification;
use crate::convert::ConversionOutcome;
use crate::options::ReportFormat;
use crate::scan::ScanResult;

/// 预览模式下单个字节的输出项
#[derive(Debug, Clone, Serialize)]
pub struct MatchItem<'a> {
    pub byte: String,
    pub count: usize,
    pub lines: &'a [usize],
}

/// 预览模式下单个文件的输出项
#[derive(Debug, Clone, Serialize)]
pub struct FindingsItem<'a> {
    pub path: String,
    pub matches: Vec<MatchItem<'a>>,
}

/// 改写模式下单个文件的输出项
#[derive(Debug, Clone, Serialize)]
pub struct ConversionItem {
    pub path: String,
    pub output: String,
    pub replacements: usize,
}

pub fn byte_label(byte: u8) -> String {
    format!("0x{byte:02X}")
}

/// 生成预览模式的文本行（不含换行符）
pub fn format_findings(path: &Path, result: &ScanResult) -> String {
    let parts: Vec<String> = result
        .iter()
        .map(|(byte, hits)| {
            let noun = if hits.lines.len() == 1 { "line" } else { "lines" };
            let lines: Vec<String> = hits.lines.iter().map(|l| l.to_string()).collect();
            format!("{} x{} ({} {})", byte_label(byte), hits.count, noun, lines.join(", "))
        })
        .collect();
    format!("Found in {}: {}", path.display(), parts.join("; "))
}

/// 生成改写模式的文本行（不含换行符）
pub fn format_conversion(path: &Path, outcome: &ConversionOutcome) -> String {
    if outcome.output_path == path {
        format!("Converted: {} ({} replacements)", path.display(), outcome.total_replacements)
    } else {
        format!(
            "Converted: {} -> {} ({} replacements)",
            path.display(),
            outcome.output_path.display(),
            outcome.total_replacements
        )
    }
}

/// 报告写出器，包装任意 `Write`
pub(crate) struct Reporter<'a> {
    out: &'a mut dyn Write,
    format: ReportFormat,
    debug: bool,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(out: &'a mut dyn Write, format: ReportFormat, debug: bool) -> Self {
        Self { out, format, debug }
    }

    pub(crate) fn scanning(&mut self, path: &Path) -> io::Result<()> {
        if self.debug {
            writeln!(self.out, "Scanning: {}", path.display())?;
        }
        Ok(())
    }

    pub(crate) fn skipped(&mut self, path: &Path, class: FileClassification) -> io::Result<()> {
        if self.debug {
            writeln!(self.out, "Skipped ({}): {}", class.label(), path.display())?;
        }
        Ok(())
    }

    pub(crate) fn found(&mut self, path: &Path, result: &ScanResult) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => writeln!(self.out, "{}", format_findings(path, result)),
            ReportFormat::Json => {
                let item = FindingsItem {
                    path: path.display().to_string(),
                    matches: result
                        .iter()
                        .map(|(byte, hits)| MatchItem { byte: byte_label(byte), count: hits.count, lines: &hits.lines })
                        .collect(),
                };
                self.json_line(&item)
            }
        }
    }

    pub(crate) fn converted(&mut self, path: &Path, outcome: &ConversionOutcome) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => writeln!(self.out, "{}", format_conversion(path, outcome)),
            ReportFormat::Json => {
                let item = ConversionItem {
                    path: path.display().to_string(),
                    output: outcome.output_path.display().to_string(),
                    replacements: outcome.total_replacements,
                };
                self.json_line(&item)
            }
        }
    }

    fn json_line<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        serde_json::to_writer(&mut *self.out, item)?;
        writeln!(self.out)
    }
}
