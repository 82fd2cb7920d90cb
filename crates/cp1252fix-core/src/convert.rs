//! 转换主流程：遍历 → 分类 → 扫描或改写 → 报告/落盘
//!
//! 单线程顺序执行；文件之间没有共享状态，逐个处理到底再前进到下一个。
use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::bytemap::{ByteMap, QuoteStyle};
use crate::classify::{classify, read_prefix, FileClassification};
use crate::error::FileError;
use crate::options::{ConvertOptions, RunStats};
use crate::report::Reporter;
use crate::rewrite::{derive_output_path, persist, ReplaceStrategy, Rewriter};
use crate::scan::{ScanResult, Scanner};

/// 改写结果：替换次数与实际写入路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub total_replacements: usize,
    pub output_path: PathBuf,
}

/// 单个文件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// 被分类器排除（二进制或已是 UTF-8）
    Skipped(FileClassification),
    /// 候选文件但没有任何目标字节；不输出、不写盘
    Clean,
    /// 预览模式下的命中
    Found(ScanResult),
    /// 改写模式下已写盘
    Converted(ConversionOutcome),
}

/// 单文件处理器（映射表与自动机只构建一次）
pub struct Converter {
    scanner: Scanner,
    rewriter: Rewriter,
    write: bool,
    suffix: Option<String>,
}

impl Converter {
    pub fn new(opts: &ConvertOptions) -> Result<Self> {
        let map = ByteMap::cp1252(opts.quotes).restricted_to(&opts.only)?;
        // 弯引号的 UTF-8 序列含有 0x99/0x9C，逐轮替换会把它们再改一遍
        let strategy = match opts.quotes {
            QuoteStyle::Curly => ReplaceStrategy::Simultaneous,
            QuoteStyle::Plain => opts.strategy,
        };
        debug!(entries = map.len(), ?strategy, "byte map ready");
        Ok(Self {
            scanner: Scanner::new(&map)?,
            rewriter: Rewriter::new(&map, strategy)?,
            write: opts.write,
            suffix: opts.suffix.clone(),
        })
    }

    /// 处理单个文件：先用前缀分类，候选文件再整读
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome, FileError> {
        let read_err = |source| FileError::Read { path: path.to_path_buf(), source };

        let prefix = read_prefix(path).map_err(read_err)?;
        let class = classify(&prefix);
        if !class.is_candidate() {
            debug!(?path, class = class.label(), "skipping file");
            return Ok(FileOutcome::Skipped(class));
        }

        let content = std::fs::read(path).map_err(read_err)?;

        if !self.write {
            let result = self.scanner.scan(&content);
            debug!(?path, occurrences = result.total_occurrences(), "scanned");
            return Ok(if result.is_empty() { FileOutcome::Clean } else { FileOutcome::Found(result) });
        }

        let rewrite = self.rewriter.rewrite(content);
        if rewrite.total_replacements == 0 {
            return Ok(FileOutcome::Clean);
        }
        let output_path = derive_output_path(path, self.suffix.as_deref());
        persist(&output_path, &rewrite.content)
            .map_err(|source| FileError::Write { path: output_path.clone(), source })?;
        debug!(?path, ?output_path, replacements = rewrite.total_replacements, "rewritten");
        Ok(FileOutcome::Converted(ConversionOutcome { total_replacements: rewrite.total_replacements, output_path }))
    }
}

/// 枚举待处理文件：文件本身，或目录下递归的全部文件（按文件系统枚举顺序，不过滤）
pub fn walk_files(root: &Path) -> Box<dyn Iterator<Item = Result<PathBuf, FileError>>> {
    if root.is_file() {
        return Box::new(std::iter::once(Ok(root.to_path_buf())));
    }
    let root = root.to_path_buf();
    let iter = WalkDir::new(&root).into_iter().filter_map(move |entry| match entry {
        Ok(e) => {
            // 指向文件的符号链接同样处理
            let is_file = e.file_type().is_file() || (e.path_is_symlink() && e.path().is_file());
            is_file.then(|| Ok(e.into_path()))
        }
        Err(source) => {
            let path = source.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
            Some(Err(FileError::Walk { path, source }))
        }
    });
    Box::new(iter)
}

/// 处理 `root`（文件或目录），报告写入 `out`，返回统计信息
pub fn convert_path(root: &Path, opts: &ConvertOptions, out: &mut dyn Write) -> Result<RunStats> {
    let converter = Converter::new(opts)?;
    let mut reporter = Reporter::new(out, opts.format, opts.debug);
    let mut stats = RunStats::default();

    info!(?root, write = opts.write, suffix = ?opts.suffix, "starting conversion");

    for item in walk_files(root) {
        let path = match item {
            Ok(p) => p,
            Err(err) => {
                record_failure(err, opts.keep_going, &mut stats)?;
                continue;
            }
        };
        stats.files_visited += 1;
        reporter.scanning(&path)?;

        let outcome = match converter.process_file(&path) {
            Ok(o) => o,
            Err(err) => {
                record_failure(err, opts.keep_going, &mut stats)?;
                continue;
            }
        };

        match outcome {
            FileOutcome::Skipped(class) => {
                match class {
                    FileClassification::Binary => stats.files_skipped_binary += 1,
                    _ => stats.files_skipped_unicode += 1,
                }
                reporter.skipped(&path, class)?;
            }
            FileOutcome::Clean => {}
            FileOutcome::Found(result) => {
                stats.files_with_matches += 1;
                stats.total_occurrences += result.total_occurrences();
                reporter.found(&path, &result)?;
            }
            FileOutcome::Converted(conv) => {
                stats.files_with_matches += 1;
                stats.files_written += 1;
                stats.total_replacements += conv.total_replacements;
                reporter.converted(&path, &conv)?;
            }
        }
    }

    Ok(stats)
}

fn record_failure(err: FileError, keep_going: bool, stats: &mut RunStats) -> Result<()> {
    if !keep_going {
        return Err(err.into());
    }
    let path = err.path().to_path_buf();
    let err = anyhow::Error::from(err);
    warn!(?path, "file failed, continuing: {err:#}");
    stats.files_failed += 1;
    Ok(())
}
