use anyhow::{bail, Context, Result};
use clap::Parser;
use cp1252fix_core::{convert_path, parse_byte_literal, ConvertOptions, QuoteStyle, ReplaceStrategy, ReportFormat};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(
    name = "cp1252fix",
    version,
    about = "查找并转换文件中的 CP1252 智能标点字节（0x80-0x9F）为 UTF-8"
)]
struct Cli {
    /// 待扫描的文件或目录（目录递归处理）
    path: PathBuf,

    /// 执行替换并写盘（默认只报告）
    #[arg(long)]
    write: bool,

    /// 打印每个被扫描的文件以及跳过原因
    #[arg(long)]
    debug: bool,

    /// 转换结果写入带后缀的新文件，例如 _utf8（仅配合 --write）
    #[arg(long)]
    suffix: Option<String>,

    /// 报告格式：text 或 json（每行一个 JSON 对象）
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// 单遍同时替换，替换结果不会被后续字节再次改写
    #[arg(long)]
    single_pass: bool,

    /// 0x91-0x94 转换为弯引号而不是 ASCII 引号
    #[arg(long)]
    curly_quotes: bool,

    /// 只处理指定字节（可重复），例如 --only 0x92
    #[arg(long = "only", value_name = "BYTE", value_parser = parse_only)]
    only: Vec<u8>,

    /// 单个文件读写失败时记录并继续
    #[arg(long)]
    keep_going: bool,
}

impl Cli {
    fn to_options(&self) -> ConvertOptions {
        ConvertOptions {
            write: self.write,
            debug: self.debug,
            suffix: self.suffix.clone(),
            format: match self.format.as_str() {
                "json" => ReportFormat::Json,
                _ => ReportFormat::Text,
            },
            strategy: if self.single_pass { ReplaceStrategy::Simultaneous } else { ReplaceStrategy::Chained },
            quotes: if self.curly_quotes { QuoteStyle::Curly } else { QuoteStyle::Plain },
            only: self.only.clone(),
            keep_going: self.keep_going,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let opts = cli.to_options();
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let stats = convert_path(&cli.path, &opts, &mut out).with_context(|| format!("processing {}", cli.path.display()))?;
    out.flush().context("flush report")?;

    info!(
        files_visited = stats.files_visited,
        files_with_matches = stats.files_with_matches,
        files_written = stats.files_written,
        skipped_binary = stats.files_skipped_binary,
        skipped_unicode = stats.files_skipped_unicode,
        "run finished"
    );

    if stats.files_failed > 0 {
        bail!("{} file(s) could not be processed", stats.files_failed);
    }
    Ok(())
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 只留报告；RUST_LOG 优先
    let default_level = if debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析 --only 参数
fn parse_only(s: &str) -> Result<u8, String> {
    parse_byte_literal(s).map_err(|e| e.to_string())
}
