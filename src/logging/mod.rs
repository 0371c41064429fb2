//! 宿主进程的日志初始化.
//!
//! 库 crate 只通过 `log` 门面输出, 这里把它们接入 tracing:
//! - 控制台层: 带颜色, 显示模块路径
//! - 文件层: 按天命名的日志文件, 经 `tracing-appender` 非阻塞写入
//! - 维护任务: 在 tokio 运行时中按天切换文件, 清理过期日志并压缩历史日志

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

mod maintenance;

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 文件日志级别 (EnvFilter 语法)
    pub level: String,
    /// 控制台日志级别, 为空时不输出到控制台
    pub console_level: String,
    pub directory: String,
    pub file_prefix: String,
    /// 保留天数, 更早的日志被删除
    pub retention_days: i64,
    /// 是否 gzip 压缩历史日志
    pub compress_history: bool,
    pub cleanup_interval_seconds: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_level: "debug".to_string(),
            directory: "logs".to_string(),
            file_prefix: "aacfeed".to_string(),
            retention_days: 14,
            compress_history: true,
            cleanup_interval_seconds: 3600,
        }
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 初始化全局日志, 进程内只能调用一次
///
/// 当前线程处于 tokio 运行时中时启动日志维护任务, 否则只记录一条警告.
pub fn init(config: &LoggingConfig) -> Result<()> {
    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("创建日志目录失败, path={}", config.directory))?;

    let switch_requested = Arc::new(AtomicBool::new(false));
    let writer = DailyFileWriter::new(
        Path::new(&config.directory),
        &config.file_prefix,
        Arc::clone(&switch_requested),
    )?;
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);
    if LOG_GUARD.set(guard).is_err() {
        anyhow::bail!("日志系统已初始化");
    }

    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(LineFormatter { ansi: false })
        .with_filter(EnvFilter::new(&config.level));

    let console_layer = (!config.console_level.is_empty()).then(|| {
        fmt::Layer::default()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .event_format(LineFormatter { ansi: true })
            .with_filter(EnvFilter::new(&config.console_level))
    });

    Registry::default()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("安装全局日志订阅器失败")?;

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => maintenance::spawn(&handle, config.clone(), switch_requested),
        Err(_) => tracing::warn!("不在 tokio 运行时中, 日志维护任务未启动"),
    }
    Ok(())
}

/// 按天命名的日志文件写入器
///
/// 维护任务在零点置位 `switch_requested`, 下一次写入时改为打开当天的文件.
struct DailyFileWriter {
    directory: PathBuf,
    prefix: String,
    switch_requested: Arc<AtomicBool>,
    file: File,
}

impl DailyFileWriter {
    fn new(directory: &Path, prefix: &str, switch_requested: Arc<AtomicBool>) -> Result<Self> {
        let path = daily_log_path(directory, prefix, Local::now().date_naive());
        Ok(Self {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            switch_requested,
            file: open_for_append(&path)?,
        })
    }

    fn switch_to_today(&mut self) -> std::io::Result<()> {
        let path = daily_log_path(&self.directory, &self.prefix, Local::now().date_naive());
        self.file = open_for_append(&path).map_err(std::io::Error::other)?;
        Ok(())
    }
}

impl Write for DailyFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.switch_requested.swap(false, Ordering::AcqRel) {
            self.switch_to_today()?;
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

fn open_for_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("打开日志文件失败, path={}", path.display()))
}

/// `<directory>/<prefix>.<YYYY-MM-DD>.log`
pub(crate) fn daily_log_path(directory: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    directory.join(format!("{prefix}.{}.log", date.format("%Y-%m-%d")))
}

/// 单行日志格式: `[MM-DD hh:mm:ss.mmm] LEVEL target > 消息`
struct LineFormatter {
    ansi: bool,
}

fn level_color(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::ERROR => "\x1b[1;31m",
        tracing::Level::WARN => "\x1b[33m",
        tracing::Level::INFO => "\x1b[32m",
        tracing::Level::DEBUG => "\x1b[36m",
        tracing::Level::TRACE => "\x1b[90m",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let stamp = Local::now().format("%m-%d %H:%M:%S%.3f");
        let level = *meta.level();

        if self.ansi {
            let color = level_color(level);
            write!(writer, "[{stamp}] {color}{level:>5}\x1b[0m {} > ", meta.target())?;
        } else {
            write!(writer, "[{stamp}] {level:>5} {} > ", meta.target())?;
        }
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
