//! 日志文件维护: 零点切换, 过期清理, 历史压缩.

use super::LoggingConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, TimeZone};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error};

/// 在给定运行时中启动维护任务
pub(super) fn spawn(
    handle: &tokio::runtime::Handle,
    config: LoggingConfig,
    switch_requested: Arc<AtomicBool>,
) {
    handle.spawn(async move {
        let period = Duration::from_secs(config.cleanup_interval_seconds.max(1));
        let mut cleanup = tokio::time::interval(period);
        let mut midnight = tokio::time::Instant::now() + until_next_midnight(Local::now());

        loop {
            tokio::select! {
                _ = cleanup.tick() => run_cleanup(&config),
                _ = tokio::time::sleep_until(midnight) => {
                    switch_requested.store(true, Ordering::Release);
                    run_cleanup(&config);
                    midnight = tokio::time::Instant::now() + until_next_midnight(Local::now());
                }
            }
        }
    });
}

fn run_cleanup(config: &LoggingConfig) {
    if let Err(err) = cleanup_logs(config, Local::now().date_naive()) {
        error!("清理日志失败: {err:#}");
    }
}

/// 删除保留期外的日志, 并压缩今天之前的未压缩日志
fn cleanup_logs(config: &LoggingConfig, today: NaiveDate) -> Result<()> {
    let directory = Path::new(&config.directory);
    if !directory.exists() {
        return Ok(());
    }
    let cutoff = today - ChronoDuration::days(config.retention_days);

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(log) = LogFileName::parse(name, &config.file_prefix) else {
            continue;
        };

        if log.date < cutoff {
            debug!("删除过期日志 {}", path.display());
            fs::remove_file(&path)
                .with_context(|| format!("删除过期日志失败, path={}", path.display()))?;
        } else if config.compress_history && !log.compressed && log.date < today {
            compress(&path)?;
        }
    }
    Ok(())
}

/// 压缩为 `<name>.gz` 并删除原文件
fn compress(path: &Path) -> Result<()> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    if gz_path.exists() {
        return Ok(());
    }

    let mut input =
        File::open(path).with_context(|| format!("打开待压缩日志失败, path={}", path.display()))?;
    let output = File::create(&gz_path)
        .with_context(|| format!("创建压缩日志失败, path={}", gz_path.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    std::io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path).with_context(|| format!("删除已压缩日志失败, path={}", path.display()))
}

/// 日志文件名 `<prefix>.<YYYY-MM-DD>.log[.gz]`
#[derive(Debug, PartialEq, Eq)]
struct LogFileName {
    date: NaiveDate,
    compressed: bool,
}

impl LogFileName {
    fn parse(name: &str, prefix: &str) -> Option<Self> {
        let rest = name.strip_prefix(prefix)?.strip_prefix('.')?;
        let (date, compressed) = match rest.strip_suffix(".gz") {
            Some(plain) => (plain.strip_suffix(".log")?, true),
            None => (rest.strip_suffix(".log")?, false),
        };
        if date.len() != 10 {
            return None;
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        Some(Self { date, compressed })
    }
}

fn until_next_midnight(now: DateTime<Local>) -> Duration {
    let next = (now.date_naive() + ChronoDuration::days(1)).and_hms_opt(0, 0, 0);
    next.and_then(|t| Local.from_local_datetime(&t).earliest())
        .and_then(|t| (t - now).to_std().ok())
        .unwrap_or(Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::daily_log_path;
    use std::io::Write;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> LoggingConfig {
        LoggingConfig {
            directory: dir.path().to_string_lossy().to_string(),
            retention_days: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_日志文件名解析() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(
            LogFileName::parse("aacfeed.2026-10-18.log", "aacfeed"),
            Some(LogFileName {
                date,
                compressed: false
            })
        );
        assert_eq!(
            LogFileName::parse("aacfeed.2026-10-18.log.gz", "aacfeed"),
            Some(LogFileName {
                date,
                compressed: true
            })
        );
        assert!(LogFileName::parse("aacfeed.log", "aacfeed").is_none());
        assert!(LogFileName::parse("other.2026-10-18.log", "aacfeed").is_none());
    }

    #[test]
    fn test_清理与压缩() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let base = dir.path();

        let expired = daily_log_path(base, "aacfeed", today - ChronoDuration::days(30));
        let history = daily_log_path(base, "aacfeed", today - ChronoDuration::days(1));
        let current = daily_log_path(base, "aacfeed", today);
        for path in [&expired, &history, &current] {
            let mut file = File::create(path).unwrap();
            writeln!(file, "解码流已打开").unwrap();
        }

        cleanup_logs(&config, today).unwrap();

        assert!(!expired.exists());
        assert!(!history.exists());
        assert!(PathBuf::from(format!("{}.gz", history.display())).exists());
        assert!(current.exists());
    }

    #[test]
    fn test_距下一个零点() {
        let now = Local.with_ymd_and_hms(2026, 10, 18, 23, 59, 0).earliest().unwrap();
        let wait = until_next_midnight(now);
        assert!(wait <= Duration::from_secs(60));
    }
}
