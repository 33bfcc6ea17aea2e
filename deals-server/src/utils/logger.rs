//! Logging Infrastructure
//!
//! - 控制台：开发环境 pretty，生产环境 JSON
//! - `LOG_DIR` 设置时按天滚动写文件：`app/` (14 天后清理) 和 `security/` (永久保留)

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Metadata, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// 应用日志保留天数
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

const APP_PREFIX: &str = "app";
const SECURITY_PREFIX: &str = "security";
const LOG_SUFFIX: &str = "log";

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Initialize the logging system with daily rotating logs
///
/// `RUST_LOG` 优先于 `level`。
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let (app_layer, security_layer) = match log_dir {
        Some(dir) => {
            let log_dir = Path::new(dir);
            let app_dir = log_dir.join(APP_PREFIX);
            let security_dir = log_dir.join(SECURITY_PREFIX);
            fs::create_dir_all(&app_dir)?;
            fs::create_dir_all(&security_dir)?;

            let app = file_layer(&app_dir, APP_PREFIX, json_format, |meta| {
                meta.target() != "security"
            })?;
            let security = file_layer(&security_dir, SECURITY_PREFIX, json_format, |meta| {
                meta.target() == "security"
            })?;

            tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
            (Some(app), Some(security))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(app_layer)
        .with(security_layer)
        .try_init()?;

    Ok(())
}

fn file_layer<S>(
    dir: &Path,
    prefix: &str,
    json_format: bool,
    keep: fn(&Metadata<'_>) -> bool,
) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix(LOG_SUFFIX)
        .build(dir)?;

    let layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(filter_fn(keep))
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(filter_fn(keep))
            .boxed()
    };
    Ok(layer)
}

/// 删除超过保留期的应用日志 (`app/app.YYYY-MM-DD.log`)，返回删除的文件数
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let app_dir = log_dir.join(APP_PREFIX);
    if !app_dir.exists() {
        return Ok(0);
    }

    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let mut removed = 0;
    for entry in fs::read_dir(app_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(date) = log_file_date(name)
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }
    Ok(removed)
}

fn log_file_date(name: &str) -> Option<chrono::NaiveDate> {
    let date = name
        .strip_prefix(APP_PREFIX)?
        .strip_prefix('.')?
        .strip_suffix(LOG_SUFFIX)?
        .strip_suffix('.')?;
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Periodic cleanup task - runs every hour
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}
