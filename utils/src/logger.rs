use slog::o;
use slog::Drain;
use slog::Level;
use slog::LevelFilter;
#[cfg(all(target_os = "linux", feature = "journald"))]
use slog_journald::JournaldDrain;
#[cfg(feature = "syslog")]
use slog_syslog::Facility;

use std::fs::OpenOptions;
use std::path::PathBuf;

use super::error::Result;
use crate::app_config::{AppConfig, LogConfig};

const LOG_FILE_NAME: &str = "dirsync.log";

pub fn setup_logging() -> Result<slog_scope::GlobalLoggerGuard> {
    // Setup Logging
    let guard = slog_scope::set_global_logger(default_root_logger()?);
    slog_stdlog::init()?;

    Ok(guard)
}

pub fn default_root_logger() -> Result<slog::Logger> {
    let log_config = AppConfig::get::<LogConfig>("log").ok();
    let log_level = log_config
        .as_ref()
        .map(|c| parse_level(&c.level))
        .unwrap_or(Level::Info);

    let term_drain = default_term_drain().unwrap_or(default_discard()?);

    let file_drain = match log_config.as_ref().filter(|c| c.file) {
        Some(c) => default_file_drain(&c.dir).unwrap_or(default_discard()?),
        None => default_discard()?,
    };

    let drain = slog::Duplicate(term_drain, file_drain).fuse();

    // Merge additional drains based on features
    #[cfg(feature = "syslog")]
    let drain = slog::Duplicate(default_syslog_drain().unwrap_or(default_discard()?), drain).fuse();
    #[cfg(feature = "journald")]
    #[cfg(target_os = "linux")]
    let drain = slog::Duplicate(
        default_journald_drain().unwrap_or(default_discard()?),
        drain,
    )
    .fuse();

    let drain = LevelFilter::new(drain, log_level).fuse();

    Ok(slog::Logger::root(drain, o!()))
}

/// Map a `log.level` value to a slog level. Unknown names fall back to info.
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" | "warning" => Level::Warning,
        "error" => Level::Error,
        "critical" => Level::Critical,
        _ => Level::Info,
    }
}

fn default_discard() -> Result<slog_async::Async> {
    let drain = slog_async::Async::new(slog::Discard).chan_size(1024).build();

    Ok(drain)
}

// term drain: Log to Terminal. stdout belongs to the transfer tool.
#[cfg(not(feature = "termlog"))]
fn default_term_drain() -> Result<slog_async::Async> {
    let plain = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let term = slog_term::FullFormat::new(plain)
        .use_custom_timestamp(slog_term::timestamp_local);

    let drain = slog_async::Async::new(term.build().fuse())
        .chan_size(1024)
        .build();

    Ok(drain)
}

// term drain: Log to Terminal
#[cfg(feature = "termlog")]
fn default_term_drain() -> Result<slog_async::Async> {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let term = slog_term::FullFormat::new(decorator)
        .use_file_location()
        .use_custom_timestamp(slog_term::timestamp_local);

    let drain = slog_async::Async::new(term.build().fuse())
        .chan_size(1024)
        .build();

    Ok(drain)
}

fn log_dir(configured: &str) -> Result<PathBuf> {
    if !configured.trim().is_empty() {
        return Ok(PathBuf::from(configured));
    }

    let mut exe_dir = std::env::current_exe()?;
    exe_dir.pop();

    if !exe_dir.exists() {
        exe_dir = std::env::current_dir()?;
    }

    Ok(exe_dir.join("logs"))
}

// file drain: Log to file
fn default_file_drain(configured_dir: &str) -> Result<slog_async::Async> {
    let log_dir = log_dir(configured_dir)?;
    std::fs::create_dir_all(&log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE_NAME))?;

    let decorator = slog_term::PlainSyncDecorator::new(file);
    let formatter = slog_term::FullFormat::new(decorator)
        .use_file_location()
        .use_custom_timestamp(slog_term::timestamp_local)
        .build()
        .fuse();

    let drain = slog_async::Async::new(formatter).chan_size(1024).build();

    Ok(drain)
}

// syslog drain: Log to syslog
#[cfg(feature = "syslog")]
fn default_syslog_drain() -> Result<slog_async::Async> {
    let syslog = slog_syslog::unix_3164(Facility::LOG_USER)?;

    let drain = slog_async::Async::new(syslog.fuse())
        .chan_size(1024)
        .build();

    Ok(drain)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn default_journald_drain() -> Result<slog_async::Async> {
    let journald = JournaldDrain.ignore_res();
    let drain = slog_async::Async::new(journald).chan_size(1024).build();

    Ok(drain)
}
