use std::sync::PoisonError;

pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by every dirsync crate.
///
/// Only `Configuration` is meant to stop a run on purpose. Anything that goes
/// wrong for a single subdirectory is recorded in the run report instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    SetLogger(#[from] log::SetLoggerError),

    #[error("Configuration lock poisoned")]
    PoisonedLock,

    /// Fatal precondition: no usable key, transfer tool missing, nothing to sync.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{msg}: {source}")]
    WithSource {
        msg: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn with_source(msg: &str, source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Error::WithSource {
            msg: msg.to_string(),
            source,
        }
    }

    /// Errors that should end the process with the configuration exit code.
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Config(_))
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}
