//! Custom error types for the backup tool.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    /// Invalid or unreadable configuration document. Always fatal to the run.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl BackupError {
    pub fn config(message: impl Into<String>) -> Self {
        BackupError::Config(message.into())
    }
}

impl From<walkdir::Error> for BackupError {
    fn from(err: walkdir::Error) -> Self {
        BackupError::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
