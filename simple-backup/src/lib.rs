//! Simple Backup Library
//!
//! Copies a configured set of files and folders into a dated backup folder
//! and optionally compresses that folder into a single zip archive.

pub mod config;
pub mod executor;
pub mod fs;
pub mod utils;

// Re-export commonly used types
pub use config::{BackupEntry, BackupSettings, ConfigResolver};
pub use executor::{BackupRunner, BackupSummary};
pub use utils::errors::BackupError;
pub type Result<T> = std::result::Result<T, BackupError>;
