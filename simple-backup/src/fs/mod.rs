//! File system helpers for backup operations.

pub mod walker;
