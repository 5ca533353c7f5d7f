//! Backup runner - performs the copy and archive steps for resolved entries.
//!
//! Each entry is dispatched to one of three strategies:
//! - folder to folder: mirror every file of the source tree
//! - file to folder: copy into the folder, keeping the file name
//! - file to file: copy to exactly the destination path
//!
//! Any I/O error while processing entries aborts the run. The archive step
//! that follows is best-effort and only logs its failures.

pub mod archive;

use crate::config::{BackupEntry, BackupSettings};
use crate::fs::walker::walk_directory;
use crate::utils::format::{format_bytes, format_elapsed};
use crate::utils::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Backup execution result
#[derive(Debug, Default)]
pub struct BackupSummary {
    pub entries_processed: usize,
    pub files_copied: usize,
    pub bytes_copied: u64,
    /// Archive written by this run, if archiving was enabled and succeeded
    pub archive: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Main backup runner
pub struct BackupRunner<'a> {
    settings: &'a BackupSettings,
}

impl<'a> BackupRunner<'a> {
    pub fn new(settings: &'a BackupSettings) -> Self {
        Self { settings }
    }

    /// Execute the backup
    pub fn run(&self) -> Result<BackupSummary> {
        info!("Starting backup process ...");
        let start_time = Instant::now();
        let mut summary = BackupSummary::default();

        let backup_folder = self.settings.backup_path();
        ensure_folder(&backup_folder)?;

        for entry in &self.settings.entries {
            self.process_entry(entry, &mut summary)?;
            summary.entries_processed += 1;
        }

        if self.settings.create_archive {
            summary.archive =
                archive::archive_and_remove(&backup_folder, &self.settings.archive_path());
        }

        summary.elapsed = start_time.elapsed();
        info!(
            "Backup completed in {} ({} files, {}).",
            format_elapsed(summary.elapsed),
            summary.files_copied,
            format_bytes(summary.bytes_copied)
        );

        Ok(summary)
    }

    fn process_entry(&self, entry: &BackupEntry, summary: &mut BackupSummary) -> Result<()> {
        match entry {
            BackupEntry::FolderToFolder {
                source,
                destination,
            } => folder_to_folder(source, destination, summary),
            BackupEntry::FileToFolder {
                source,
                destination,
            } => file_to_folder(source, destination, summary),
            BackupEntry::FileToFile {
                source,
                destination,
            } => file_to_file(source, destination, summary),
        }
    }
}

/// Create `path` and its parents unless it already is a directory.
///
/// A file already sitting at `path` makes this fail.
fn ensure_folder(path: &Path) -> Result<()> {
    if !path.is_dir() {
        info!("Creating folder {} ...", path.display());
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Copy a single file, overwriting any existing destination
fn copy_file(source: &Path, destination: &Path, summary: &mut BackupSummary) -> Result<()> {
    info!(
        "Copying file {} to {} ...",
        source.display(),
        destination.display()
    );
    let bytes = fs::copy(source, destination)?;
    summary.files_copied += 1;
    summary.bytes_copied += bytes;
    Ok(())
}

/// Mirror every file below `source` into `destination`, preserving relative paths.
///
/// Directories without files are not recreated.
fn folder_to_folder(source: &Path, destination: &Path, summary: &mut BackupSummary) -> Result<()> {
    if source.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Source folder {} is a file", source.display()),
        )
        .into());
    }

    for file in walk_directory(source)? {
        let target = destination.join(&file.relative_path);
        if let Some(parent) = target.parent() {
            ensure_folder(parent)?;
        }
        copy_file(&file.path, &target, summary)?;
    }
    Ok(())
}

fn file_to_folder(source: &Path, destination: &Path, summary: &mut BackupSummary) -> Result<()> {
    ensure_folder(destination)?;
    let file_name = source.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} has no file name", source.display()),
        )
    })?;
    copy_file(source, &destination.join(file_name), summary)
}

fn file_to_file(source: &Path, destination: &Path, summary: &mut BackupSummary) -> Result<()> {
    if let Some(parent) = destination.parent() {
        ensure_folder(parent)?;
    }
    copy_file(source, destination, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::BackupError;
    use tempfile::TempDir;

    fn settings(root: &Path, entries: Vec<BackupEntry>) -> BackupSettings {
        BackupSettings {
            root_folder: root.to_path_buf(),
            backup_folder: "Backup".to_string(),
            create_archive: false,
            entries,
        }
    }

    #[test]
    fn test_run_without_entries_creates_backup_folder() -> Result<()> {
        let root = TempDir::new()?;
        let settings = settings(root.path(), Vec::new());

        let summary = BackupRunner::new(&settings).run()?;

        assert!(root.path().join("Backup").is_dir());
        assert_eq!(summary.entries_processed, 0);
        assert_eq!(summary.files_copied, 0);
        assert!(summary.archive.is_none());
        Ok(())
    }

    #[test]
    fn test_file_to_file() -> Result<()> {
        let root = TempDir::new()?;
        let source = root.path().join("TestFile.txt");
        fs::write(&source, b"hello backup")?;
        let destination = root.path().join("Backup/TestBackup/TestFile.txt");

        let settings = settings(
            root.path(),
            vec![BackupEntry::FileToFile {
                source: source.clone(),
                destination: destination.clone(),
            }],
        );
        let summary = BackupRunner::new(&settings).run()?;

        assert_eq!(fs::read(&destination)?, fs::read(&source)?);
        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.bytes_copied, 12);
        Ok(())
    }

    #[test]
    fn test_file_to_folder_keeps_file_name() -> Result<()> {
        let root = TempDir::new()?;
        let source = root.path().join("notes.txt");
        fs::write(&source, b"notes")?;
        let destination = root.path().join("Backup/Docs");

        let settings = settings(
            root.path(),
            vec![BackupEntry::FileToFolder {
                source,
                destination: destination.clone(),
            }],
        );
        BackupRunner::new(&settings).run()?;

        assert_eq!(fs::read_to_string(destination.join("notes.txt"))?, "notes");
        Ok(())
    }

    #[test]
    fn test_folder_to_folder_mirrors_tree() -> Result<()> {
        let root = TempDir::new()?;
        let source = root.path().join("data");
        fs::create_dir_all(source.join("sub/deeper"))?;
        fs::create_dir_all(source.join("empty"))?;
        fs::write(source.join("top.txt"), b"top")?;
        fs::write(source.join("sub/mid.txt"), b"mid")?;
        fs::write(source.join("sub/deeper/low.txt"), b"low")?;
        let destination = root.path().join("Backup/data");

        let settings = settings(
            root.path(),
            vec![BackupEntry::FolderToFolder {
                source,
                destination: destination.clone(),
            }],
        );
        let summary = BackupRunner::new(&settings).run()?;

        assert_eq!(fs::read_to_string(destination.join("top.txt"))?, "top");
        assert_eq!(fs::read_to_string(destination.join("sub/mid.txt"))?, "mid");
        assert_eq!(fs::read_to_string(destination.join("sub/deeper/low.txt"))?, "low");
        assert!(!destination.join("empty").exists());
        assert_eq!(summary.files_copied, 3);
        Ok(())
    }

    #[test]
    fn test_folder_name_repeated_inside_tree() -> Result<()> {
        let root = TempDir::new()?;
        let source = root.path().join("data");
        fs::create_dir_all(source.join("data"))?;
        fs::write(source.join("data/inner.txt"), b"inner")?;
        let destination = root.path().join("Backup/copy");

        let settings = settings(
            root.path(),
            vec![BackupEntry::FolderToFolder {
                source,
                destination: destination.clone(),
            }],
        );
        BackupRunner::new(&settings).run()?;

        assert_eq!(fs::read_to_string(destination.join("data/inner.txt"))?, "inner");
        Ok(())
    }

    #[test]
    fn test_rerun_overwrites_existing_files() -> Result<()> {
        let root = TempDir::new()?;
        let source = root.path().join("a.txt");
        let destination = root.path().join("Backup/a.txt");

        let settings = settings(
            root.path(),
            vec![BackupEntry::FileToFile {
                source: source.clone(),
                destination: destination.clone(),
            }],
        );

        fs::write(&source, b"first")?;
        BackupRunner::new(&settings).run()?;
        fs::write(&source, b"second")?;
        BackupRunner::new(&settings).run()?;

        assert_eq!(fs::read_to_string(&destination)?, "second");
        Ok(())
    }

    #[test]
    fn test_missing_source_aborts_remaining_entries() {
        let root = TempDir::new().unwrap();
        let present = root.path().join("present.txt");
        fs::write(&present, b"x").unwrap();

        let settings = settings(
            root.path(),
            vec![
                BackupEntry::FileToFile {
                    source: root.path().join("missing.txt"),
                    destination: root.path().join("Backup/missing.txt"),
                },
                BackupEntry::FileToFile {
                    source: present,
                    destination: root.path().join("Backup/present.txt"),
                },
            ],
        );

        let result = BackupRunner::new(&settings).run();

        assert!(matches!(result, Err(BackupError::Io(_))));
        assert!(!root.path().join("Backup/present.txt").exists());
    }

    #[test]
    fn test_destination_folder_occupied_by_file_fails() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("a.txt");
        fs::write(&source, b"a").unwrap();
        fs::create_dir(root.path().join("Backup")).unwrap();
        fs::write(root.path().join("Backup/Docs"), b"not a folder").unwrap();

        let settings = settings(
            root.path(),
            vec![BackupEntry::FileToFolder {
                source,
                destination: root.path().join("Backup/Docs"),
            }],
        );

        assert!(BackupRunner::new(&settings).run().is_err());
    }

    #[test]
    fn test_folder_source_that_is_a_file_fails() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("actually_a_file");
        fs::write(&source, b"x").unwrap();

        let settings = settings(
            root.path(),
            vec![BackupEntry::FolderToFolder {
                source,
                destination: root.path().join("Backup/copy"),
            }],
        );

        assert!(matches!(
            BackupRunner::new(&settings).run(),
            Err(BackupError::Io(_))
        ));
    }

    #[test]
    fn test_run_with_archive_replaces_folder() -> Result<()> {
        let root = TempDir::new()?;
        let source = root.path().join("a.txt");
        fs::write(&source, b"a")?;

        let mut settings = settings(
            root.path(),
            vec![BackupEntry::FileToFile {
                source,
                destination: root.path().join("Backup/a.txt"),
            }],
        );
        settings.create_archive = true;

        let summary = BackupRunner::new(&settings).run()?;

        assert!(!root.path().join("Backup").exists());
        assert!(root.path().join("Backup.zip").is_file());
        assert_eq!(summary.archive, Some(root.path().join("Backup.zip")));
        Ok(())
    }
}
