//! Recursive file discovery for folder entries.
//!
//! Enumerates every regular file below a root folder, at any depth, together
//! with its path relative to that root. The relative path is what the runner
//! joins onto the destination folder to mirror the tree.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Information about a file discovered during walking
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Full path to the file
    pub path: PathBuf,

    /// Relative path from the root
    pub relative_path: PathBuf,
}

impl FileInfo {
    /// Create FileInfo from a DirEntry.
    /// Returns None if the entry is a symlink to a directory or a broken symlink.
    fn from_entry(entry: &DirEntry, root: &Path) -> std::io::Result<Option<Self>> {
        if entry.path_is_symlink() {
            match std::fs::metadata(entry.path()) {
                // Symlink to directory — skip it
                Ok(resolved) if resolved.is_dir() => return Ok(None),
                Ok(_) => {}
                // Broken symlink — skip it
                Err(_) => return Ok(None),
            }
        }

        let path = entry.path().to_path_buf();
        let relative_path = match path.strip_prefix(root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} is not below {}", path.display(), root.display()),
                ))
            }
        };

        Ok(Some(Self {
            path,
            relative_path,
        }))
    }
}

/// Walk a directory tree and collect all files
///
/// Entries are visited in file-name order so that log output is stable
/// between runs. Directories themselves are not reported.
///
/// # Arguments
/// * `root` - Root directory to start walking from
///
/// # Returns
/// * `Ok(Vec<FileInfo>)` - List of all files found
/// * `Err(io::Error)` - If the root or any subdirectory cannot be read
///
/// # Example
/// ```no_run
/// use simple_backup::fs::walker::walk_directory;
/// use std::path::Path;
///
/// let files = walk_directory(Path::new("/data")).unwrap();
/// println!("Found {} files", files.len());
/// ```
pub fn walk_directory(root: &Path) -> std::io::Result<Vec<FileInfo>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;

        // Skip directories (we only want files for backup)
        if entry.file_type().is_dir() {
            continue;
        }

        if let Some(file_info) = FileInfo::from_entry(&entry, root)? {
            files.push(file_info);
        }
    }

    Ok(files)
}
