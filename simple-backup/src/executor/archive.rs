//! Zip archiving of a finished backup folder.

use crate::utils::Result;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Compress `folder` into `archive_path`, then delete `folder`.
///
/// The two steps are attempted independently: a failed compression is
/// logged and the folder is still removed. Returns the archive path when
/// compression succeeded.
pub fn archive_and_remove(folder: &Path, archive_path: &Path) -> Option<PathBuf> {
    let archived = match create_archive(folder, archive_path) {
        Ok(files) => {
            info!("Archived {} files into {}", files, archive_path.display());
            Some(archive_path.to_path_buf())
        }
        Err(e) => {
            error!(
                "Error creating ZIP archive {}: {:?}",
                archive_path.display(),
                e
            );
            None
        }
    };

    info!("Deleting backup folder {} ...", folder.display());
    if let Err(e) = fs::remove_dir_all(folder) {
        error!(
            "Unable to delete backup folder {}: {:?}",
            folder.display(),
            e
        );
    }

    archived
}

/// Write every file and directory below `folder` into a new zip at `archive_path`.
///
/// Entry names are relative to `folder` and always use `/`. An existing
/// archive is overwritten. Returns the number of files written.
pub fn create_archive(folder: &Path, archive_path: &Path) -> Result<usize> {
    info!("Creating archive {} ...", archive_path.display());

    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut files = 0;

    for entry in WalkDir::new(folder).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(folder).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not below {}", entry.path().display(), folder.display()),
            )
        })?;
        let name = archive_name(relative);

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            // Entries of 4 GiB or more need zip64 headers
            let large = entry.metadata()?.len() >= u64::from(u32::MAX);
            zip.start_file(name, options.large_file(large))?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut zip)?;
            files += 1;
        }
    }

    zip.finish()?;
    Ok(files)
}

fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
