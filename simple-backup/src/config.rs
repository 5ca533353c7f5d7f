//! Configuration management for the backup tool.
//!
//! Loads a JSON document whose keys are matched case-insensitively, applies
//! defaults, validates every entry and resolves all paths to absolute form.
//! Relative sources are resolved against the resolver's base directory,
//! relative destinations against `<root folder>/<backup folder>`.

use crate::utils::{BackupError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// Configuration file read when no other name is given
pub const DEFAULT_CONFIG_FILE: &str = "Config.json";

const SOURCE_MISSING: &str = "Entry source must be specified.";
const SOURCE_AMBIGUOUS: &str =
    "Either entry source folder or entry source file must be specified, but not both.";
const DESTINATION_AMBIGUOUS: &str =
    "Either entry destination folder or entry destination file must be specified, but not both.";
const FOLDER_TO_FILE: &str = "Backing up a folder to a file is not supported.";
const DESTINATION_UNDERIVABLE: &str =
    "Entry destination is not specified and cannot be derived from the entry source.";

/// Configuration document as written on disk.
///
/// Every field is optional; an empty string counts as unset. Keys are
/// lower-cased before deserialization, hence the lower-case renames.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    /// Base directory of the backup (default: base directory)
    #[serde(rename = "rootfolder")]
    pub root_folder: Option<String>,

    /// Name of the dated backup folder (default: `Backup-YYYY-MM-DD`)
    #[serde(rename = "backupfolder")]
    pub backup_folder: Option<String>,

    /// Compress the backup folder into a zip archive after copying
    #[serde(rename = "createziparchive")]
    pub create_zip_archive: Option<bool>,

    #[serde(rename = "entries")]
    pub entries: Option<Vec<EntryConfig>>,
}

/// One source/destination pair as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    #[serde(rename = "sourcefolder")]
    pub source_folder: Option<String>,

    #[serde(rename = "sourcefile")]
    pub source_file: Option<String>,

    #[serde(rename = "destinationfolder")]
    pub destination_folder: Option<String>,

    #[serde(rename = "destinationfile")]
    pub destination_file: Option<String>,
}

/// A validated entry with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupEntry {
    /// Mirror every file below `source` into `destination`
    FolderToFolder { source: PathBuf, destination: PathBuf },

    /// Copy `source` into the `destination` folder, keeping its name
    FileToFolder { source: PathBuf, destination: PathBuf },

    /// Copy `source` to exactly `destination`
    FileToFile { source: PathBuf, destination: PathBuf },
}

impl BackupEntry {
    pub fn source(&self) -> &Path {
        match self {
            BackupEntry::FolderToFolder { source, .. }
            | BackupEntry::FileToFolder { source, .. }
            | BackupEntry::FileToFile { source, .. } => source,
        }
    }

    pub fn destination(&self) -> &Path {
        match self {
            BackupEntry::FolderToFolder { destination, .. }
            | BackupEntry::FileToFolder { destination, .. }
            | BackupEntry::FileToFile { destination, .. } => destination,
        }
    }
}

/// Fully resolved settings for one backup run. Never mutated after validation.
#[derive(Debug, Clone)]
pub struct BackupSettings {
    /// Absolute directory the backup folder is created in
    pub root_folder: PathBuf,

    /// Name of the backup folder below `root_folder`
    pub backup_folder: String,

    /// Zip the backup folder and remove the uncompressed copy
    pub create_archive: bool,

    /// Entries in declared order
    pub entries: Vec<BackupEntry>,
}

impl BackupSettings {
    /// `<root folder>/<backup folder>`
    pub fn backup_path(&self) -> PathBuf {
        self.root_folder.join(&self.backup_folder)
    }

    /// `<root folder>/<backup folder>.zip`
    pub fn archive_path(&self) -> PathBuf {
        self.root_folder.join(format!("{}.zip", self.backup_folder))
    }
}

/// Loads and validates configuration documents relative to a base directory.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    base_dir: PathBuf,
}

impl ConfigResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Load configuration from a JSON file resolved against the base directory
    pub fn load(&self, file_name: impl AsRef<Path>) -> Result<BackupSettings> {
        let path = self.base_dir.join(file_name);
        info!("Reading configuration {} ...", path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| {
            BackupError::config(format!(
                "Unable to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        self.parse(&content, chrono::Local::now().date_naive())
    }

    /// Parse and validate a JSON document. `today` names the default backup folder.
    pub fn parse(&self, json: &str, today: NaiveDate) -> Result<BackupSettings> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| BackupError::config(format!("Malformed configuration document: {e}")))?;

        let raw: RawSettings = serde_json::from_value(normalize_keys(document))
            .map_err(|e| BackupError::config(format!("Invalid configuration document: {e}")))?;

        self.validate(raw, today)
    }

    /// Apply defaults, check every entry and resolve relative paths.
    ///
    /// Root and backup folder defaults are settled first, because every
    /// relative destination is resolved below them.
    pub fn validate(&self, raw: RawSettings, today: NaiveDate) -> Result<BackupSettings> {
        let root_folder = match non_empty(raw.root_folder) {
            Some(root) => self.base_dir.join(root),
            None => self.base_dir.clone(),
        };

        let backup_folder =
            non_empty(raw.backup_folder).unwrap_or_else(|| default_backup_folder_name(today));

        let backup_path = root_folder.join(&backup_folder);

        let entries = raw
            .entries
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                resolve_entry(entry, &self.base_dir, &backup_path)
                    .map_err(|msg| BackupError::config(format!("Entry {}: {}", index + 1, msg)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BackupSettings {
            root_folder,
            backup_folder,
            create_archive: raw.create_zip_archive.unwrap_or(false),
            entries,
        })
    }
}

enum Source {
    Folder(PathBuf),
    File(PathBuf),
}

enum Destination {
    Folder(PathBuf),
    File(PathBuf),
}

fn resolve_entry(
    entry: EntryConfig,
    base_dir: &Path,
    backup_path: &Path,
) -> std::result::Result<BackupEntry, &'static str> {
    let source = match (non_empty(entry.source_folder), non_empty(entry.source_file)) {
        (None, None) => return Err(SOURCE_MISSING),
        (Some(_), Some(_)) => return Err(SOURCE_AMBIGUOUS),
        (Some(folder), None) => Source::Folder(base_dir.join(folder)),
        (None, Some(file)) => Source::File(base_dir.join(file)),
    };

    let destination = match (
        non_empty(entry.destination_folder),
        non_empty(entry.destination_file),
    ) {
        (Some(_), Some(_)) => return Err(DESTINATION_AMBIGUOUS),
        (Some(folder), None) => Destination::Folder(PathBuf::from(folder)),
        (None, Some(file)) => Destination::File(PathBuf::from(file)),
        (None, None) => derive_destination(&source)?,
    };

    match (source, destination) {
        (Source::Folder(_), Destination::File(_)) => Err(FOLDER_TO_FILE),
        (Source::Folder(source), Destination::Folder(folder)) => Ok(BackupEntry::FolderToFolder {
            source,
            destination: backup_path.join(folder),
        }),
        (Source::File(source), Destination::Folder(folder)) => Ok(BackupEntry::FileToFolder {
            source,
            destination: backup_path.join(folder),
        }),
        (Source::File(source), Destination::File(file)) => Ok(BackupEntry::FileToFile {
            source,
            destination: backup_path.join(file),
        }),
    }
}

/// A folder is backed up under its last path segment, a file under its base name.
fn derive_destination(source: &Source) -> std::result::Result<Destination, &'static str> {
    let (path, is_folder) = match source {
        Source::Folder(path) => (path, true),
        Source::File(path) => (path, false),
    };

    let name = PathBuf::from(path.file_name().ok_or(DESTINATION_UNDERIVABLE)?);

    Ok(if is_folder {
        Destination::Folder(name)
    } else {
        Destination::File(name)
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Lower-case every object key, at any depth
fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), normalize_keys(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// `Backup-YYYY-MM-DD`
pub fn default_backup_folder_name(today: NaiveDate) -> String {
    today.format("Backup-%Y-%m-%d").to_string()
}

/// Directory that relative configuration paths are resolved against.
///
/// Debug builds use the current working directory, which is the project
/// folder under `cargo run`. Release builds use the executable's directory.
pub fn base_directory() -> std::io::Result<PathBuf> {
    if cfg!(debug_assertions) {
        return std::env::current_dir();
    }

    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} has no parent directory", exe.display()),
        )
    })
}
