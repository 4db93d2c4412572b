//! Scanner module for directory traversal and file signing.
//!
//! This module provides functionality for:
//! - Directory walking using jwalk (recursive or single-level)
//! - Adler-32 checksums, BLAKE3 prefix hashes and digests
//! - Hardlink detection
//! - Path identity and display forms
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Checksums, digests and byte comparison (streaming)
//! - [`hardlink`]: Inode tracking so one file is never counted twice
//! - [`path_utils`]: Identity keys and display strings for [`FileRecord`]
//!
//! # Example
//!
//! ```no_run
//! use find_duplicates::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let config = WalkerConfig {
//!     recursive: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path, file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hardlink;
pub mod hasher;
pub mod path_utils;
pub mod walker;

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use serde::Serialize;

use hardlink::FileId;

// Re-export main types
pub use hasher::{hash_to_hex, hex_to_hash, Hash, Hasher, MMAP_THRESHOLD, PREHASH_SIZE};
pub use walker::Walker;

/// A regular file discovered during enumeration.
///
/// The OS path is kept as given and every read goes through it. `path` is
/// its display form. Extra names of the same inode end up in `links` during
/// size classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileRecord {
    /// Display form of the path
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// Other hard links to the same data, in discovery order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(skip)]
    os_path: PathBuf,
    #[serde(skip)]
    file_id: Option<FileId>,
}

impl FileRecord {
    /// Create a record from a path and a known size.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let os_path = path.into();
        Self {
            path: path_utils::display_path(&os_path),
            size,
            links: Vec::new(),
            os_path,
            file_id: None,
        }
    }

    /// Create a record from already fetched metadata.
    #[must_use]
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        let mut record = Self::new(path, metadata.len());
        record.file_id = FileId::from_metadata(metadata);
        record
    }

    /// Create a record by querying the file's size on disk.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the path cannot be stat'ed or is not a
    /// regular file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| ScanError::from_io(path, e))?;
        if !metadata.is_file() {
            return Err(ScanError::NotAFile(path.to_path_buf()));
        }
        Ok(Self::from_metadata(path, &metadata))
    }

    /// The path to open when reading this file.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.os_path
    }

    /// Key under which repeated spellings of this path are recognized.
    #[must_use]
    pub fn identity_key(&self) -> PathBuf {
        path_utils::identity_key(&self.os_path)
    }

    /// Inode identity, where the platform provides one.
    #[must_use]
    pub fn file_id(&self) -> Option<FileId> {
        self.file_id
    }

    /// Number of directory entries naming this file.
    #[must_use]
    pub fn name_count(&self) -> usize {
        1 + self.links.len()
    }
}

/// Configuration for directory walking.
///
/// Controls depth, filtering and other walk behavior.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into subdirectories. When false only the direct children of
    /// each root are visited.
    pub recursive: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,

    /// Glob patterns to ignore (gitignore-style).
    pub ignore_patterns: Vec<String>,
}

impl WalkerConfig {
    /// Create a new configuration from CLI arguments.
    #[must_use]
    pub fn new(
        recursive: bool,
        skip_hidden: bool,
        min_size: Option<u64>,
        max_size: Option<u64>,
        ignore_patterns: Vec<String>,
    ) -> Self {
        Self {
            recursive,
            skip_hidden,
            min_size,
            max_size,
            ignore_patterns,
        }
    }
}

/// Errors that can occur while enumerating files or resolving their size.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The path exists but is not a regular file.
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Rendered I/O error
        message: String,
    },

    /// A file could not be read while computing its signature or digest.
    #[error(transparent)]
    HashError(#[from] HashError),
}

impl ScanError {
    /// Classify an I/O error raised for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        }
    }
}

/// Errors that can occur while reading file content.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Rendered I/O error
        message: String,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        }
    }

    /// The file the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
