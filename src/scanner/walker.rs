//! Directory walker built on jwalk.
//!
//! # Overview
//!
//! [`Walker`] enumerates the regular files under one or more roots and turns
//! each into a [`FileRecord`]. Directory reads run in parallel on jwalk's
//! pool, while entries are yielded in a deterministic order (roots in the
//! order given, children sorted by name).
//!
//! # Filtering
//!
//! - Only the direct children of each root unless `recursive` is set
//! - Symlinks and special files are skipped, never followed
//! - Every record carries its inode [`FileId`](super::hardlink::FileId), so
//!   hardlinks can be folded during size classification
//! - Optional hidden-file, size and gitignore-style pattern filters
//!
//! Unreadable entries are yielded as [`ScanError`] values rather than ending
//! the walk.
//!
//! # Example
//!
//! ```no_run
//! use find_duplicates::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let config = WalkerConfig {
//!     recursive: true,
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")], config);
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileRecord, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Enumerates regular files under a set of roots.
pub struct Walker {
    roots: Vec<PathBuf>,
    config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("roots", &self.roots)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag.is_some())
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Walker {
    /// Create a walker over `roots`, visited in the given order.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            roots,
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Stop yielding entries once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Report each discovered file to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Roots this walker visits.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Build the ignore matcher for one root, or `None` without patterns.
    fn build_gitignore(&self, root: &Path) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    fn passes_size_filter(&self, size: u64) -> bool {
        if self.config.min_size.is_some_and(|min| size < min) {
            return false;
        }
        if self.config.max_size.is_some_and(|max| size > max) {
            return false;
        }
        true
    }

    /// Configure jwalk for one root.
    fn walk_dir(&self, root: &Path) -> WalkDir {
        let gitignore = self.build_gitignore(root);

        let mut walk_dir = WalkDir::new(root)
            .follow_links(false)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(move |_depth, _path, _state, children| {
                // Pruning an ignored directory here keeps jwalk from reading it.
                if let Some(gi) = &gitignore {
                    children.retain(|child| match child {
                        Ok(entry) => {
                            let ignored = gi
                                .matched(entry.path(), entry.file_type().is_dir())
                                .is_ignore();
                            if ignored {
                                log::trace!("Ignoring {}", entry.path().display());
                            }
                            !ignored
                        }
                        Err(_) => true,
                    });
                }
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        if !self.config.recursive {
            walk_dir = walk_dir.max_depth(1);
        }
        walk_dir
    }

    /// Walk every root, yielding file records.
    ///
    /// Each call restarts the traversal. Errors are yielded as [`ScanError`] values and do not stop iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let mut discovered = 0usize;

        self.roots
            .iter()
            .flat_map(move |root| {
                log::debug!("Walking {}", root.display());
                self.walk_dir(root)
            })
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry| {
                let result = match entry {
                    Ok(entry) => {
                        if entry.depth == 0 {
                            return None;
                        }
                        let file_type = entry.file_type();
                        if file_type.is_dir() {
                            return None;
                        }
                        let path = entry.path();
                        if file_type.is_symlink() {
                            log::trace!("Skipping symlink: {}", path.display());
                            return None;
                        }
                        self.process_file(&path)?
                    }
                    Err(e) => Err(Self::convert_jwalk_error(&e)),
                };

                if let (Ok(record), Some(callback)) = (&result, &self.progress_callback) {
                    discovered += 1;
                    callback.on_progress(discovered, &record.path);
                }
                Some(result)
            })
    }

    /// Stat a candidate and apply the file-level filters.
    fn process_file(&self, path: &Path) -> Option<Result<FileRecord, ScanError>> {
        let metadata = match std::fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) => {
                let err = ScanError::from_io(path, e);
                log::warn!("{}", err);
                return Some(Err(err));
            }
        };

        if !metadata.is_file() {
            log::trace!("Skipping special file: {}", path.display());
            return None;
        }

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!("Skipping file due to size filter ({}): {}", size, path.display());
            return None;
        }

        Some(Ok(FileRecord::from_metadata(path, &metadata)))
    }

    fn convert_jwalk_error(error: &jwalk::Error) -> ScanError {
        let path = error.path().map(Path::to_path_buf).unwrap_or_default();
        let err = match error.io_error() {
            Some(io) => ScanError::from_io(&path, std::io::Error::new(io.kind(), io.to_string())),
            None => ScanError::Io {
                path,
                message: error.to_string(),
            },
        };
        log::warn!("Walker error: {}", err);
        err
    }
}
