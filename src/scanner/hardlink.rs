//! Hardlink detection so one file is never reported as its own duplicate.
//!
//! Hardlinks are several directory entries naming the same inode. Their
//! content is identical because it is the same data, so listing them as
//! separate members of a duplicate group would suggest space could be
//! reclaimed when it cannot. Each record carries the [`FileId`] of its inode;
//! size classification keeps the first record per inode and attaches the
//! other names to it as links.
//!
//! # Platform Support
//!
//! - **Unix**: `(device, inode)` pairs from file metadata
//! - **Other**: detection disabled, every path is treated as a distinct file
//!
//! # Example
//!
//! ```no_run
//! use find_duplicates::scanner::hardlink::{FileId, HardlinkTracker};
//!
//! let first = FileId::from_metadata(&std::fs::metadata("original.txt").unwrap()).unwrap();
//! let second = FileId::from_metadata(&std::fs::metadata("link.txt").unwrap()).unwrap();
//!
//! let mut tracker = HardlinkTracker::new();
//! assert_eq!(tracker.register(first, (0, 0)), None);
//! assert_eq!(tracker.register(second, (0, 1)), Some((0, 0)));
//! ```

use std::collections::HashMap;
use std::fs::Metadata;

/// Identity of the data behind a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    dev: u64,
    ino: u64,
}

impl FileId {
    /// Read the identity from metadata, or `None` where the platform has no
    /// inode numbers.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    /// Read the identity from metadata, or `None` where the platform has no
    /// inode numbers.
    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Position of a record: `(size class, member)`.
pub type RecordSlot = (usize, usize);

/// Remembers where the first record of every inode was placed.
///
/// A single tracker is shared across all roots of a scan, so a file reachable
/// from two roots through different links is still counted once.
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    first: HashMap<FileId, RecordSlot>,
}

impl HardlinkTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `slot` for `id` on its first sighting and return `None`;
    /// afterwards return the slot of the first record.
    pub fn register(&mut self, id: FileId, slot: RecordSlot) -> Option<RecordSlot> {
        match self.first.get(&id) {
            Some(first) => Some(*first),
            None => {
                self.first.insert(id, slot);
                None
            }
        }
    }

    /// Number of distinct inodes recorded.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.first.len()
    }

    /// Whether inode tracking works on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}
