//! Size classification and the group types shared by later stages.
//!
//! # Overview
//!
//! Size classification is the first stage of duplicate detection. Files of
//! different lengths can never be duplicates, so records are partitioned by
//! exact size and singleton classes are dropped before any content is read.
//!
//! Classes keep first-seen order: the class for a size sits where that size
//! was first encountered, and members keep enumeration order. Later stages
//! and the final report inherit this order.
//!
//! # Example
//!
//! ```
//! use find_duplicates::scanner::FileRecord;
//! use find_duplicates::duplicates::classify_by_size;
//!
//! let entries = vec![
//!     Ok(FileRecord::new("/file1.txt", 1024)),
//!     Ok(FileRecord::new("/file2.txt", 1024)),
//!     Ok(FileRecord::new("/file3.txt", 2048)),
//! ];
//!
//! let (classes, stats, errors) = classify_by_size(entries);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(classes.len(), 1);
//! assert!(errors.is_empty());
//! ```

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;

use super::signature::Signature;
use crate::scanner::hardlink::HardlinkTracker;
use crate::scanner::{hash_to_hex, FileRecord, Hash, ScanError};

/// Files sharing one exact size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeClass {
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Position of this size's first member in the input sequence
    pub first_seen: usize,
    /// Members in enumeration order
    pub files: Vec<FileRecord>,
}

impl SizeClass {
    /// Create an empty class for `size`, first seen at input index `first_seen`.
    #[must_use]
    pub fn new(size: u64, first_seen: usize) -> Self {
        Self {
            size,
            first_seen,
            files: Vec::new(),
        }
    }

    /// Add a member.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if the record's size doesn't match the class.
    pub fn add(&mut self, file: FileRecord) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match class size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the class has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if the class could contain duplicates (2+ members).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }

    /// Upper bound on reclaimable space if every member were identical.
    #[must_use]
    pub fn potential_savings(&self) -> u64 {
        self.size * (self.files.len() as u64).saturating_sub(1)
    }
}

/// Size classes with 2+ members, in first-seen order.
pub type SizeClasses = Vec<SizeClass>;

/// Members of one size class that share a fast signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureClass {
    /// Shared file size
    pub size: u64,
    /// Shared fast signature
    pub signature: Signature,
    /// Members in size-class order
    pub files: Vec<FileRecord>,
}

impl SignatureClass {
    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the class has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A confirmed set of byte-identical files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Fast signature shared by all members
    pub signature: Signature,
    /// BLAKE3 digest of the content, when verification computed one
    pub digest: Option<Hash>,
    /// Members in first-seen order (at least two)
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(size: u64, signature: Signature, digest: Option<Hash>, files: Vec<FileRecord>) -> Self {
        Self {
            size,
            signature,
            digest,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Space held by every copy beyond the first.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> Option<String> {
        self.digest.as_ref().map(hash_to_hex)
    }

    /// Member paths in group order.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Statistics from size classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Records considered (after error entries and repeated paths are dropped)
    pub total_files: usize,
    /// Total size of all considered records in bytes
    pub total_size: u64,
    /// Entries whose size could not be determined
    pub skipped: usize,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files in classes of 2+
    pub potential_duplicates: usize,
    /// Number of files eliminated as the only file of their size
    pub eliminated_unique: usize,
    /// Number of zero-byte files
    pub empty_files: usize,
    /// Number of size classes with 2+ files
    pub duplicate_size_classes: usize,
    /// Paths folded into an earlier record as hard links to it
    pub linked_paths: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Partition records into size classes, dropping singletons.
///
/// Entries that arrive as `Err` are logged, counted in
/// [`GroupingStats::skipped`] and returned separately; they never reach a
/// class. A path seen twice is classified once. A second path to an inode
/// already classified is appended to that record's `links` instead of
/// becoming a member of its own. Zero-byte files are classified like any
/// other size.
#[must_use]
pub fn classify_by_size(
    entries: impl IntoIterator<Item = Result<FileRecord, ScanError>>,
) -> (SizeClasses, GroupingStats, Vec<ScanError>) {
    let mut classes: Vec<SizeClass> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut seen_paths: HashSet<PathBuf> = HashSet::new();
    let mut hardlinks = HardlinkTracker::new();
    let mut stats = GroupingStats::default();
    let mut errors = Vec::new();

    for entry in entries {
        let file = match entry {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                stats.skipped += 1;
                errors.push(e);
                continue;
            }
        };

        if !seen_paths.insert(file.identity_key()) {
            log::debug!("Ignoring repeated path: {}", file.path);
            continue;
        }

        if let Some(id) = file.file_id() {
            let slot = index.get(&file.size).copied().unwrap_or(classes.len());
            let member = classes.get(slot).map_or(0, SizeClass::len);
            if let Some((class, first)) = hardlinks.register(id, (slot, member)) {
                let owner = &mut classes[class].files[first];
                log::debug!("Hard link {} -> {}", file.path, owner.path);
                owner.links.push(file.path);
                stats.linked_paths += 1;
                continue;
            }
        }

        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }

        let slot = *index.entry(file.size).or_insert_with(|| {
            classes.push(SizeClass::new(file.size, stats.total_files - 1));
            classes.len() - 1
        });
        classes[slot].add(file);
    }

    stats.unique_sizes = classes.len();

    classes.retain(|class| {
        if class.has_duplicates() {
            stats.potential_duplicates += class.len();
            stats.duplicate_size_classes += 1;
            log::debug!(
                "Size class {} bytes: {} potential duplicates",
                class.size,
                class.len()
            );
            true
        } else {
            stats.eliminated_unique += 1;
            log::trace!("Eliminated unique size {}: {}", class.size, class.files[0].path);
            false
        }
    });

    log::info!(
        "Size classification: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (classes, stats, errors)
}
