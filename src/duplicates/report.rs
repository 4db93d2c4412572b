//! The result of one duplicate scan.
//!
//! A [`DuplicateReport`] is built once, at the end of the pipeline, and is
//! the only thing the core hands to the presentation layer. It never prints.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use super::groups::{DuplicateGroup, GroupingStats};
use super::signature::SignatureStats;
use super::verify::VerifyStats;
use crate::scanner::ScanError;

/// How a scan ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Every stage ran.
    #[default]
    Completed,
    /// The user declined to continue at the pre-flight check.
    Cancelled,
}

/// Confirmed duplicate groups plus scan counters.
///
/// Every record appears in at most one group, and a record without an
/// identical twin appears in none.
#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    /// Groups in size-class first-seen order, then by first member
    pub groups: Vec<DuplicateGroup>,
    /// Records considered after size classification
    pub total_files: usize,
    /// Sum of group sizes
    pub total_duplicates: usize,
    /// Size classes with 2+ members
    pub duplicate_size_classes: usize,
    /// Entries whose size could not be determined
    pub skipped: usize,
    /// Recoverable errors from every stage
    pub errors: Vec<ScanError>,
    /// Directories that were scanned (empty for explicit path lists)
    pub roots: Vec<PathBuf>,
    /// Wall time of the scan
    pub duration: Duration,
    /// How the scan ended
    pub status: ScanStatus,
    /// Size classification statistics
    pub grouping: GroupingStats,
    /// Signature stage statistics, summed across classes
    pub signature: SignatureStats,
    /// Verification stage statistics, summed across classes
    pub verify: VerifyStats,
}

impl DuplicateReport {
    /// Build a completed report from groups and classification statistics.
    ///
    /// `total_duplicates` is derived from the groups.
    #[must_use]
    pub fn new(groups: Vec<DuplicateGroup>, grouping: GroupingStats) -> Self {
        let total_duplicates = groups.iter().map(DuplicateGroup::len).sum();
        Self {
            total_files: grouping.total_files,
            duplicate_size_classes: grouping.duplicate_size_classes,
            skipped: grouping.skipped,
            total_duplicates,
            groups,
            grouping,
            ..Default::default()
        }
    }

    /// Build a cancelled report: no groups, only the counts known so far.
    #[must_use]
    pub fn cancelled(grouping: GroupingStats) -> Self {
        Self {
            status: ScanStatus::Cancelled,
            ..Self::new(Vec::new(), grouping)
        }
    }

    /// Check if the user cancelled the scan.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == ScanStatus::Cancelled
    }

    /// Check if any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Number of confirmed groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Bytes held by every copy beyond the first in each group.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }

    /// Wasted space as human-readable string.
    #[must_use]
    pub fn wasted_space_display(&self) -> String {
        bytesize::ByteSize::b(self.wasted_space()).to_string()
    }
}
