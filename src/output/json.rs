//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "status": "completed",
//!   "duplicates": [
//!     {
//!       "size": 1024,
//!       "signature_kind": "checksum",
//!       "signature": "300286872",
//!       "digest": "abc123...",
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"],
//!       "hard_links": { "/path/to/file1.txt": ["/path/to/link.txt"] }
//!     }
//!   ],
//!   "summary": {
//!     "roots": ["/path/to"],
//!     "total_files": 100,
//!     "linked_paths": 1,
//!     "total_duplicates": 10,
//!     "duplicate_groups": 5,
//!     "duplicate_size_classes": 6,
//!     "skipped": 0,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "errors": [],
//!     "exit_code": 0,
//!     "exit_code_name": "FD000"
//!   },
//!   "stats": { "grouping": {}, "signature": {}, "verify": {} }
//! }
//! ```

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::duplicates::{
    DuplicateGroup, DuplicateReport, GroupingStats, ScanStatus, SignatureStats, VerifyStats,
};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// File size in bytes
    pub size: u64,
    /// "checksum" or "prefix hash"
    pub signature_kind: &'static str,
    /// Fast signature value (decimal checksum or hex prefix hash)
    pub signature: String,
    /// BLAKE3 digest as hexadecimal, when verification computed one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Member paths in group order
    pub files: Vec<String>,
    /// Other hard links of a member, keyed by the member path
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub hard_links: BTreeMap<String, Vec<String>>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            size: group.size,
            signature_kind: group.signature.label(),
            signature: group.signature.to_string(),
            digest: group.digest_hex(),
            files: group.files.iter().map(|f| f.path.clone()).collect(),
            hard_links: group
                .files
                .iter()
                .filter(|f| !f.links.is_empty())
                .map(|f| (f.path.clone(), f.links.clone()))
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Directories that were scanned
    pub roots: Vec<String>,
    /// Records considered after size classification
    pub total_files: usize,
    /// Paths folded into another record as its hard links
    pub linked_paths: usize,
    /// Files that belong to a duplicate group
    pub total_duplicates: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Size classes with two or more members
    pub duplicate_size_classes: usize,
    /// Entries whose size could not be determined
    pub skipped: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Recoverable errors, one message per file
    pub errors: Vec<String>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "FD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a report and an exit code.
    #[must_use]
    pub fn from_report(report: &DuplicateReport, exit_code: ExitCode) -> Self {
        Self {
            roots: report
                .roots
                .iter()
                .map(|r| r.to_string_lossy().into_owned())
                .collect(),
            total_files: report.total_files,
            linked_paths: report.grouping.linked_paths,
            total_duplicates: report.total_duplicates,
            duplicate_groups: report.group_count(),
            duplicate_size_classes: report.duplicate_size_classes,
            skipped: report.skipped,
            reclaimable_space: report.wasted_space(),
            scan_duration_ms: report.duration.as_millis() as u64,
            errors: report.errors.iter().map(ToString::to_string).collect(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Per-stage counters.
#[derive(Debug, Clone, Serialize)]
pub struct JsonStats {
    /// Size classification
    pub grouping: GroupingStats,
    /// Fast signatures
    pub signature: SignatureStats,
    /// Verification
    pub verify: VerifyStats,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// How the scan ended
    pub status: ScanStatus,
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Per-stage counters
    pub stats: JsonStats,
}

impl JsonOutput {
    /// Create a new JSON output from a report and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use find_duplicates::duplicates::DuplicateReport;
    /// use find_duplicates::output::json::JsonOutput;
    /// use find_duplicates::error::ExitCode;
    ///
    /// let output = JsonOutput::new(&DuplicateReport::default(), ExitCode::Success);
    /// assert!(output.duplicates.is_empty());
    /// ```
    #[must_use]
    pub fn new(report: &DuplicateReport, exit_code: ExitCode) -> Self {
        Self {
            status: report.status,
            duplicates: report
                .groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::from_report(report, exit_code),
            stats: JsonStats {
                grouping: report.grouping.clone(),
                signature: report.signature.clone(),
                verify: report.verify.clone(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to (e.g., stdout)
    /// * `pretty` - Whether to pretty-print the output
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        pretty: bool,
    ) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
