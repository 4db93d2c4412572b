//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size classification (stage 1, no I/O)
//! - Fast signatures: checksum or prefix hash (stage 2)
//! - Verification: full digest or byte comparison (stage 3)
//! - The report handed to output formatters

pub mod finder;
pub mod groups;
pub mod report;
pub mod signature;
pub mod verify;

pub use finder::{
    DuplicateFinder, FinderConfig, FinderError, DEFAULT_IO_THREADS, DEFAULT_WARN_THRESHOLD,
};
pub use groups::{
    classify_by_size, DuplicateGroup, GroupingStats, SignatureClass, SizeClass, SizeClasses,
};
pub use report::{DuplicateReport, ScanStatus};
pub use signature::{compute_signature, sign_size_class, Signature, SignatureMode, SignatureStats};
pub use verify::{verify_signature_class, VerifyStats, VerifyStrategy};
