//! Fast signatures: the cheap second stage of the funnel.
//!
//! Every member of a size class is signed, members are grouped by equal
//! signature, and signature classes with a single member are dropped. A
//! signature is never proof of identity; equal signatures only nominate files
//! for [`verify`](super::verify).

use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::groups::{SignatureClass, SizeClass};
use crate::scanner::{hash_to_hex, FileRecord, Hash, HashError, Hasher};

/// Which fast signature to compute.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMode {
    /// Adler-32 over the whole file.
    #[default]
    Checksum,
    /// BLAKE3 over the first 4 KiB only.
    Prefix,
}

impl fmt::Display for SignatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checksum => write!(f, "checksum"),
            Self::Prefix => write!(f, "prefix"),
        }
    }
}

/// A computed fast signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// Adler-32 of the full content
    Checksum(u32),
    /// BLAKE3 of the leading bytes
    Prefix(Hash),
}

impl Signature {
    /// Human-readable name of the signature kind.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checksum(_) => "checksum",
            Self::Prefix(_) => "prefix hash",
        }
    }

    /// The mode that produces this kind of signature.
    #[must_use]
    pub fn mode(&self) -> SignatureMode {
        match self {
            Self::Checksum(_) => SignatureMode::Checksum,
            Self::Prefix(_) => SignatureMode::Prefix,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checksum(value) => write!(f, "{value}"),
            Self::Prefix(hash) => write!(f, "{}", hash_to_hex(hash)),
        }
    }
}

/// Compute the signature of one file.
///
/// # Errors
///
/// Returns a [`HashError`] if the file cannot be read.
pub fn compute_signature(
    hasher: &Hasher,
    mode: SignatureMode,
    file: &FileRecord,
) -> Result<Signature, HashError> {
    match mode {
        SignatureMode::Checksum => hasher.checksum(file.as_path()).map(Signature::Checksum),
        SignatureMode::Prefix => hasher.prehash(file.as_path()).map(Signature::Prefix),
    }
}

/// Statistics from the signature stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignatureStats {
    /// Files submitted for signing
    pub input_files: usize,
    /// Files signed successfully
    pub signed: usize,
    /// Files that could not be read
    pub failed: usize,
    /// Files dropped because their signature was unique in their size class
    pub eliminated: usize,
    /// Signature classes with 2+ members
    pub signature_classes: usize,
    /// Files remaining in those classes
    pub candidates: usize,
}

impl SignatureStats {
    /// Fold another class's statistics into this one.
    pub fn merge(&mut self, other: &Self) {
        self.input_files += other.input_files;
        self.signed += other.signed;
        self.failed += other.failed;
        self.eliminated += other.eliminated;
        self.signature_classes += other.signature_classes;
        self.candidates += other.candidates;
    }

    /// Percentage of signed files eliminated.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            (self.eliminated as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Sign every member of `class` and group by equal signature.
///
/// Signing fans out over the current rayon pool; results are collected in
/// member order so the returned classes are deterministic. `on_item` is
/// invoked once per member from the worker that signs it.
///
/// Returns the signature classes with 2+ members (ordered by their first
/// member), the stage statistics and one error per unreadable file.
pub fn sign_size_class(
    class: &SizeClass,
    mode: SignatureMode,
    hasher: &Hasher,
    on_item: &(dyn Fn(&FileRecord) + Sync),
) -> (Vec<SignatureClass>, SignatureStats, Vec<HashError>) {
    let mut stats = SignatureStats {
        input_files: class.len(),
        ..Default::default()
    };

    let results: Vec<(&FileRecord, Result<Signature, HashError>)> = class
        .files
        .par_iter()
        .map(|file| {
            on_item(file);
            (file, compute_signature(hasher, mode, file))
        })
        .collect();

    let mut buckets: Vec<SignatureClass> = Vec::new();
    let mut index: HashMap<Signature, usize> = HashMap::new();
    let mut errors = Vec::new();

    for (file, result) in results {
        match result {
            Ok(signature) => {
                stats.signed += 1;
                log::trace!("{} {} for {}", signature.label(), signature, file.path);
                let slot = *index.entry(signature).or_insert_with(|| {
                    buckets.push(SignatureClass {
                        size: class.size,
                        signature,
                        files: Vec::new(),
                    });
                    buckets.len() - 1
                });
                buckets[slot].files.push(file.clone());
            }
            Err(e) => {
                log::warn!("Failed to compute {} signature: {}", mode, e);
                stats.failed += 1;
                errors.push(e);
            }
        }
    }

    buckets.retain(|bucket| {
        if bucket.len() > 1 {
            stats.signature_classes += 1;
            stats.candidates += bucket.len();
            true
        } else {
            stats.eliminated += bucket.len();
            false
        }
    });

    log::debug!(
        "Size class {} bytes: {} of {} files share a {} signature",
        class.size,
        stats.candidates,
        stats.input_files,
        mode
    );

    (buckets, stats, errors)
}
