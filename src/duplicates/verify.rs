//! Content verification: the authoritative last stage of the funnel.
//!
//! Files that share a size and a fast signature are only candidates. This
//! stage proves identity either by a full BLAKE3 digest or by comparing the
//! bytes directly, and emits [`DuplicateGroup`]s whose members are exactly
//! the files with identical content.

use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::groups::{DuplicateGroup, SignatureClass};
use crate::scanner::{FileRecord, Hash, HashError, Hasher};

/// How candidates are confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyStrategy {
    /// Group by equal BLAKE3 digest of the full content.
    #[default]
    Digest,
    /// Compare each candidate byte for byte against bucket representatives.
    ByteCompare,
}

impl VerifyStrategy {
    /// Strategy selected by the `--paranoid` switch.
    #[must_use]
    pub fn from_paranoid(paranoid: bool) -> Self {
        if paranoid {
            Self::ByteCompare
        } else {
            Self::Digest
        }
    }
}

impl fmt::Display for VerifyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest => write!(f, "digest"),
            Self::ByteCompare => write!(f, "byte-compare"),
        }
    }
}

/// Statistics from the verification stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyStats {
    /// Candidate files submitted
    pub input_files: usize,
    /// Files read successfully: digested, or taking part in at least one
    /// byte comparison
    pub verified: usize,
    /// Files that could not be read
    pub failed: usize,
    /// Candidates whose signature matched but content did not
    pub false_candidates: usize,
    /// Confirmed groups
    pub groups: usize,
    /// Files in confirmed groups
    pub duplicates: usize,
    /// Bytes read to produce digests (zero for byte comparison)
    pub bytes_hashed: u64,
}

impl VerifyStats {
    /// Fold another class's statistics into this one.
    pub fn merge(&mut self, other: &Self) {
        self.input_files += other.input_files;
        self.verified += other.verified;
        self.failed += other.failed;
        self.false_candidates += other.false_candidates;
        self.groups += other.groups;
        self.duplicates += other.duplicates;
        self.bytes_hashed += other.bytes_hashed;
    }
}

/// Confirm one signature class.
///
/// Returns the groups of byte-identical members (2+ each, ordered by first
/// member), the statistics and one error per unreadable file. A file that
/// fails to read is excluded; a group that drops below two members is not
/// reported. Always runs to completion.
pub fn verify_signature_class(
    class: &SignatureClass,
    strategy: VerifyStrategy,
    hasher: &Hasher,
    on_item: &(dyn Fn(&FileRecord) + Sync),
) -> (Vec<DuplicateGroup>, VerifyStats, Vec<HashError>) {
    let (buckets, mut stats, errors) = match strategy {
        VerifyStrategy::Digest => digest_buckets(&class.files, hasher, on_item),
        VerifyStrategy::ByteCompare => compare_buckets(&class.files, hasher, on_item),
    };

    let mut groups = Vec::new();
    for (digest, files) in buckets {
        if files.len() > 1 {
            stats.groups += 1;
            stats.duplicates += files.len();
            groups.push(DuplicateGroup::new(class.size, class.signature, digest, files));
        } else {
            stats.false_candidates += files.len();
        }
    }

    log::debug!(
        "Signature class {} ({} bytes): {} group(s) confirmed by {}",
        class.signature,
        class.size,
        stats.groups,
        strategy
    );

    (groups, stats, errors)
}

type Buckets = Vec<(Option<Hash>, Vec<FileRecord>)>;

/// Hash every member in parallel and bucket by digest.
fn digest_buckets(
    files: &[FileRecord],
    hasher: &Hasher,
    on_item: &(dyn Fn(&FileRecord) + Sync),
) -> (Buckets, VerifyStats, Vec<HashError>) {
    let mut stats = VerifyStats {
        input_files: files.len(),
        ..Default::default()
    };

    let results: Vec<(&FileRecord, Result<Hash, HashError>)> = files
        .par_iter()
        .map(|file| {
            on_item(file);
            (file, hasher.full_hash(file.as_path()))
        })
        .collect();

    let mut buckets: Buckets = Vec::new();
    let mut index: HashMap<Hash, usize> = HashMap::new();
    let mut errors = Vec::new();

    for (file, result) in results {
        match result {
            Ok(digest) => {
                stats.verified += 1;
                stats.bytes_hashed += file.size;
                let slot = *index.entry(digest).or_insert_with(|| {
                    buckets.push((Some(digest), Vec::new()));
                    buckets.len() - 1
                });
                buckets[slot].1.push(file.clone());
            }
            Err(e) => {
                log::warn!("Failed to verify content: {}", e);
                stats.failed += 1;
                errors.push(e);
            }
        }
    }

    (buckets, stats, errors)
}

/// Compare each member against the representative (first member) of every
/// existing bucket, opening a new bucket when nothing matches.
///
/// If a representative becomes unreadable it is dropped and the next member
/// of its bucket takes over. A member that never met another readable file
/// was not read and is not counted as verified.
fn compare_buckets(
    files: &[FileRecord],
    hasher: &Hasher,
    on_item: &(dyn Fn(&FileRecord) + Sync),
) -> (Buckets, VerifyStats, Vec<HashError>) {
    let mut stats = VerifyStats {
        input_files: files.len(),
        ..Default::default()
    };
    let mut buckets: Vec<Vec<usize>> = Vec::new();
    let mut compared = vec![false; files.len()];
    let mut errors = Vec::new();

    'members: for (member, file) in files.iter().enumerate() {
        on_item(file);

        let mut i = 0;
        while i < buckets.len() {
            while let Some(&representative) = buckets[i].first() {
                match hasher.files_identical(files[representative].as_path(), file.as_path()) {
                    Ok(identical) => {
                        compared[representative] = true;
                        compared[member] = true;
                        if identical {
                            buckets[i].push(member);
                            continue 'members;
                        }
                        break;
                    }
                    Err(e) if e.path() == file.as_path() => {
                        log::warn!("Failed to verify content: {}", e);
                        stats.failed += 1;
                        errors.push(e);
                        continue 'members;
                    }
                    Err(e) => {
                        log::warn!("Dropping unreadable representative: {}", e);
                        stats.failed += 1;
                        errors.push(e);
                        buckets[i].remove(0);
                    }
                }
            }

            if buckets[i].is_empty() {
                buckets.remove(i);
            } else {
                i += 1;
            }
        }

        buckets.push(vec![member]);
    }

    stats.verified = buckets.iter().flatten().filter(|&&m| compared[m]).count();
    let buckets = buckets
        .into_iter()
        .map(|members| (None, members.into_iter().map(|m| files[m].clone()).collect()))
        .collect();
    (buckets, stats, errors)
}
