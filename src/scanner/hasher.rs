//! File content readers: checksums, BLAKE3 hashes and byte comparison.
//!
//! # Overview
//! This module provides the [`Hasher`] struct used by every content stage of
//! the pipeline:
//!
//! - [`Hasher::checksum`]: Adler-32 over the whole file (fast signature)
//! - [`Hasher::prehash`]: BLAKE3 over the first [`PREHASH_SIZE`] bytes
//!   (partial-read fast signature)
//! - [`Hasher::full_hash`]: BLAKE3 over the whole file (verification digest)
//! - [`Hasher::files_identical`]: chunked byte-for-byte comparison
//!
//! All readers stream through a fixed buffer; files at or above
//! [`MMAP_THRESHOLD`] are memory-mapped for the full digest.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::HashError;

/// BLAKE3 output (32 bytes).
pub type Hash = [u8; 32];

/// Number of leading bytes covered by [`Hasher::prehash`].
pub const PREHASH_SIZE: usize = 4096;

/// Files at or above this size are memory-mapped for the full digest.
pub const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Default read buffer (64 KiB).
const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Streaming content reader.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 64 KiB buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Use a custom read buffer size (minimum 4 KiB).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(PREHASH_SIZE);
        self
    }

    /// Current read buffer size.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn open(path: &Path) -> Result<File, HashError> {
        File::open(path).map_err(|e| HashError::from_io(path, e))
    }

    /// Adler-32 checksum of the entire file.
    ///
    /// Cheap per byte but not collision resistant: equal checksums only
    /// nominate files for verification.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    pub fn checksum(&self, path: &Path) -> Result<u32, HashError> {
        let file = Self::open(path)?;
        let reader = BufReader::with_capacity(self.buffer_size, file);
        adler32::adler32(reader).map_err(|e| HashError::from_io(path, e))
    }

    /// BLAKE3 hash of the first [`PREHASH_SIZE`] bytes.
    ///
    /// For files no larger than [`PREHASH_SIZE`] this equals
    /// [`full_hash`](Self::full_hash).
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    pub fn prehash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = Self::open(path)?;
        let mut head = Vec::with_capacity(PREHASH_SIZE);
        file.take(PREHASH_SIZE as u64)
            .read_to_end(&mut head)
            .map_err(|e| HashError::from_io(path, e))?;
        Ok(*blake3::hash(&head).as_bytes())
    }

    /// BLAKE3 hash of the entire file.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened, mapped or read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = Self::open(path)?;
        let size = file
            .metadata()
            .map_err(|e| HashError::from_io(path, e))?
            .len();

        let mut hasher = blake3::Hasher::new();
        if size >= MMAP_THRESHOLD {
            log::trace!("Memory-mapping {} ({} bytes)", path.display(), size);
            hasher
                .update_mmap(path)
                .map_err(|e| HashError::from_io(path, e))?;
        } else {
            let reader = BufReader::with_capacity(self.buffer_size, file);
            hasher
                .update_reader(reader)
                .map_err(|e| HashError::from_io(path, e))?;
        }
        Ok(*hasher.finalize().as_bytes())
    }

    /// Compare two files byte for byte.
    ///
    /// Returns `Ok(false)` at the first differing chunk or if one file ends
    /// before the other.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] naming whichever file failed to open or read.
    pub fn files_identical(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let mut file_a = Self::open(a)?;
        let mut file_b = Self::open(b)?;
        let mut buf_a = vec![0u8; self.buffer_size];
        let mut buf_b = vec![0u8; self.buffer_size];

        loop {
            let read_a = fill_buffer(&mut file_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
            let read_b = fill_buffer(&mut file_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;

            if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
                return Ok(false);
            }
            if read_a == 0 {
                return Ok(true);
            }
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill_buffer(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Render a hash as 64 lowercase hex characters.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Parse 64 hex characters back into a hash.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}
