//! Streaming file hasher.
//!
//! # Overview
//!
//! [`Hasher`] computes a 32-byte content digest by reading a file in
//! fixed-size chunks, so peak memory is bounded by the chunk size no matter
//! how large the file is. Two digests are supported:
//!
//! - [`HashAlgorithm::Blake3`] (default)
//! - [`HashAlgorithm::Sha256`], matching `sha256sum` output
//!
//! # Example
//!
//! ```no_run
//! use dupesort::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let hash = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::Digest;

use super::HashError;

/// A 32-byte content digest.
pub type Hash = [u8; 32];

/// Default read buffer size (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Smallest accepted chunk size.
const MIN_CHUNK_SIZE: usize = 512;

/// Largest accepted chunk size (64 MiB).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Content digest used for duplicate detection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 (fast, cryptographic)
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Incremental state for one of the supported digests.
enum DigestState {
    Blake3(Box<blake3::Hasher>),
    Sha256(sha2::Sha256),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
            HashAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Blake3(h) => {
                h.update(bytes);
            }
            Self::Sha256(h) => h.update(bytes),
        }
    }

    fn finalize(self) -> Hash {
        match self {
            Self::Blake3(h) => *h.finalize().as_bytes(),
            Self::Sha256(h) => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&h.finalize());
                hash
            }
        }
    }
}

/// Chunked file hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a BLAKE3 hasher with the default chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Select the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the read chunk size in bytes, clamped to 512 B..=64 MiB.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
        self
    }

    /// The configured digest algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The configured chunk size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Hash the entire content of a file.
    ///
    /// The file is opened, read chunk by chunk and closed before returning,
    /// on both the success and the error path.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.hash_reader(file)
            .map_err(|e| HashError::from_io(path, e))
    }

    /// Hash everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates read errors other than `Interrupted`.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> std::io::Result<Hash> {
        let mut state = DigestState::new(self.algorithm);
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => state.update(&buffer[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(state.finalize())
    }

    /// Hash an in-memory byte slice.
    #[must_use]
    pub fn hash_bytes(&self, bytes: &[u8]) -> Hash {
        let mut state = DigestState::new(self.algorithm);
        state.update(bytes);
        state.finalize()
    }
}

/// Format a hash as a lowercase hexadecimal string (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    use std::fmt::Write;

    hash.iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}
