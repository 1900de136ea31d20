pub mod dedup;
pub mod error;
pub mod grouping;
pub mod hasher;
pub mod logging;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod utils;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub use dedup::{Aggregator, DedupAnalysis};
pub use error::{HashError, ReportError, ScanError};
pub use grouping::{group_by_size, SizeBuckets};
pub use hasher::{default_workers, hash_file, HashObserver, HasherPool, DEFAULT_CHUNK_SIZE};
pub use report::{write_report, ReportFormat};
pub use scanner::{list_files, ScanConfig, ScanOutcome, ScanStats, Scanner};

/// A regular file discovered by the walker.
///
/// `size` is the stat snapshot taken during the walk and is not re-validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// 256-bit BLAKE3 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; blake3::OUT_LEN]);

impl Digest {
    /// Lowercase hex form; sorts the same way as the raw bytes.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl From<blake3::Hash> for Digest {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Outcome of hashing one candidate. Exactly one is produced per candidate.
#[derive(Debug)]
pub struct HashResult {
    pub path: PathBuf,
    pub size: u64,
    pub outcome: Result<Digest, HashError>,
}

impl HashResult {
    pub fn digest(&self) -> Option<Digest> {
        self.outcome.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&HashError> {
        self.outcome.as_ref().err()
    }
}

/// One member of a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DuplicateFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Final scan output: digest to the files sharing it, each list sorted by path
/// and holding at least two members.
pub type DuplicateGroups = BTreeMap<Digest, Vec<DuplicateFile>>;
