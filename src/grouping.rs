//! Size-based pre-filtering.
//!
//! Files of different length can never be identical, so every size shared
//! by a single file is discarded before any content is read.

use std::collections::BTreeMap;

use crate::FileEntry;

/// Files bucketed by exact byte size, each bucket in discovery order.
#[derive(Debug, Default)]
pub struct SizeBuckets {
    buckets: BTreeMap<u64, Vec<FileEntry>>,
}

impl SizeBuckets {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, size: u64) -> Option<&[FileEntry]> {
        self.buckets.get(&size).map(Vec::as_slice)
    }

    /// Number of files sitting in buckets with two or more members.
    pub fn candidate_count(&self) -> usize {
        self.buckets
            .values()
            .filter(|files| files.len() > 1)
            .map(Vec::len)
            .sum()
    }

    /// Consume the buckets, keeping only members of buckets with 2+ files.
    pub fn candidates(self) -> Vec<FileEntry> {
        self.buckets
            .into_values()
            .filter(|files| files.len() > 1)
            .flatten()
            .collect()
    }
}

/// Bucket files by size in a single pass.
pub fn group_by_size(files: impl IntoIterator<Item = FileEntry>) -> SizeBuckets {
    let mut buckets: BTreeMap<u64, Vec<FileEntry>> = BTreeMap::new();

    for file in files {
        buckets.entry(file.size).or_default().push(file);
    }

    SizeBuckets { buckets }
}
