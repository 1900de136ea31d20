use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use walkdir::WalkDir;

use crate::utils::is_readable;
use crate::{
    default_workers, group_by_size, Aggregator, DuplicateGroups, FileEntry, HashObserver,
    HasherPool, ScanError, DEFAULT_CHUNK_SIZE,
};

/// Configuration for a duplicate scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of hashing workers
    pub workers: usize,
    /// Read size used while hashing
    pub chunk_size: usize,
    pub min_size: u64,
    pub max_size: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_size: 0,
            max_size: None,
        }
    }
}

impl ScanConfig {
    fn accepts_size(&self, size: u64) -> bool {
        size >= self.min_size && self.max_size.map_or(true, |max| size <= max)
    }
}

/// Counters collected over one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Regular, readable files found by the walk
    pub files_found: usize,
    /// Files sharing their size with at least one other file
    pub candidates: usize,
    pub hashed: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Result of a completed scan
#[derive(Debug)]
pub struct ScanOutcome {
    pub groups: DuplicateGroups,
    pub stats: ScanStats,
}

/// Scanner for finding duplicate files
pub struct Scanner {
    config: ScanConfig,
    observer: Option<Arc<dyn HashObserver>>,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn HashObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Scan `root` for duplicate files.
    ///
    /// Fails only when `root` is missing, is not a directory, or the worker
    /// pool cannot start. Per-file problems shrink the result instead.
    pub fn scan(&self, root: &Path) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();
        let root = validate_root(root)?;

        let files = self.collect_files(&root);
        let files_found = files.len();
        log::info!("Found {} files under {}", files_found, root.display());

        let buckets = group_by_size(files);
        let candidates = buckets.candidates();
        log::info!(
            "{} candidates share a size with another file",
            candidates.len()
        );

        let stats = ScanStats {
            files_found,
            candidates: candidates.len(),
            ..Default::default()
        };

        let mut pool = HasherPool::new(self.config.workers, self.config.chunk_size);
        if let Some(observer) = &self.observer {
            pool = pool.with_observer(Arc::clone(observer));
        }

        let mut aggregator = Aggregator::new();
        pool.run(candidates, |result| aggregator.add(result))?;

        let stats = ScanStats {
            hashed: aggregator.hashed(),
            failed: aggregator.failed(),
            elapsed: start.elapsed(),
            ..stats
        };
        let groups = aggregator.finish();
        log::info!("Found {} duplicate groups", groups.len());

        Ok(ScanOutcome { groups, stats })
    }

    fn collect_files(&self, root: &Path) -> Vec<FileEntry> {
        list_files(root)
            .into_iter()
            .filter(|entry| self.config.accepts_size(entry.size))
            .collect()
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

/// Check the scan root and resolve it to an absolute path.
fn validate_root(root: &Path) -> Result<PathBuf, ScanError> {
    let metadata = fs::metadata(root).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => ScanError::RootNotFound(root.to_path_buf()),
        _ => ScanError::Root {
            path: root.to_path_buf(),
            source,
        },
    })?;

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    fs::canonicalize(root).map_err(|source| ScanError::Root {
        path: root.to_path_buf(),
        source,
    })
}

/// Recursively list every regular, readable file under `root`.
///
/// Symbolic links are neither followed nor reported. Entries that fail to
/// stat, or whose permission bits deny reading, are skipped. No file is
/// opened here.
pub fn list_files(root: &Path) -> Vec<FileEntry> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                log::debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };

        if !is_readable(&metadata) {
            log::debug!("Skipping unreadable file {}", entry.path().display());
            continue;
        }

        files.push(FileEntry::new(entry.into_path(), metadata.len()));
    }

    files
}
