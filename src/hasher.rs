//! Concurrent content hashing of size-collision candidates.
//!
//! Candidates are spread over a dedicated rayon pool. Each worker owns one
//! file handle and one read buffer at a time; finished [`HashResult`]s are
//! sent over a channel to the calling thread, which is the only consumer.
//! Results therefore arrive in completion order, not submission order.

use std::fs::File;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;

use rayon::prelude::*;

use crate::{Digest, FileEntry, HashError, HashResult, ScanError};

/// Read size per `read` call while hashing.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

const MIN_WORKERS: usize = 8;
const WORKERS_PER_CORE: usize = 5;

/// Worker count for an I/O-bound pool: `max(8, cores * 5)`.
pub fn default_workers() -> usize {
    let cores = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    MIN_WORKERS.max(cores * WORKERS_PER_CORE)
}

/// Stream a file through BLAKE3 in `chunk_size` reads.
pub fn hash_file(path: &Path, chunk_size: usize) -> Result<Digest, HashError> {
    let mut file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0; chunk_size.max(1)];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashError::from_io(path.to_path_buf(), e)),
        };

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().into())
}

/// Hook invoked by hashing workers.
///
/// `on_start` and `on_complete` run on worker threads, concurrently and in no
/// particular order.
pub trait HashObserver: Send + Sync {
    /// Called once on the dispatching thread before any worker starts.
    fn on_batch_start(&self, _candidates: usize) {}

    /// A worker is about to read `entry`.
    fn on_start(&self, _entry: &FileEntry) {}

    /// A worker finished with a candidate, successfully or not.
    fn on_complete(&self, _result: &HashResult) {}
}

/// Bounded pool of hashing workers.
pub struct HasherPool {
    workers: usize,
    chunk_size: usize,
    observer: Option<Arc<dyn HashObserver>>,
}

impl HasherPool {
    pub fn new(workers: usize, chunk_size: usize) -> Self {
        Self {
            workers: workers.max(1),
            chunk_size: chunk_size.max(1),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn HashObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Hash every candidate, handing each result to `sink` on the calling
    /// thread as soon as its worker finishes.
    ///
    /// Blocks until all candidates have produced a result. Returns the number
    /// of results delivered, which always equals `candidates.len()`.
    pub fn run<F>(&self, candidates: Vec<FileEntry>, mut sink: F) -> Result<usize, ScanError>
    where
        F: FnMut(HashResult),
    {
        if candidates.is_empty() {
            return Ok(0);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("hasher-{}", i))
            .build()?;

        log::debug!(
            "Hashing {} candidates with {} workers ({} byte reads)",
            candidates.len(),
            self.workers,
            self.chunk_size
        );

        if let Some(observer) = &self.observer {
            observer.on_batch_start(candidates.len());
        }

        let (tx, rx) = mpsc::channel();
        let mut delivered = 0;

        thread::scope(|scope| {
            scope.spawn(move || {
                pool.install(|| {
                    candidates.into_par_iter().for_each_with(tx, |tx, entry| {
                        // The receiver outlives every sender.
                        let _ = tx.send(self.hash_entry(entry));
                    });
                });
            });

            for result in rx {
                delivered += 1;
                sink(result);
            }
        });

        Ok(delivered)
    }

    /// Hash every candidate and collect the results in completion order.
    pub fn hash_all(&self, candidates: Vec<FileEntry>) -> Result<Vec<HashResult>, ScanError> {
        let mut results = Vec::with_capacity(candidates.len());
        self.run(candidates, |result| results.push(result))?;
        Ok(results)
    }

    fn hash_entry(&self, entry: FileEntry) -> HashResult {
        if let Some(observer) = &self.observer {
            observer.on_start(&entry);
        }

        let outcome = hash_file(&entry.path, self.chunk_size);
        match &outcome {
            Ok(digest) => log::trace!("Hashed {}: {}", entry.path.display(), digest),
            Err(e) => log::warn!("Skipping candidate: {}", e),
        }

        let result = HashResult {
            path: entry.path,
            size: entry.size,
            outcome,
        };

        if let Some(observer) = &self.observer {
            observer.on_complete(&result);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Default)]
    struct Counter {
        batches: AtomicUsize,
        started: AtomicUsize,
        completed: AtomicUsize,
    }

    impl HashObserver for Counter {
        fn on_batch_start(&self, _candidates: usize) {
            self.batches.fetch_add(1, Ordering::SeqCst);
        }

        fn on_start(&self, _entry: &FileEntry) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_complete(&self, _result: &HashResult) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_default_workers_floor() {
        assert!(default_workers() >= MIN_WORKERS);
    }

    #[test]
    fn test_hash_file_matches_blake3() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"hello").unwrap();

        let digest = hash_file(&path, DEFAULT_CHUNK_SIZE).unwrap();
        assert_eq!(digest, Digest::from(blake3::hash(b"hello")));
    }

    #[test]
    fn test_hash_file_small_chunks_same_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let content: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();

        let whole = hash_file(&path, DEFAULT_CHUNK_SIZE).unwrap();
        let chunked = hash_file(&path, 7).unwrap();
        assert_eq!(whole, chunked);
        assert_eq!(whole, Digest::from(blake3::hash(&content)));
    }

    #[test]
    fn test_hash_file_missing() {
        let dir = tempdir().unwrap();
        let err = hash_file(&dir.path().join("gone"), DEFAULT_CHUNK_SIZE).unwrap_err();
        assert!(matches!(err, HashError::NotFound(_)));
    }

    #[test]
    fn test_pool_clamps_zero_values() {
        let pool = HasherPool::new(0, 0);
        assert_eq!(pool.workers(), 1);
        assert_eq!(pool.chunk_size(), 1);
    }

    #[test]
    fn test_run_produces_one_result_per_candidate() {
        let dir = tempdir().unwrap();
        let mut candidates = Vec::new();
        for i in 0..40 {
            let path = dir.path().join(format!("f{}.txt", i));
            fs::write(&path, format!("{:04}", i % 4)).unwrap();
            candidates.push(FileEntry::new(path, 4));
        }
        candidates.push(FileEntry::new(dir.path().join("missing.txt"), 4));

        let counter = Arc::new(Counter::default());
        let pool = HasherPool::new(8, 2).with_observer(counter.clone());
        let results = pool.hash_all(candidates).unwrap();

        assert_eq!(results.len(), 41);
        assert_eq!(counter.batches.load(Ordering::SeqCst), 1);
        assert_eq!(counter.started.load(Ordering::SeqCst), 41);
        assert_eq!(counter.completed.load(Ordering::SeqCst), 41);

        let failed: Vec<_> = results.iter().filter(|r| r.digest().is_none()).collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].path.ends_with("missing.txt"));
        assert!(matches!(failed[0].error(), Some(HashError::NotFound(_))));

        let distinct: HashSet<_> = results.iter().filter_map(HashResult::digest).collect();
        assert_eq!(distinct.len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let mut candidates = Vec::new();
        for name in ["a.txt", "b.txt", "c.txt"] {
            let path = dir.path().join(name);
            fs::write(&path, b"hello").unwrap();
            candidates.push(FileEntry::new(path, 5));
        }

        let locked = dir.path().join("c.txt");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&locked).is_ok() {
            // Running with privileges that bypass mode bits.
            return;
        }

        let results = HasherPool::new(3, DEFAULT_CHUNK_SIZE)
            .hash_all(candidates)
            .unwrap();
        assert_eq!(results.len(), 3);

        let denied: Vec<_> = results.iter().filter(|r| r.digest().is_none()).collect();
        assert_eq!(denied.len(), 1);
        assert_eq!(denied[0].path, locked);
        assert!(matches!(
            denied[0].error(),
            Some(HashError::PermissionDenied(p)) if p == &locked
        ));
        assert_eq!(
            results.iter().filter_map(HashResult::digest).count(),
            2
        );
    }

    #[test]
    fn test_run_empty_never_builds_pool() {
        let counter = Arc::new(Counter::default());
        let pool = HasherPool::new(4, 16).with_observer(counter.clone());

        let delivered = pool.run(Vec::new(), |_| panic!("no results expected")).unwrap();
        assert_eq!(delivered, 0);
        assert_eq!(counter.started.load(Ordering::SeqCst), 0);
    }
}
