use indicatif::{ProgressBar, ProgressStyle};

use crate::{FileEntry, HashObserver, HashResult};

/// Terminal progress bar advanced once per hashed candidate.
pub struct HashProgress {
    bar: ProgressBar,
}

impl HashProgress {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        Self { bar }
    }

    /// A bar that draws nothing, for quiet runs and non-terminal output.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn set_total(&self, total: u64) {
        self.bar.set_length(total);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl HashObserver for HashProgress {
    fn on_batch_start(&self, candidates: usize) {
        self.set_total(candidates as u64);
    }

    fn on_start(&self, entry: &FileEntry) {
        log::trace!("Hashing {}", entry.path.display());
    }

    fn on_complete(&self, _result: &HashResult) {
        self.bar.inc(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashError;
    use std::path::PathBuf;

    #[test]
    fn test_hidden_progress_counts_completions() {
        let progress = HashProgress::hidden();
        progress.set_total(2);

        let result = HashResult {
            path: PathBuf::from("/x"),
            size: 1,
            outcome: Err(HashError::NotFound(PathBuf::from("/x"))),
        };
        progress.on_complete(&result);
        progress.on_complete(&result);

        assert_eq!(progress.position(), 2);
        progress.finish();
        assert!(progress.is_finished());
    }
}
