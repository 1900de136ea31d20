use std::collections::HashMap;
use std::path::PathBuf;

use console::style;

use crate::utils::format_file_size;
use crate::{Digest, DuplicateFile, DuplicateGroups, HashResult};

/// Folds hash results into duplicate groups.
///
/// Grouping by digest is commutative, so results may be added in any order;
/// [`Aggregator::finish`] sorts each group, making the output independent of
/// worker completion order.
#[derive(Debug, Default)]
pub struct Aggregator {
    by_digest: HashMap<Digest, Vec<DuplicateFile>>,
    hashed: usize,
    failed: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one result. Failed results are counted and otherwise ignored.
    pub fn add(&mut self, result: HashResult) {
        match result.outcome {
            Ok(digest) => {
                self.hashed += 1;
                self.by_digest.entry(digest).or_default().push(DuplicateFile {
                    path: result.path,
                    size: result.size,
                });
            }
            Err(_) => self.failed += 1,
        }
    }

    pub fn hashed(&self) -> usize {
        self.hashed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Drop singleton digests and return the remaining groups.
    pub fn finish(self) -> DuplicateGroups {
        self.by_digest
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(digest, mut files)| {
                files.sort();
                (digest, files)
            })
            .collect()
    }
}

impl Extend<HashResult> for Aggregator {
    fn extend<I: IntoIterator<Item = HashResult>>(&mut self, iter: I) {
        for result in iter {
            self.add(result);
        }
    }
}

/// Summary of how much space the duplicate groups waste.
#[derive(Debug)]
pub struct DedupAnalysis {
    pub total_groups: usize,
    pub total_duplicates: usize,
    pub total_wasted_space: u64,
    pub largest_waste: (PathBuf, u64), // (path, wasted_bytes)
}

impl DedupAnalysis {
    pub fn new() -> Self {
        Self {
            total_groups: 0,
            total_duplicates: 0,
            total_wasted_space: 0,
            largest_waste: (PathBuf::new(), 0),
        }
    }

    pub fn from_groups(groups: &DuplicateGroups) -> Self {
        let mut analysis = Self::new();

        for files in groups.values() {
            let Some(first) = files.first() else {
                continue;
            };
            let duplicate_count = files.len() - 1;
            let group_waste = first.size * duplicate_count as u64;

            analysis.total_groups += 1;
            analysis.total_duplicates += duplicate_count;
            analysis.total_wasted_space += group_waste;

            if group_waste > analysis.largest_waste.1 {
                analysis.largest_waste = (first.path.clone(), group_waste);
            }
        }

        analysis
    }

    pub fn print_analysis(&self) {
        println!();
        println!("{}", style("Duplicate Analysis").cyan().bold());
        println!("{}", style("=".repeat(30)).cyan());

        println!("Duplicate groups found: {}", self.total_groups);
        println!("Redundant copies: {}", self.total_duplicates);
        println!("Wasted space: {}", format_file_size(self.total_wasted_space));

        if self.largest_waste.1 > 0 {
            println!();
            println!("{}", style("Largest opportunity:").bold());
            println!("  File: {}", self.largest_waste.0.display());
            println!("  Potential savings: {}", format_file_size(self.largest_waste.1));
        }
    }
}

impl Default for DedupAnalysis {
    fn default() -> Self {
        Self::new()
    }
}
