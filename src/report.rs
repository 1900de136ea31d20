//! Duplicate report writers.
//!
//! One row is written per duplicate file. Groups are ordered by hex digest
//! and files within a group by case-insensitive path.
//!
//! # CSV columns
//!
//! - `checksum`: BLAKE3 digest (hex)
//! - `file_path`: absolute path to the file
//! - `size_bytes`: file size in bytes
//! - `size`: human-readable size

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::utils::format_file_size;
use crate::{DuplicateFile, DuplicateGroups, ReportError};

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    /// Pick a format from the output file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    checksum: &'a str,
    file_path: String,
    size_bytes: u64,
    size: String,
}

#[derive(Debug, Serialize)]
struct JsonGroup {
    checksum: String,
    size_bytes: u64,
    files: Vec<String>,
}

/// Groups in rendering order, each with its files sorted case-insensitively.
fn sorted_groups(groups: &DuplicateGroups) -> Vec<(String, Vec<&DuplicateFile>)> {
    // BTreeMap order over raw digest bytes matches hex lexical order.
    groups
        .iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(digest, files)| {
            let mut files: Vec<&DuplicateFile> = files.iter().collect();
            files.sort_by_cached_key(|f| f.path.to_string_lossy().to_lowercase());
            (digest.to_hex(), files)
        })
        .collect()
}

/// Write the groups as CSV, returning the number of rows written.
pub fn write_csv<W: Write>(groups: &DuplicateGroups, writer: W) -> Result<usize, ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for (checksum, files) in sorted_groups(groups) {
        for file in files {
            csv_writer.serialize(CsvRow {
                checksum: &checksum,
                file_path: file.path.to_string_lossy().into_owned(),
                size_bytes: file.size,
                size: format_file_size(file.size),
            })?;
            rows += 1;
        }
    }

    csv_writer.flush()?;
    Ok(rows)
}

/// Write the groups as a pretty-printed JSON array, returning the number of
/// files listed.
pub fn write_json<W: Write>(groups: &DuplicateGroups, mut writer: W) -> Result<usize, ReportError> {
    let mut rows = 0;
    let groups: Vec<JsonGroup> = sorted_groups(groups)
        .into_iter()
        .map(|(checksum, files)| {
            rows += files.len();
            JsonGroup {
                checksum,
                size_bytes: files.first().map_or(0, |f| f.size),
                files: files
                    .iter()
                    .map(|f| f.path.to_string_lossy().into_owned())
                    .collect(),
            }
        })
        .collect();

    serde_json::to_writer_pretty(&mut writer, &groups)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(rows)
}

/// Write a report file, creating parent directories as needed.
pub fn write_report(
    groups: &DuplicateGroups,
    output_path: &Path,
    format: ReportFormat,
) -> Result<usize, ReportError> {
    if output_path.is_dir() {
        return Err(ReportError::IsADirectory(output_path.to_path_buf()));
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(output_path)?);
    let rows = match format {
        ReportFormat::Csv => write_csv(groups, writer)?,
        ReportFormat::Json => write_json(groups, writer)?,
    };

    log::debug!("Wrote {} rows to {}", rows, output_path.display());
    Ok(rows)
}

/// Write a report to stdout.
pub fn write_report_to_stdout(
    groups: &DuplicateGroups,
    format: ReportFormat,
) -> Result<usize, ReportError> {
    let stdout = io::stdout().lock();
    match format {
        ReportFormat::Csv => write_csv(groups, stdout),
        ReportFormat::Json => write_json(groups, stdout),
    }
}
