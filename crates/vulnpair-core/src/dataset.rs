//! JSON Lines and JSON dataset I/O.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{VulnPairError, VulnPairResult};
use crate::models::VulnerabilityRecord;

/// Input splits, in the order they are concatenated.
pub const DEFAULT_SPLITS: &[&str] = &["train", "test", "valid"];

/// Read one JSON value per non-blank line.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> VulnPairResult<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut items = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line).map_err(|e| {
            VulnPairError::Dataset(format!("{}:{}: {e}", path.display(), index + 1))
        })?;
        items.push(item);
    }
    Ok(items)
}

fn write_lines<T: Serialize>(file: File, items: &[T]) -> VulnPairResult<()> {
    let mut writer = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Replace `path` with one JSON line per item.
pub fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> VulnPairResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_lines(File::create(path)?, items)
}

/// Append line-delimited JSON output, flushing after every record so an
/// interrupted batch leaves only whole lines behind.
pub struct JsonlAppender {
    writer: BufWriter<File>,
}

impl JsonlAppender {
    pub fn open(path: &Path) -> VulnPairResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn append<T: Serialize>(&mut self, item: &T) -> VulnPairResult<()> {
        serde_json::to_writer(&mut self.writer, item)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Load the `project → clone URL` mapping.
pub fn load_project_urls(path: &Path) -> VulnPairResult<IndexMap<String, String>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Concatenate `primevul_{split}.jsonl` files from `dir`.
pub fn load_vulnerability_records(
    dir: &Path,
    splits: &[&str],
) -> VulnPairResult<Vec<VulnerabilityRecord>> {
    let mut records = Vec::new();
    for split in splits {
        let path = dir.join(format!("primevul_{split}.jsonl"));
        records.extend(read_jsonl::<VulnerabilityRecord>(&path)?);
    }
    Ok(records)
}

/// Keep records labelled vulnerable (`target == 1`).
pub fn filter_vulnerable(records: Vec<VulnerabilityRecord>) -> Vec<VulnerabilityRecord> {
    records
        .into_iter()
        .filter(|r| r.target == Some(1))
        .collect()
}

/// Number of lines in a file; a missing file has none.
pub fn count_lines(path: &Path) -> VulnPairResult<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    Ok(count)
}
