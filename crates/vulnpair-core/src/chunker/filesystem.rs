//! Repository walking: every recognised source file, no skip rules.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::chunker::extract::extract;
use crate::chunker::languages::LanguageTable;
use crate::errors::VulnPairResult;
use crate::models::FunctionRecord;

/// All files under `repo_root` whose extension is in `table`.
///
/// Build output, vendored trees and fixtures are included like any other
/// directory. Entries are visited in file-name order for reproducible output.
/// A root that cannot be read is an error; unreadable entries below it are
/// logged and skipped.
pub fn iter_code_files(table: &LanguageTable, repo_root: &Path) -> VulnPairResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(repo_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(root = %repo_root.display(), "skipping entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_file() && table.is_code_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Walk one checkout and concatenate the records of every code file.
///
/// Files that cannot be read or parsed are logged and skipped; records are
/// never deduplicated across files.
pub fn collect(table: &LanguageTable, repo_root: &Path) -> VulnPairResult<Vec<FunctionRecord>> {
    let files = iter_code_files(table, repo_root)?;
    let mut records = Vec::new();
    for path in &files {
        match extract(table, path) {
            Ok(mut found) => {
                debug!(path = %path.display(), functions = found.len(), "extracted");
                records.append(&mut found);
            }
            Err(e) => warn!(path = %path.display(), "skipping file: {e}"),
        }
    }
    info!(
        root = %repo_root.display(),
        files = files.len(),
        functions = records.len(),
        "collected snapshot"
    );
    Ok(records)
}
