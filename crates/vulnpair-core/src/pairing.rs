//! Pairwise pipeline: resolve each vulnerable function before and after its
//! fix and emit one `{vulnerable, benign}` record per success.
//!
//! Runs strictly one record at a time: a checkout is shared filesystem
//! state, and every snapshot's records and maps are dropped before the next
//! checkout is prepared.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::chunker::filesystem::collect;
use crate::config::PipelineConfig;
use crate::dataset::JsonlAppender;
use crate::errors::{VulnPairError, VulnPairResult};
use crate::matcher::labelling::label_snapshot;
use crate::matcher::resolver::match_snapshot;
use crate::models::{PairedRecord, PairedSide, VulnerabilityRecord};
use crate::repository::{CheckoutTarget, RepositorySource};

/// Why a record produced no output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    UnknownProject,
    Acquisition,
    NoVulnerableMatch,
    NoBenignMatch,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairingSummary {
    pub seen: usize,
    pub written: usize,
    pub skipped: usize,
}

pub struct PairingPipeline<'c> {
    config: &'c PipelineConfig,
}

impl<'c> PairingPipeline<'c> {
    pub fn new(config: &'c PipelineConfig) -> Self {
        Self { config }
    }

    /// Parse the current checkout and resolve `record` in it.
    pub fn process_checkout(
        &self,
        source: &dyn RepositorySource,
        record: &VulnerabilityRecord,
    ) -> VulnPairResult<Option<PairedSide>> {
        let snapshot = collect(&self.config.languages, source.path())?;
        match match_snapshot(&snapshot, &record.func, self.config.similarity_threshold) {
            Some(found) => Ok(Some(found.into_side(
                &record.project,
                &record.commit_id,
                &record.func,
            )?)),
            None => Ok(None),
        }
    }

    /// Produce the paired record for one input, or the reason it was skipped.
    /// Acquisition failures are skip reasons, not errors.
    pub fn pair_one(
        &self,
        record: &VulnerabilityRecord,
        url: &str,
        source: &mut dyn RepositorySource,
        interrupt: &AtomicBool,
        index: usize,
    ) -> VulnPairResult<Result<PairedRecord, SkipReason>> {
        let acquired = source
            .prepare(url)
            .and_then(|()| source.checkout(&record.commit_id, CheckoutTarget::BeforeFix));
        if let Err(e) = acquired {
            warn!(index, project = %record.project, "acquisition failed: {e}");
            return Ok(Err(SkipReason::Acquisition));
        }
        let vulnerable = match self.process_checkout(source, record)? {
            Some(side) => side,
            None => return Ok(Err(SkipReason::NoVulnerableMatch)),
        };

        if interrupt.load(Ordering::SeqCst) {
            return Err(VulnPairError::Interrupted { last_index: index });
        }

        if let Err(e) = source.checkout(&record.commit_id, CheckoutTarget::Fix) {
            warn!(index, project = %record.project, "checkout failed: {e}");
            return Ok(Err(SkipReason::Acquisition));
        }
        let benign = match self.process_checkout(source, record)? {
            Some(side) => side,
            None => return Ok(Err(SkipReason::NoBenignMatch)),
        };

        Ok(Ok(PairedRecord { vulnerable, benign }))
    }

    /// Run the whole batch, appending each paired record to `sink`.
    ///
    /// `interrupt` is checked before each record and between the two
    /// checkouts; once set, the run stops with
    /// [`VulnPairError::Interrupted`] carrying the last started index.
    pub fn run(
        &self,
        records: &[VulnerabilityRecord],
        urls: &IndexMap<String, String>,
        source: &mut dyn RepositorySource,
        sink: &mut JsonlAppender,
        interrupt: &AtomicBool,
    ) -> VulnPairResult<PairingSummary> {
        let mut summary = PairingSummary::default();
        let mut last_started: Option<usize> = None;

        for (index, record) in records.iter().enumerate() {
            if interrupt.load(Ordering::SeqCst) {
                return Err(VulnPairError::Interrupted {
                    last_index: last_started.unwrap_or(index),
                });
            }
            summary.seen += 1;

            let Some(url) = urls.get(&record.project) else {
                summary.skipped += 1;
                info!(index, project = %record.project, reason = ?SkipReason::UnknownProject, "skipped");
                continue;
            };

            last_started = Some(index);
            info!(index, project = %record.project, commit = %record.commit_id, "processing");

            match self.pair_one(record, url, source, interrupt, index)? {
                Ok(paired) => {
                    sink.append(&paired)?;
                    summary.written += 1;
                    info!(index, "paired record written");
                }
                Err(reason) => {
                    summary.skipped += 1;
                    info!(index, ?reason, "skipped");
                }
            }
        }

        source.remove()?;
        info!(
            seen = summary.seen,
            written = summary.written,
            skipped = summary.skipped,
            "pairing finished"
        );
        Ok(summary)
    }

    /// Label every function of each record's vulnerable checkout, appending
    /// to `<output_dir>/<cwe>.jsonl`. Records without a CWE label, or
    /// without `cwe` among their labels when a filter is given, are skipped
    /// without being counted. Acquisition failures skip the record.
    pub fn label(
        &self,
        records: &[VulnerabilityRecord],
        urls: &IndexMap<String, String>,
        source: &mut dyn RepositorySource,
        cwe: Option<&str>,
        output_dir: &Path,
        interrupt: &AtomicBool,
    ) -> VulnPairResult<PairingSummary> {
        let mut summary = PairingSummary::default();

        for (index, record) in records.iter().enumerate() {
            if interrupt.load(Ordering::SeqCst) {
                return Err(VulnPairError::Interrupted { last_index: index });
            }
            let labels = record.cwe_labels();
            let Some(first) = labels.first() else {
                continue;
            };
            if cwe.is_some_and(|wanted| !labels.iter().any(|l| l == wanted)) {
                continue;
            }
            let label = cwe.unwrap_or(first);
            summary.seen += 1;

            let Some(url) = urls.get(&record.project) else {
                summary.skipped += 1;
                info!(index, project = %record.project, reason = ?SkipReason::UnknownProject, "skipped");
                continue;
            };
            let acquired = source
                .prepare(url)
                .and_then(|()| source.checkout(&record.commit_id, CheckoutTarget::BeforeFix));
            if let Err(e) = acquired {
                summary.skipped += 1;
                warn!(index, project = %record.project, "acquisition failed: {e}");
                continue;
            }

            let snapshot = collect(&self.config.languages, source.path())?;
            let labelled = label_snapshot(
                &snapshot,
                &record.func,
                label,
                &record.commit_id,
                self.config.similarity_threshold,
            );
            let mut sink = JsonlAppender::open(&output_dir.join(format!("{label}.jsonl")))?;
            for function in &labelled {
                sink.append(function)?;
            }
            summary.written += 1;
            info!(index, label, functions = labelled.len(), "labelled snapshot written");
        }

        source.remove()?;
        info!(
            seen = summary.seen,
            written = summary.written,
            skipped = summary.skipped,
            "labelling finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{count_lines, read_jsonl};
    use crate::models::{LabelledFunction, NamedFunction};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    const VULN: &str = "static int copy_name(char *dst, const char *src) {\n  strcpy(dst, src);\n  return audit(dst);\n}";
    const FIXED: &str = "static int copy_name(char *dst, const char *src) {\n  strncpy(dst, src, 16);\n  return audit(dst);\n}";
    const AUDIT: &str = "int audit(char *s) { return log_line(s); }";
    const CALLER: &str = "void handle(char *in) { char b[16]; copy_name(b, in); }";

    /// Writes fixed trees per (commit, target) instead of running git.
    struct FakeSource {
        root: PathBuf,
        trees: HashMap<(String, bool), Vec<(&'static str, String)>>,
        removed: usize,
    }

    impl FakeSource {
        fn new(root: &Path) -> Self {
            Self {
                root: root.join("repo"),
                trees: HashMap::new(),
                removed: 0,
            }
        }

        fn tree(&mut self, commit: &str, before_fix: bool, files: Vec<(&'static str, String)>) {
            self.trees.insert((commit.to_string(), before_fix), files);
        }
    }

    impl RepositorySource for FakeSource {
        fn prepare(&mut self, _url: &str) -> VulnPairResult<()> {
            self.remove()?;
            std::fs::create_dir_all(&self.root)?;
            Ok(())
        }

        fn checkout(&mut self, commit_id: &str, target: CheckoutTarget) -> VulnPairResult<()> {
            let key = (commit_id.to_string(), target == CheckoutTarget::BeforeFix);
            let files = self
                .trees
                .get(&key)
                .ok_or_else(|| VulnPairError::Git(format!("unknown revision {commit_id}")))?;
            std::fs::remove_dir_all(&self.root)?;
            std::fs::create_dir_all(&self.root)?;
            for (name, content) in files {
                std::fs::write(self.root.join(name), content)?;
            }
            Ok(())
        }

        fn remove(&mut self) -> VulnPairResult<()> {
            if self.root.exists() {
                std::fs::remove_dir_all(&self.root)?;
            }
            self.removed += 1;
            Ok(())
        }

        fn path(&self) -> &Path {
            &self.root
        }
    }

    fn input(project: &str, commit: &str) -> VulnerabilityRecord {
        VulnerabilityRecord {
            project: project.to_string(),
            commit_id: commit.to_string(),
            func: VULN.to_string(),
            target: Some(1),
            cwe: None,
        }
    }

    fn urls() -> IndexMap<String, String> {
        let mut urls = IndexMap::new();
        urls.insert("proj".to_string(), "https://example.invalid/proj.git".to_string());
        urls
    }

    fn standard_trees(source: &mut FakeSource, commit: &str) {
        source.tree(
            commit,
            true,
            vec![
                ("name.c", format!("{VULN}\n\n{AUDIT}\n")),
                ("main.c", format!("{CALLER}\n")),
            ],
        );
        source.tree(
            commit,
            false,
            vec![
                ("name.c", format!("{FIXED}\n\n{AUDIT}\n")),
                ("main.c", format!("{CALLER}\n")),
            ],
        );
    }

    #[test]
    fn test_pair_written_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let mut source = FakeSource::new(dir.path());
        standard_trees(&mut source, "c1");
        let out_path = dir.path().join("paired.jsonl");
        let mut sink = JsonlAppender::open(&out_path).unwrap();

        let summary = PairingPipeline::new(&config)
            .run(&[input("proj", "c1")], &urls(), &mut source, &mut sink, &AtomicBool::new(false))
            .unwrap();
        assert_eq!(summary, PairingSummary { seen: 1, written: 1, skipped: 0 });

        let written: Vec<PairedRecord> = read_jsonl(&out_path).unwrap();
        assert_eq!(written.len(), 1);
        let pair = &written[0];
        assert_eq!(pair.vulnerable.function, VULN);
        assert_eq!(pair.benign.function, VULN);
        assert_eq!(pair.vulnerable.commit_id, "c1");

        let callees: Vec<NamedFunction> = serde_json::from_str(&pair.vulnerable.callees).unwrap();
        assert_eq!(callees[0].name, "strcpy");
        assert_eq!(callees[0].function, "");
        assert_eq!(callees[1].name, "audit");
        assert_eq!(callees[1].function, AUDIT);

        let benign_callees: Vec<NamedFunction> = serde_json::from_str(&pair.benign.callees).unwrap();
        assert_eq!(benign_callees[0].name, "strncpy");

        let callers: Vec<NamedFunction> = serde_json::from_str(&pair.benign.callers).unwrap();
        assert_eq!(callers, vec![NamedFunction { name: "handle".to_string(), function: CALLER.to_string() }]);
    }

    #[test]
    fn test_ambiguous_and_missing_matches_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let mut source = FakeSource::new(dir.path());
        standard_trees(&mut source, "good");
        // Two copies of the vulnerable function: ambiguous.
        source.tree(
            "dup",
            true,
            vec![("a.c", format!("{VULN}\n")), ("b.c", format!("{VULN}\n"))],
        );
        source.tree("dup", false, vec![("a.c", format!("{FIXED}\n"))]);
        // Matches before the fix but the function is gone after it.
        source.tree("gone", true, vec![("a.c", format!("{VULN}\n"))]);
        source.tree("gone", false, vec![("a.c", format!("{AUDIT}\n"))]);

        let out_path = dir.path().join("paired.jsonl");
        let before = count_lines(&out_path).unwrap();
        let mut sink = JsonlAppender::open(&out_path).unwrap();
        let records = vec![
            input("proj", "dup"),
            input("unknown", "c"),
            input("proj", "gone"),
            input("proj", "good"),
            input("proj", "missing-commit"),
        ];
        let summary = PairingPipeline::new(&config)
            .run(&records, &urls(), &mut source, &mut sink, &AtomicBool::new(false))
            .unwrap();

        assert_eq!(summary, PairingSummary { seen: 5, written: 1, skipped: 4 });
        assert_eq!(count_lines(&out_path).unwrap(), before + 1);
        assert!(!source.path().exists());
    }

    #[test]
    fn test_label_skips_failed_acquisition_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let mut source = FakeSource::new(dir.path());
        standard_trees(&mut source, "good");
        let labelled = |project: &str, commit: &str, cwe: serde_json::Value| VulnerabilityRecord {
            cwe: Some(cwe),
            ..input(project, commit)
        };
        let records = vec![
            labelled("proj", "missing-commit", serde_json::json!("CWE-120")),
            labelled("unknown", "c", serde_json::json!("CWE-120")),
            labelled("proj", "good", serde_json::json!(["CWE-787", "CWE-120"])),
            labelled("proj", "good", serde_json::json!([])),
        ];
        let out_dir = dir.path().join("benchmark");

        let summary = PairingPipeline::new(&config)
            .label(&records, &urls(), &mut source, Some("CWE-120"), &out_dir, &AtomicBool::new(false))
            .unwrap();
        assert_eq!(summary, PairingSummary { seen: 3, written: 1, skipped: 2 });

        let written: Vec<LabelledFunction> = read_jsonl(&out_dir.join("CWE-120.jsonl")).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(written.iter().filter(|f| f.vulnerable == 1).count(), 1);
        let last = written.last().unwrap();
        assert_eq!(last.vulnerable, 1);
        assert_eq!(last.function_body, VULN);
        assert_eq!(last.commit_id, "good");
        assert!(!out_dir.join("CWE-787.jsonl").exists());
        assert!(!source.path().exists());
    }

    #[test]
    fn test_interrupt_reports_last_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let mut source = FakeSource::new(dir.path());
        standard_trees(&mut source, "c1");
        let mut sink = JsonlAppender::open(&dir.path().join("paired.jsonl")).unwrap();

        let interrupt = AtomicBool::new(true);
        let err = PairingPipeline::new(&config)
            .run(&[input("proj", "c1")], &urls(), &mut source, &mut sink, &interrupt)
            .unwrap_err();
        assert!(matches!(err, VulnPairError::Interrupted { last_index: 0 }));
    }

    #[test]
    fn test_interrupt_between_checkouts() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let mut source = FakeSource::new(dir.path());
        standard_trees(&mut source, "c1");
        let interrupt = AtomicBool::new(false);
        interrupt.store(true, Ordering::SeqCst);

        let pipeline = PairingPipeline::new(&config);
        let result = pipeline.pair_one(&input("proj", "c1"), "url", &mut source, &interrupt, 7);
        assert!(matches!(result, Err(VulnPairError::Interrupted { last_index: 7 })));
    }
}
