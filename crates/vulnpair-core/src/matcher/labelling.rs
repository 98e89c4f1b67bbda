//! Whole-snapshot labelled dataset: every function, flagged vulnerable or
//! not against a known vulnerable body.

use tracing::warn;

use crate::matcher::similarity::{exceeds, Normalization};
use crate::models::{FunctionRecord, LabelledFunction};

fn labelled(record: &FunctionRecord, cwe: &str, commit_id: &str, vulnerable: bool) -> LabelledFunction {
    LabelledFunction {
        file_path: record.file_path.clone(),
        function_signature: record.signature.clone(),
        callees: record.callees.clone(),
        function_body: record.body.clone(),
        cwe: cwe.to_string(),
        commit_id: commit_id.to_string(),
        vulnerable: u8::from(vulnerable),
    }
}

/// Label every record of a snapshot. Bodies are compared with all spaces
/// removed. Benign functions keep snapshot order; vulnerable ones follow.
pub fn label_snapshot(
    records: &[FunctionRecord],
    known_body: &str,
    cwe: &str,
    commit_id: &str,
    threshold: f64,
) -> Vec<LabelledFunction> {
    let normalization = Normalization::AllSpaces;
    let known = normalization.apply(known_body);

    let mut benign = Vec::with_capacity(records.len());
    let mut vulnerable = Vec::new();
    for record in records {
        if exceeds(&normalization.apply(&record.body), &known, threshold) {
            vulnerable.push(labelled(record, cwe, commit_id, true));
        } else {
            benign.push(labelled(record, cwe, commit_id, false));
        }
    }
    if vulnerable.is_empty() {
        warn!(commit_id, cwe, "no function matched the vulnerable body");
    }
    benign.append(&mut vulnerable);
    benign
}
