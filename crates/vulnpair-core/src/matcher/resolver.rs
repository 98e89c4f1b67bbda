//! Re-identification of a known vulnerable function inside a snapshot.
//!
//! A candidate qualifies when the similarity ratio of its normalized body
//! against the normalized known body exceeds the configured threshold. Only
//! a unique qualifier counts as a match; zero or several is "no match".

use tracing::debug;

use crate::errors::VulnPairResult;
use crate::matcher::callgraph::CallGraph;
use crate::matcher::similarity::{exceeds, Normalization};
use crate::models::{FunctionRecord, NamedFunction, PairedSide};

/// Default similarity threshold; a ratio must be strictly greater.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Every record whose body is similar enough to `known_body`.
pub fn find_candidates<'a>(
    records: &'a [FunctionRecord],
    known_body: &str,
    threshold: f64,
    normalization: Normalization,
) -> Vec<&'a FunctionRecord> {
    let known = normalization.apply(known_body);
    records
        .iter()
        .filter(|record| exceeds(&normalization.apply(&record.body), &known, threshold))
        .collect()
}

/// The unique record matching `known_body`, or `None` when zero or more than
/// one record qualifies.
pub fn resolve<'a>(
    records: &'a [FunctionRecord],
    known_body: &str,
    threshold: f64,
) -> Option<&'a FunctionRecord> {
    let candidates = find_candidates(records, known_body, threshold, Normalization::DoubleSpace);
    match candidates.as_slice() {
        [single] => Some(*single),
        others => {
            debug!(candidates = others.len(), "no unique match");
            None
        }
    }
}

/// Records whose callee list contains `name` verbatim.
pub fn extract_callers<'a>(records: &'a [FunctionRecord], name: &str) -> Vec<&'a FunctionRecord> {
    records
        .iter()
        .filter(|record| record.callees.iter().any(|callee| callee == name))
        .collect()
}

/// A resolved function with its call-graph neighbourhood.
#[derive(Debug)]
pub struct SnapshotMatch<'a> {
    pub record: &'a FunctionRecord,
    /// Functions calling the match; each caller's body is its own record's
    /// body.
    pub callers: Vec<NamedFunction>,
    /// The match's callees in call order; bodies come from the name-keyed
    /// graph and are empty for names that were never extracted.
    pub callees: Vec<NamedFunction>,
}

impl SnapshotMatch<'_> {
    /// Serialize into one side of a paired record. `function` is the known
    /// vulnerable text from the dataset, not the matched body.
    pub fn into_side(
        self,
        project: &str,
        commit_id: &str,
        function: &str,
    ) -> VulnPairResult<PairedSide> {
        Ok(PairedSide {
            project: project.to_string(),
            commit_id: commit_id.to_string(),
            function: function.to_string(),
            callers: serde_json::to_string(&self.callers)?,
            callees: serde_json::to_string(&self.callees)?,
        })
    }
}

/// Resolve `known_body` in `records` and gather its callers and callees.
pub fn match_snapshot<'a>(
    records: &'a [FunctionRecord],
    known_body: &str,
    threshold: f64,
) -> Option<SnapshotMatch<'a>> {
    let record = resolve(records, known_body, threshold)?;
    let graph = CallGraph::build(records);

    let callees = record
        .callees
        .iter()
        .map(|callee| NamedFunction {
            name: callee.clone(),
            function: graph.body_of(callee).to_string(),
        })
        .collect();

    let callers = extract_callers(records, &record.bare_name())
        .into_iter()
        .map(|caller| NamedFunction {
            name: caller.bare_name(),
            function: caller.body.clone(),
        })
        .collect();

    Some(SnapshotMatch {
        record,
        callers,
        callees,
    })
}
