//! Shared typed models used across extraction, matching, and dataset I/O.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 1. FunctionRecord
// ---------------------------------------------------------------------------

/// One function definition extracted from a checkout.
///
/// `body` is the exact (lossily decoded) text of the definition node and
/// `signature` is synthesized once, at extraction time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub file_path: String,
    #[serde(rename = "function_signature")]
    pub signature: String,
    pub callees: Vec<String>,
    #[serde(rename = "function_body")]
    pub body: String,
}

impl FunctionRecord {
    pub fn bare_name(&self) -> String {
        crate::chunker::signature::bare_name(&self.signature)
    }
}

// ---------------------------------------------------------------------------
// 2. Paired output
// ---------------------------------------------------------------------------

/// A caller or callee with its resolved body (empty when unresolved).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedFunction {
    pub name: String,
    pub function: String,
}

/// One side (vulnerable or benign) of a paired example.
///
/// `callers` and `callees` hold JSON-encoded arrays of [`NamedFunction`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedSide {
    pub project: String,
    pub commit_id: String,
    pub function: String,
    pub callers: String,
    pub callees: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedRecord {
    pub vulnerable: PairedSide,
    pub benign: PairedSide,
}

// ---------------------------------------------------------------------------
// 3. Dataset input
// ---------------------------------------------------------------------------

/// A known-vulnerable function from the input dataset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub project: String,
    pub commit_id: String,
    #[serde(alias = "function")]
    pub func: String,
    #[serde(default)]
    pub target: Option<i64>,
    #[serde(default)]
    pub cwe: Option<serde_json::Value>,
}

impl VulnerabilityRecord {
    /// CWE labels, whether the record stores one string or a list.
    pub fn cwe_labels(&self) -> Vec<String> {
        match &self.cwe {
            Some(serde_json::Value::String(s)) => vec![s.clone()],
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Per-snapshot exports
// ---------------------------------------------------------------------------

/// A function from a snapshot, labelled against a known vulnerable body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledFunction {
    pub file_path: String,
    pub function_signature: String,
    pub callees: Vec<String>,
    pub function_body: String,
    pub cwe: String,
    pub commit_id: String,
    pub vulnerable: u8,
}

/// Call-graph neighbourhood of one bare name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMapping {
    pub function_signature: String,
    pub function_body: String,
    pub callees: Vec<String>,
    pub callers: Vec<String>,
}
