//! Per-function call-graph mapping for a whole snapshot.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;

use crate::errors::VulnPairResult;
use crate::matcher::callgraph::CallGraph;
use crate::models::{FunctionMapping, FunctionRecord};

/// Bare name → signature, body, callees and callers.
///
/// Records sharing a bare name collapse onto the last one, matching the
/// callee map.
pub fn function_mappings(records: &[FunctionRecord]) -> IndexMap<String, FunctionMapping> {
    let graph = CallGraph::build(records);
    let mut mappings = IndexMap::new();
    for record in records {
        let name = record.bare_name();
        let mapping = FunctionMapping {
            function_signature: record.signature.clone(),
            function_body: record.body.clone(),
            callees: graph.callees_of(&name).to_vec(),
            callers: graph.callers_of(&name).to_vec(),
        };
        mappings.insert(name, mapping);
    }
    mappings
}

/// Write the mapping as pretty-printed JSON.
pub fn write_mappings(
    path: &Path,
    mappings: &IndexMap<String, FunctionMapping>,
) -> VulnPairResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, mappings)?;
    writer.flush()?;
    Ok(())
}
