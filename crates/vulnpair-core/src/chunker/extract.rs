//! Function extraction from a parsed source unit.

use std::path::Path;

use crate::chunker::callees::find_callees;
use crate::chunker::languages::LanguageTable;
use crate::chunker::parser::{byte_range_text, parse_file, ParsedUnit};
use crate::chunker::signature::synthesize;
use crate::errors::VulnPairResult;
use crate::models::FunctionRecord;

/// Extract every function definition of `unit`.
///
/// The walk is depth-first over named nodes with an explicit stack; children
/// are pushed in reverse so records come out in source order. A function
/// definition is a leaf: definitions nested inside it are part of its body
/// and are not extracted on their own.
pub fn extract_unit(unit: &ParsedUnit) -> Vec<FunctionRecord> {
    let spec = unit.language.spec();
    let mut records = Vec::new();
    let mut stack = vec![unit.tree.root_node()];

    while let Some(node) = stack.pop() {
        if !node.is_named() {
            continue;
        }
        if spec.is_function(node.kind()) {
            records.push(FunctionRecord {
                file_path: unit.path.clone(),
                signature: synthesize(node, &unit.content, spec),
                callees: find_callees(node, &unit.content, spec),
                body: byte_range_text(&unit.content, node.start_byte(), node.end_byte()),
            });
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    records
}

/// Read, parse and extract one file.
pub fn extract(table: &LanguageTable, file_path: &Path) -> VulnPairResult<Vec<FunctionRecord>> {
    let unit = parse_file(table, file_path)?;
    Ok(extract_unit(&unit))
}
