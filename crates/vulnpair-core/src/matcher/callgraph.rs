//! Name-keyed call graph over one snapshot.
//!
//! Edges are bare-name string matches. Two functions sharing a name in
//! different files or classes collapse onto one key (last writer wins), and a
//! callee written as `obj.method` never matches a key `method`. Resolving
//! either would need scope and type information this graph does not have.

use indexmap::IndexMap;

use crate::models::FunctionRecord;

/// Function name → its callee names, in callee order.
pub type CalleeMap = IndexMap<String, Vec<String>>;

/// Callee name → names of the functions calling it.
pub type CallerMap = IndexMap<String, Vec<String>>;

// ---------------------------------------------------------------------------
// Map construction
// ---------------------------------------------------------------------------

/// Build the callee map: one entry per bare name, later records overwriting
/// earlier ones in place.
pub fn build_callee_map(records: &[FunctionRecord]) -> CalleeMap {
    let mut callees = CalleeMap::new();
    for record in records {
        callees.insert(record.bare_name(), record.callees.clone());
    }
    callees
}

/// Invert a callee map. Caller lists follow the callee map's order and keep
/// duplicates when a caller calls the same name more than once.
pub fn invert(callees: &CalleeMap) -> CallerMap {
    let mut callers = CallerMap::new();
    for (caller, names) in callees {
        for callee in names {
            callers
                .entry(callee.clone())
                .or_default()
                .push(caller.clone());
        }
    }
    callers
}

pub fn build_maps(records: &[FunctionRecord]) -> (CalleeMap, CallerMap) {
    let callees = build_callee_map(records);
    let callers = invert(&callees);
    (callees, callers)
}

// ---------------------------------------------------------------------------
// Snapshot graph
// ---------------------------------------------------------------------------

/// Callee/caller maps plus a bare-name → record index for body lookups, all
/// keyed the same way.
pub struct CallGraph<'a> {
    records: &'a [FunctionRecord],
    pub callees: CalleeMap,
    pub callers: CallerMap,
    definitions: IndexMap<String, usize>,
}

impl<'a> CallGraph<'a> {
    pub fn build(records: &'a [FunctionRecord]) -> Self {
        let (callees, callers) = build_maps(records);
        let mut definitions = IndexMap::new();
        for (index, record) in records.iter().enumerate() {
            definitions.insert(record.bare_name(), index);
        }
        Self {
            records,
            callees,
            callers,
            definitions,
        }
    }

    /// The record a bare name resolves to, if it was extracted.
    pub fn definition(&self, name: &str) -> Option<&'a FunctionRecord> {
        self.definitions.get(name).map(|&i| &self.records[i])
    }

    /// Body for `name`, or an empty string for library/macro names that were
    /// never extracted.
    pub fn body_of(&self, name: &str) -> &'a str {
        self.definition(name).map(|r| r.body.as_str()).unwrap_or("")
    }

    pub fn callees_of(&self, name: &str) -> &[String] {
        self.callees.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn callers_of(&self, name: &str) -> &[String] {
        self.callers.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(signature: &str, callees: &[&str]) -> FunctionRecord {
        FunctionRecord {
            file_path: "src/x.c".to_string(),
            signature: signature.to_string(),
            callees: callees.iter().map(|c| c.to_string()).collect(),
            body: format!("{signature} {{ }}"),
        }
    }

    #[test]
    fn test_callee_map_last_writer_wins_in_place() {
        let records = vec![
            record("int a (void)", &["x"]),
            record("int b (void)", &["y"]),
            record("static int a (int n)", &["z"]),
        ];
        let callees = build_callee_map(&records);
        let keys: Vec<&str> = callees.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(callees["a"], vec!["z"]);
    }

    #[test]
    fn test_caller_map_order_and_duplicates() {
        let records = vec![
            record("void main (void)", &["parse", "parse", "run"]),
            record("void run (void)", &["parse"]),
        ];
        let (_, callers) = build_maps(&records);
        assert_eq!(callers["parse"], vec!["main", "main", "run"]);
        assert_eq!(callers["run"], vec!["main"]);
        assert!(!callers.contains_key("main"));
    }

    #[test]
    fn test_caller_map_is_exact_inverse() {
        let records = vec![
            record("int f (void)", &["g", "h"]),
            record("int g (void)", &["h", "printf"]),
            record("int h (void)", &[]),
            record("int k (void)", &["f", "g", "g"]),
        ];
        let (callees, callers) = build_maps(&records);

        let mut forward: Vec<(String, String)> = Vec::new();
        for (caller, names) in &callees {
            for callee in names {
                forward.push((caller.clone(), callee.clone()));
                assert!(callers[callee].contains(caller));
            }
        }
        let mut backward: Vec<(String, String)> = Vec::new();
        for (callee, names) in &callers {
            for caller in names {
                backward.push((caller.clone(), callee.clone()));
            }
        }
        forward.sort();
        backward.sort();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_call_graph_lookups() {
        let records = vec![
            record("int f (void)", &["g", "memcpy"]),
            record("int g (void)", &[]),
        ];
        let graph = CallGraph::build(&records);
        assert_eq!(graph.body_of("g"), "int g (void) { }");
        assert_eq!(graph.body_of("memcpy"), "");
        assert_eq!(graph.callees_of("f"), ["g", "memcpy"]);
        assert_eq!(graph.callers_of("g"), ["f"]);
        assert!(graph.callers_of("f").is_empty());
        assert!(graph.definition("nope").is_none());
    }
}
