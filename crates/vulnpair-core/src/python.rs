//! Python bindings (feature `python`), for drivers that keep their
//! orchestration in Python.

use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::chunker::filesystem::collect;
use crate::chunker::languages::LanguageTable;
use crate::matcher::callgraph::build_maps;
use crate::matcher::resolver::{match_snapshot, DEFAULT_SIMILARITY_THRESHOLD};
use crate::matcher::similarity::ratio;
use crate::models::{FunctionRecord, NamedFunction};

fn record_dict<'py>(py: Python<'py>, record: &FunctionRecord) -> PyResult<Bound<'py, PyDict>> {
    let entry = PyDict::new(py);
    entry.set_item("file_path", &record.file_path)?;
    entry.set_item("function_signature", &record.signature)?;
    entry.set_item("callees", &record.callees)?;
    entry.set_item("function_body", &record.body)?;
    Ok(entry)
}

fn named_list<'py>(py: Python<'py>, items: &[NamedFunction]) -> PyResult<Bound<'py, PyList>> {
    let list = PyList::empty(py);
    for item in items {
        let entry = PyDict::new(py);
        entry.set_item("name", &item.name)?;
        entry.set_item("function", &item.function)?;
        list.append(entry)?;
    }
    Ok(list)
}

/// Every function of a checkout as a list of dicts.
#[pyfunction]
pub fn extract_repository(py: Python<'_>, repo_root: &str) -> PyResult<PyObject> {
    let records = collect(&LanguageTable::standard(), Path::new(repo_root))?;
    let list = PyList::empty(py);
    for record in &records {
        list.append(record_dict(py, record)?)?;
    }
    Ok(list.into_any().unbind())
}

/// Resolve a known body in a checkout; `None` unless exactly one function
/// matches.
#[pyfunction]
#[pyo3(signature = (repo_root, function_body, threshold=DEFAULT_SIMILARITY_THRESHOLD))]
pub fn resolve_function(
    py: Python<'_>,
    repo_root: &str,
    function_body: &str,
    threshold: f64,
) -> PyResult<Option<PyObject>> {
    let records = collect(&LanguageTable::standard(), Path::new(repo_root))?;
    let Some(found) = match_snapshot(&records, function_body, threshold) else {
        return Ok(None);
    };
    let result = record_dict(py, found.record)?;
    result.set_item("callers", named_list(py, &found.callers)?)?;
    result.set_item("callee_bodies", named_list(py, &found.callees)?)?;
    Ok(Some(result.into_any().unbind()))
}

/// `(callee_map, caller_map)` for a checkout.
#[pyfunction]
pub fn build_call_maps(py: Python<'_>, repo_root: &str) -> PyResult<PyObject> {
    let records = collect(&LanguageTable::standard(), Path::new(repo_root))?;
    let (callees, callers) = build_maps(&records);
    let callee_map = PyDict::new(py);
    for (name, names) in &callees {
        callee_map.set_item(name, names)?;
    }
    let caller_map = PyDict::new(py);
    for (name, names) in &callers {
        caller_map.set_item(name, names)?;
    }
    let pair = pyo3::types::PyTuple::new(py, [callee_map.into_any(), caller_map.into_any()])?;
    Ok(pair.into_any().unbind())
}

#[pyfunction]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    ratio(a, b)
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("DEFAULT_SIMILARITY_THRESHOLD", DEFAULT_SIMILARITY_THRESHOLD)?;
    m.add_function(wrap_pyfunction!(extract_repository, m)?)?;
    m.add_function(wrap_pyfunction!(resolve_function, m)?)?;
    m.add_function(wrap_pyfunction!(build_call_maps, m)?)?;
    m.add_function(wrap_pyfunction!(similarity_ratio, m)?)?;
    Ok(())
}
