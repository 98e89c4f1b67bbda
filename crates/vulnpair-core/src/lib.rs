//! vulnpair core library: builds vulnerability-detection examples by pairing
//! a vulnerable function with its caller/callee context, before and after
//! the commit that fixed it.
//!
//! Source files are parsed with tree-sitter, function definitions are
//! extracted with a synthesized signature and the names they call, a
//! name-keyed call graph is built per checkout, and the known vulnerable
//! body is re-identified in each checkout by text similarity. With the
//! `python` feature the crate also builds as the `_vulnpair_core` extension
//! module.

pub mod chunker;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod matcher;
pub mod models;
pub mod pairing;
#[cfg(feature = "python")]
pub mod python;
pub mod repository;

#[cfg(feature = "python")]
use pyo3::prelude::*;

// ---------------------------------------------------------------------------
// Top-level Python module: _vulnpair_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn _vulnpair_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register(m)
}
