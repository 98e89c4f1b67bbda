//! Error types for the vulnpair core library.

#[cfg(feature = "python")]
use pyo3::exceptions::{PyIOError, PyKeyboardInterrupt, PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;

/// Top-level error enum for the vulnpair core library.
#[derive(Debug, thiserror::Error)]
pub enum VulnPairError {
    #[error("Unsupported file type: {0}")]
    UnsupportedExtension(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Interrupted, last index: {last_index}")]
    Interrupted { last_index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<VulnPairError> for PyErr {
    fn from(err: VulnPairError) -> PyErr {
        match &err {
            VulnPairError::UnsupportedExtension(_) | VulnPairError::Parse(_) => {
                PyValueError::new_err(err.to_string())
            }
            VulnPairError::Git(_) => PyRuntimeError::new_err(err.to_string()),
            VulnPairError::Dataset(_) | VulnPairError::Json(_) => {
                PyValueError::new_err(err.to_string())
            }
            VulnPairError::Interrupted { .. } => PyKeyboardInterrupt::new_err(err.to_string()),
            VulnPairError::Io(_) | VulnPairError::Walk(_) => PyIOError::new_err(err.to_string()),
        }
    }
}

pub type VulnPairResult<T> = Result<T, VulnPairError>;
