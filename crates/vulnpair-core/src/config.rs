//! Pipeline configuration, built once and passed by reference.

use std::path::PathBuf;

use tracing::warn;

use crate::chunker::languages::LanguageTable;
use crate::matcher::resolver::DEFAULT_SIMILARITY_THRESHOLD;

pub const THRESHOLD_ENV: &str = "VULNPAIR_SIMILARITY_THRESHOLD";
pub const PROJECTS_DIR_ENV: &str = "VULNPAIR_PROJECTS_DIR";

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub languages: LanguageTable,
    /// A candidate qualifies when its ratio is strictly greater.
    pub similarity_threshold: f64,
    /// Directory that holds cloned checkouts.
    pub projects_dir: PathBuf,
    /// Checkout directory name under `projects_dir`.
    pub checkout_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            languages: LanguageTable::standard(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            projects_dir: PathBuf::from("projects"),
            checkout_name: "repo".to_string(),
        }
    }
}

fn parse_threshold(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| (0.0..=1.0).contains(v))
}

impl PipelineConfig {
    /// Defaults overlaid with `VULNPAIR_*` environment variables. Invalid
    /// values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(THRESHOLD_ENV) {
            match parse_threshold(&raw) {
                Some(v) => config.similarity_threshold = v,
                None => warn!("ignoring {THRESHOLD_ENV}={raw:?}: expected a number in [0, 1]"),
            }
        }
        if let Ok(raw) = std::env::var(PROJECTS_DIR_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.projects_dir = PathBuf::from(trimmed);
            }
        }
        config
    }

    pub fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        if let Some(v) = threshold {
            self.similarity_threshold = v;
        }
        self
    }

    pub fn checkout_path(&self) -> PathBuf {
        self.projects_dir.join(&self.checkout_name)
    }
}
