//! Repository acquisition: clone, checkout, remove.
//!
//! The pairing pipeline only needs a path to a prepared checkout; how it
//! gets there sits behind [`RepositorySource`] so tests can supply trees
//! without git.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::errors::{VulnPairError, VulnPairResult};

/// Which side of a fix commit to check out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// The fix commit itself (benign).
    Fix,
    /// One revision before the fix commit (vulnerable).
    BeforeFix,
}

pub trait RepositorySource {
    /// Discard any previous checkout and clone `url`.
    fn prepare(&mut self, url: &str) -> VulnPairResult<()>;
    fn checkout(&mut self, commit_id: &str, target: CheckoutTarget) -> VulnPairResult<()>;
    fn remove(&mut self) -> VulnPairResult<()>;
    /// Root of the current checkout.
    fn path(&self) -> &Path;
}

/// Git-backed source that shells out to the `git` binary.
pub struct GitRepository {
    path: PathBuf,
}

impl GitRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn run(&self, dir: &Path, args: &[&str]) -> VulnPairResult<String> {
        debug!(dir = %dir.display(), ?args, "git");
        let output = Command::new("git").args(args).current_dir(dir).output()?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(VulnPairError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

impl RepositorySource for GitRepository {
    fn prepare(&mut self, url: &str) -> VulnPairResult<()> {
        self.remove()?;
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;
        let destination = self.path.to_string_lossy().to_string();
        info!(url, destination = %destination, "cloning");
        // Run from the parent so a relative destination stays relative to it.
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(destination);
        self.run(&parent, &["clone", "--quiet", url, &name])?;
        Ok(())
    }

    fn checkout(&mut self, commit_id: &str, target: CheckoutTarget) -> VulnPairResult<()> {
        self.run(&self.path, &["checkout", "--quiet", "--force", commit_id])?;
        if target == CheckoutTarget::BeforeFix {
            self.run(&self.path, &["checkout", "--quiet", "--force", "HEAD^"])?;
        }
        Ok(())
    }

    fn remove(&mut self) -> VulnPairResult<()> {
        if self.path.exists() {
            std::fs::remove_dir_all(&self.path)?;
        }
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
