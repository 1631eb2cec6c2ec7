//! Git operations for commit message generation
//!
//! This module provides the version-control collaborator:
//! - Get the staged diff
//! - Create the commit with the accepted message

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{CommitError, DiffError};

/// Version-control collaborator.
///
/// This abstraction allows mocking git in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Staged changes as a unified diff, returned exactly as git printed it.
    async fn staged_diff(&self) -> Result<String, DiffError>;

    /// Commit the staged changes with `message`.
    async fn commit(&self, message: &str) -> Result<(), CommitError>;
}

/// [`Vcs`] implemented by running the `git` executable
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

#[async_trait]
impl Vcs for GitCli {
    /// Executes `git diff --staged`
    ///
    /// # Errors
    ///
    /// * Git command fails to execute
    /// * Not in a git repository
    /// * Nothing is staged (`DiffError::NoChanges`)
    async fn staged_diff(&self) -> Result<String, DiffError> {
        let output = Command::new("git")
            .args(["diff", "--staged"])
            .output()
            .await
            .map_err(DiffError::Spawn)?;

        if !output.status.success() {
            return Err(DiffError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let diff = String::from_utf8_lossy(&output.stdout).into_owned();
        if diff.is_empty() {
            return Err(DiffError::NoChanges);
        }

        Ok(diff)
    }

    /// Executes `git commit -m <message>`
    ///
    /// Git's own output and hooks use the terminal directly, so a failure is
    /// explained right above the caller's report.
    async fn commit(&self, message: &str) -> Result<(), CommitError> {
        let status = Command::new("git")
            .args(["commit", "-m", message])
            .status()
            .await
            .map_err(CommitError::Spawn)?;

        if !status.success() {
            return Err(CommitError::NonZeroExit {
                code: status.code().unwrap_or(-1),
            });
        }

        Ok(())
    }
}
