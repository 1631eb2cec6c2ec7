//! Editing a commit message in the user's editor

use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::EditorError;

/// Environment variable naming the user's editor
pub const EDITOR_ENV_VAR: &str = "EDITOR";

/// Opens a file for interactive editing.
///
/// This abstraction allows mocking the editor in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Editor: Send + Sync {
    /// Edit `path` in place and return once the editor has exited.
    async fn open(&self, path: &Path) -> Result<(), EditorError>;
}

/// Editor launched as a subprocess attached to the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEditor {
    command: String,
}

impl SystemEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Use `$EDITOR`, or `fallback` when it is unset or blank
    ///
    /// # Example
    ///
    /// ```
    /// use git_commit_message::editor::SystemEditor;
    ///
    /// let editor = SystemEditor::from_env("nano");
    /// assert!(!editor.command().is_empty());
    /// ```
    pub fn from_env(fallback: &str) -> Self {
        match env::var(EDITOR_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => Self::new(v.trim()),
            _ => Self::new(fallback),
        }
    }

    /// Full editor command line, possibly with arguments
    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl Editor for SystemEditor {
    async fn open(&self, path: &Path) -> Result<(), EditorError> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().unwrap_or_default();

        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .await
            .map_err(|source| EditorError::Spawn {
                editor: self.command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(EditorError::NonZeroExit {
                editor: self.command.clone(),
                code: status.code().unwrap_or(-1),
            });
        }

        Ok(())
    }
}

/// Let the user rewrite `message` in `editor`
///
/// The message goes into a temporary file that is removed again on every
/// return path. Whatever the file holds after the editor exits is returned
/// as-is, without trimming.
///
/// # Errors
///
/// * The temporary file cannot be created or written
/// * The editor cannot be started or exits with a non-zero code
/// * The file cannot be read back
pub async fn edit_message<E>(editor: &E, message: &str) -> Result<String, EditorError>
where
    E: Editor + ?Sized,
{
    let mut file = tempfile::Builder::new()
        .prefix("commit-msg-")
        .tempfile()
        .map_err(EditorError::TempFile)?;
    file.write_all(message.as_bytes())
        .and_then(|_| file.flush())
        .map_err(EditorError::TempFile)?;

    debug!("Editing commit message in {}", file.path().display());
    editor.open(file.path()).await?;

    fs::read_to_string(file.path()).map_err(EditorError::ReadBack)
}
