//! Error types for git_commit_message modules using thiserror.

use thiserror::Error;

/// Errors from reading the staged diff.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to execute git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git diff exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("No changes detected. Please stage your changes first.")]
    NoChanges,
}

/// Errors from a single invocation of the generation engine.
///
/// Everything except `Exhausted` describes one failed attempt; callers treat
/// those exactly like an empty message.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{0}' did not provide a stdout pipe")]
    NoStdout(String),

    #[error("Failed to read generation output: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to generate a commit message after {0} attempts")]
    Exhausted(u32),
}

/// Errors from `git commit`.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Failed to execute git commit: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git commit exited with code {code}")]
    NonZeroExit { code: i32 },
}

/// Errors from editing the message in an external editor.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Error creating temp file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("Failed to launch editor '{editor}': {source}")]
    Spawn {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Editor '{editor}' exited with code {code}")]
    NonZeroExit { editor: String, code: i32 },

    #[error("Error reading edited message: {0}")]
    ReadBack(#[source] std::io::Error),
}
