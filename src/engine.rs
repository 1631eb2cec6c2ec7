//! Ollama integration for commit message generation
//!
//! The generation engine is an external command whose standard output is
//! handed back as a stream, so callers can parse it while it is produced.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::presenter::{Presenter, Tone};

/// Standard output of one engine run
pub type LineStream = Box<dyn AsyncBufRead + Send + Unpin>;

/// One started engine run: its output and, for real processes, the child
///
/// The child is killed if the run is dropped before [`EngineRun::wait`] or
/// [`EngineRun::kill`] has been awaited.
pub struct EngineRun {
    output: LineStream,
    child: Option<Child>,
}

impl EngineRun {
    /// A run with no process behind it
    pub fn from_stream(output: LineStream) -> Self {
        Self {
            output,
            child: None,
        }
    }

    fn with_child(output: LineStream, child: Child) -> Self {
        Self {
            output,
            child: Some(child),
        }
    }

    /// Standard output of the run
    pub fn output(&mut self) -> &mut LineStream {
        &mut self.output
    }

    /// Wait for the process to exit
    pub async fn wait(mut self) {
        if let Some(child) = self.child.as_mut() {
            match child.wait().await {
                Ok(status) => debug!("Generation process exited with {}", status),
                Err(e) => debug!("Failed to wait for generation process: {}", e),
            }
        }
    }

    /// Kill the process and wait until it is gone
    pub async fn kill(mut self) {
        if let Some(child) = self.child.as_mut()
            && let Err(e) = child.kill().await
        {
            debug!("Failed to kill generation process: {}", e);
        }
    }
}

/// Which model a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Reasons about a single diff chunk
    Chunk,
    /// Merges micro-messages into the final message
    Merge,
}

/// Runs the external text-generation engine.
///
/// This abstraction allows mocking the subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationEngine: Send + Sync {
    /// Start one run with `input` as the prompt.
    async fn run(&self, profile: Profile, input: &str) -> Result<EngineRun, GenerationError>;
}

/// Engine backed by the `ollama` CLI
#[derive(Debug, Clone)]
pub struct OllamaEngine {
    program: String,
    chunk_model: String,
    merge_model: String,
}

impl OllamaEngine {
    pub fn new(
        program: impl Into<String>,
        chunk_model: impl Into<String>,
        merge_model: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            chunk_model: chunk_model.into(),
            merge_model: merge_model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.program, &config.chunk_model, &config.merge_model)
    }

    /// Model name for a profile
    pub fn model(&self, profile: Profile) -> &str {
        match profile {
            Profile::Chunk => &self.chunk_model,
            Profile::Merge => &self.merge_model,
        }
    }

    /// Pull both models, announcing it through `presenter` when given
    pub async fn update_models(&self, presenter: Option<&dyn Presenter>) {
        if let Some(p) = presenter {
            p.show_line("Updating Ollama model...", Tone::Notice);
        }
        self.pull_models().await;
        if let Some(p) = presenter {
            p.show_line("Model updated successfully!", Tone::Success);
        }
    }

    /// Pull the latest version of both models
    ///
    /// Progress goes to stderr, so stdout only ever carries the message. A
    /// failed pull is logged and skipped; this never fails.
    pub async fn pull_models(&self) {
        for model in [&self.merge_model, &self.chunk_model] {
            let status = Command::new(&self.program)
                .args(["pull", model.as_str()])
                .stdin(Stdio::null())
                .stdout(std::io::stderr())
                .status()
                .await;

            match status {
                Ok(s) if s.success() => debug!("Pulled {}", model),
                Ok(s) => warn!("'{} pull {}' exited with {}", self.program, model, s),
                Err(e) => warn!("Failed to run '{} pull {}': {}", self.program, model, e),
            }
        }
    }
}

#[async_trait]
impl GenerationEngine for OllamaEngine {
    async fn run(&self, profile: Profile, input: &str) -> Result<EngineRun, GenerationError> {
        let model = self.model(profile);
        debug!("Running {} with {} ({} bytes of input)", self.program, model, input.len());

        let mut child = Command::new(&self.program)
            .args(["run", model, input])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GenerationError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GenerationError::NoStdout(self.program.clone()))?;

        Ok(EngineRun::with_child(Box::new(BufReader::new(stdout)), child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::consume;
    use crate::testing::RecordingPresenter;

    #[test]
    fn test_model_per_profile() {
        // Arrange
        let engine = OllamaEngine::from_config(&Config::default());

        // Act & Assert
        assert_eq!(engine.model(Profile::Chunk), "tavernari/git-commit-message:reasoning");
        assert_eq!(engine.model(Profile::Merge), "tavernari/git-commit-message:merge_commits");
    }

    #[tokio::test]
    async fn test_run_spawn_failure() {
        // Arrange - an executable that does not exist
        let engine = OllamaEngine::new("nonexistent_engine_12345", "a", "b");

        // Act
        let result = engine.run(Profile::Chunk, "input").await;

        // Assert
        match result {
            Err(GenerationError::SpawnFailed { program, .. }) => {
                assert_eq!(program, "nonexistent_engine_12345")
            }
            _ => panic!("Expected SpawnFailed error"),
        }
    }

    /// `echo run <model> <input>` stands in for the engine: its output shows
    /// the arguments the engine would have received.
    #[tokio::test]
    #[cfg(unix)]
    async fn test_run_streams_stdout() {
        // Arrange
        let engine = OllamaEngine::new("echo", "chunk-model", "merge-model");

        // Act
        let mut run = engine.run(Profile::Merge, "the prompt").await.unwrap();
        let parsed = consume(run.output(), None::<&RecordingPresenter>).await.unwrap();
        run.wait().await;

        // Assert - no markers, so the message is empty
        assert!(parsed.message.is_empty());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_run_passes_model_and_input() {
        use std::os::unix::fs::PermissionsExt;

        // Arrange - a fake engine echoing its arguments after the end marker
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-engine");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf '<reasoning>\\nwhy\\n</reasoning>\\n%s|%s|%s\\n' \"$1\" \"$2\" \"$3\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let engine = OllamaEngine::new(script.to_str().unwrap(), "chunk-model", "merge-model");

        // Act
        let mut run = engine.run(Profile::Chunk, "diff body").await.unwrap();
        let parsed = consume(run.output(), None::<&RecordingPresenter>).await.unwrap();
        run.wait().await;

        // Assert
        assert_eq!(parsed.reasoning, "why\n");
        assert_eq!(parsed.message, "run|chunk-model|diff body");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_pull_models_ignores_failures() {
        // Arrange - `false` fails every pull
        let engine = OllamaEngine::new("false", "a", "b");

        // Act & Assert - completes without error or panic
        engine.pull_models().await;
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_update_models_notices() {
        // Arrange
        let engine = OllamaEngine::new("true", "a", "b");
        let presenter = RecordingPresenter::default();

        // Act
        engine.update_models(Some(&presenter)).await;

        // Assert
        assert!(presenter.saw("Updating Ollama model..."));
        assert!(presenter.saw("Model updated successfully!"));
    }
}
