//! Git Commit Message - commit messages generated from staged changes
//!
//! The staged diff is split per file, a local model reasons about every file
//! on its own, and a second model merges the per-file messages into one
//! commit message. The user then commits, edits, regenerates or discards it.
//!
//! # Modules
//!
//! - [`diff`] - Splitting a unified diff into per-file chunks
//! - [`stream`] - Parsing tagged reasoning / commit output
//! - [`engine`] - The external generation engine (Ollama)
//! - [`prompt`] - Engine input construction
//! - [`generator`] - Micro-messages and the final message with retries
//! - [`interaction`] - Reviewing the final message
//! - [`git`] - Git operations (diff, commit)
//! - [`editor`] - Editing the message in `$EDITOR`
//! - [`presenter`] - Terminal output and input
//! - [`config`] - Configuration file loading and parsing
//! - [`logging`] - Diagnostic logging setup
//!
//! # Example
//!
//! ```no_run
//! use git_commit_message::{
//!     config::Config, diff::split_diff, engine::OllamaEngine, generator::Generator,
//!     git::{GitCli, Vcs}, presenter::Console,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let engine = OllamaEngine::from_config(&config);
//! let console = Console::new(config.typing_delay());
//! let generator = Generator::new(&engine, &console).quiet(true);
//!
//! let diff = GitCli.staged_diff().await?;
//! let micro_messages = generator.micro_messages(&split_diff(&diff), "").await;
//! let message = generator.final_message(&micro_messages, "").await?;
//! println!("{}", message);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diff;
pub mod editor;
pub mod engine;
pub mod error;
pub mod generator;
pub mod git;
pub mod interaction;
pub mod logging;
pub mod presenter;
pub mod prompt;
pub mod stream;

#[cfg(test)]
mod testing;
