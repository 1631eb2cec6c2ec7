//! Commit message generation from diff chunks
//!
//! Every chunk gets its own engine run and yields a micro-message. The
//! micro-messages are then merged by a second profile into the final
//! message, retrying a bounded number of times while the engine comes back
//! empty.

use std::time::Duration;

use backoff::backoff::{Backoff, Constant};
use tracing::debug;

use crate::engine::{GenerationEngine, Profile};
use crate::error::GenerationError;
use crate::presenter::{Presenter, Tone};
use crate::prompt::{chunk_input, final_input, push_micro_message};
use crate::stream::{TaggedOutput, consume};

/// Hard cap on merge attempts for one final message
pub const MAX_ATTEMPTS: u32 = 10;

/// Pause after an attempt that produced no message
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Separator between verbose diagnostic blocks
const SEPARATOR: &str = "----------------";

/// Runs the generation engine for chunks and for the final message
pub struct Generator<'a> {
    engine: &'a dyn GenerationEngine,
    presenter: &'a dyn Presenter,
    quiet: bool,
    verbose: bool,
    retry_delay: Duration,
    timeout: Option<Duration>,
}

impl<'a> Generator<'a> {
    pub fn new(engine: &'a dyn GenerationEngine, presenter: &'a dyn Presenter) -> Self {
        Self {
            engine,
            presenter,
            quiet: false,
            verbose: false,
            retry_delay: RETRY_DELAY,
            timeout: None,
        }
    }

    /// Suppress the live reasoning transcript and error lines
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Show chunks, micro-messages and the aggregated input
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Deadline for a single engine run; `None` waits forever
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the engine once and parse its output
    ///
    /// Returns only after the process has exited. On a timeout or a read
    /// error the process is killed first.
    async fn run_once(&self, profile: Profile, input: &str) -> Result<TaggedOutput, GenerationError> {
        let mut run = self.engine.run(profile, input).await?;
        let echo = if self.quiet { None } else { Some(self.presenter) };
        let parsing = consume(run.output(), echo);

        let parsed = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, parsing).await {
                Ok(parsed) => parsed,
                Err(_) => Err(GenerationError::Timeout(limit.as_secs())),
            },
            None => parsing.await,
        };

        match parsed {
            Ok(output) => {
                run.wait().await;
                Ok(output)
            }
            Err(e) => {
                run.kill().await;
                Err(e)
            }
        }
    }

    /// One engine run; any failure is reported and becomes an empty message
    async fn message_or_empty(&self, profile: Profile, input: &str) -> String {
        match self.run_once(profile, input).await {
            Ok(output) => output.message,
            Err(e) => {
                debug!("Generation run failed: {}", e);
                if !self.quiet {
                    self.presenter.show_line(&format!("Error: {}", e), Tone::Failure);
                }
                String::new()
            }
        }
    }

    /// Generate the micro-message for one chunk
    ///
    /// Runs the engine exactly once. An empty result is returned as-is and
    /// never retried.
    pub async fn micro_message(&self, chunk: &str, context: &str) -> String {
        self.message_or_empty(Profile::Chunk, &chunk_input(chunk, context))
            .await
    }

    /// Generate micro-messages for all chunks, in order, and aggregate them
    ///
    /// Failed chunks still contribute an empty block.
    pub async fn micro_messages(&self, chunks: &[String], context: &str) -> String {
        let total = chunks.len();
        let mut aggregate = String::new();

        for (i, chunk) in chunks.iter().enumerate() {
            let index = i + 1;

            if !self.quiet {
                self.presenter.show_line(" ", Tone::Plain);
            }

            if self.verbose {
                self.presenter
                    .show_line(&format!("Chunk {}/{}:", index, total), Tone::Label);
                self.presenter.show_diff(chunk);
                self.presenter.show_line(SEPARATOR, Tone::Heading);
            }

            let message = self.micro_message(chunk, context).await;

            if self.verbose {
                self.presenter.show_line(
                    &format!("Generated Micro Message for Chunk {}:", index),
                    Tone::Label,
                );
                self.presenter.show_line(&message, Tone::Plain);
                self.presenter.show_line(SEPARATOR, Tone::Heading);
            }

            push_micro_message(&mut aggregate, &message);
        }

        aggregate
    }

    /// Merge micro-messages and context into the final commit message
    ///
    /// Retries while the engine returns no message, waiting the retry delay
    /// between attempts, for at most [`MAX_ATTEMPTS`] attempts. Each call
    /// starts counting from zero.
    ///
    /// # Errors
    ///
    /// * `GenerationError::Exhausted` - every attempt came back empty
    pub async fn final_message(
        &self,
        micro_messages: &str,
        context: &str,
    ) -> Result<String, GenerationError> {
        let input = final_input(micro_messages, context);

        if self.verbose {
            self.presenter.show_line("Final Input to Ollama:", Tone::Label);
            self.presenter.show_line(&input, Tone::Plain);
        }

        let mut backoff = Constant::new(self.retry_delay);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let message = self.message_or_empty(Profile::Merge, &input).await;

            if !message.is_empty() {
                debug!("Final message generated after {} attempt(s)", attempts);
                if self.verbose {
                    self.presenter
                        .show_line("Generated Final Commit Message:", Tone::Label);
                    self.presenter.show_line(&message, Tone::Plain);
                    self.presenter.show_line(SEPARATOR, Tone::Heading);
                }
                return Ok(message);
            }

            if attempts >= MAX_ATTEMPTS {
                debug!("No final message after {} attempts", attempts);
                return Err(GenerationError::Exhausted(attempts));
            }

            debug!("Attempt {} produced no message, retrying", attempts);
            if self.verbose {
                self.presenter.show_line(
                    "❌ Failed to generate a commit message. Retrying...",
                    Tone::Failure,
                );
            }

            if let Some(wait) = backoff.next_backoff() {
                tokio::time::sleep(wait).await;
            }
        }
    }
}
