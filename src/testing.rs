//! Hand-written fakes shared by the unit tests

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;

use crate::presenter::{LineReader, Presenter, Tone};

/// Presenter that records everything instead of printing
#[derive(Default)]
pub struct RecordingPresenter {
    lines: Mutex<Vec<(String, Tone)>>,
    typed: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    /// Lines shown with `show_line`, in order
    pub fn lines(&self) -> Vec<(String, Tone)> {
        self.lines.lock().unwrap().clone()
    }

    /// Lines shown with `type_line`, indent included
    pub fn typed(&self) -> Vec<String> {
        self.typed.lock().unwrap().clone()
    }

    /// Whether any shown line contains `needle`
    pub fn saw(&self, needle: &str) -> bool {
        self.lines().iter().any(|(text, _)| text.contains(needle))
    }

    /// Number of shown lines containing `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.lines()
            .iter()
            .filter(|(text, _)| text.contains(needle))
            .count()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    fn show_line(&self, text: &str, tone: Tone) {
        self.lines.lock().unwrap().push((text.to_string(), tone));
    }

    async fn type_line(&self, text: &str, indent: &str) {
        self.typed.lock().unwrap().push(format!("{indent}{text}"));
    }
}

/// Line reader answering from a fixed script
///
/// Once the script runs out every prompt gets an empty answer, which the
/// interaction loop treats as an invalid choice.
#[derive(Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            prompts: Vec::new(),
        }
    }
}

#[async_trait]
impl LineReader for ScriptedInput {
    async fn prompt_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or_default().trim().to_string())
    }
}

/// Log writer appending into a shared buffer
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Record `warn!` and `error!` events on this thread while the guard lives
pub fn capture_warnings() -> (DefaultGuard, Arc<Mutex<Vec<u8>>>) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || SharedBuffer(sink.clone()))
        .finish();

    (tracing::subscriber::set_default(subscriber), buffer)
}
