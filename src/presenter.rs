//! Terminal presentation and line input
//!
//! Core modules never write escape sequences themselves. They describe what
//! to show through [`Presenter`] and read answers through [`LineReader`], so
//! the whole flow also runs headless in tests.

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use colored::{ColoredString, Colorize};
use regex::Regex;

/// Horizontal rule used around panel titles
pub const RULE: &str = "──────────────────────────────────────────────────────────────";

/// Visual role of a line of output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Panel titles and rules
    Heading,
    /// Sub-headings in verbose output
    Label,
    /// Progress notices and questions
    Notice,
    Success,
    Failure,
    /// Option letters and other emphasised text
    Strong,
    Plain,
    /// Added line in a diff
    Addition,
    /// Removed line in a diff
    Removal,
    /// Context or header line in a diff
    Context,
}

/// Pick the tone for one line of a unified diff
///
/// # Example
///
/// ```
/// use git_commit_message::presenter::{Tone, diff_tone};
///
/// assert_eq!(diff_tone("+added"), Tone::Addition);
/// assert_eq!(diff_tone("-removed"), Tone::Removal);
/// assert_eq!(diff_tone(" context"), Tone::Context);
/// ```
pub fn diff_tone(line: &str) -> Tone {
    if line.starts_with('+') {
        Tone::Addition
    } else if line.starts_with('-') {
        Tone::Removal
    } else {
        Tone::Context
    }
}

/// Output capability used by every interactive component
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Show one line of text with the given tone
    fn show_line(&self, text: &str, tone: Tone);

    /// Show one line character by character
    ///
    /// Only ever pauses for the fixed per-character delay.
    async fn type_line(&self, text: &str, indent: &str);

    /// Show a title between two horizontal rules
    fn show_panel(&self, title: &str) {
        self.show_line("", Tone::Plain);
        self.show_line(RULE, Tone::Heading);
        self.show_line(title, Tone::Heading);
        self.show_line(RULE, Tone::Heading);
    }

    /// Show a diff with additions and removals highlighted
    fn show_diff(&self, diff: &str) {
        for line in diff.lines() {
            self.show_line(line, diff_tone(line));
        }
    }
}

/// Input capability: one trimmed line per call
#[async_trait]
pub trait LineReader: Send {
    /// Ask `prompt` and return the trimmed answer
    async fn prompt_line(&mut self, prompt: &str) -> io::Result<String>;
}

static ANSI_SGR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").ok());

/// Remove ANSI color sequences from `text`
///
/// # Example
///
/// ```
/// use git_commit_message::presenter::strip_ansi;
///
/// assert_eq!(strip_ansi("\x1b[1;32mdone\x1b[0m"), "done");
/// ```
pub fn strip_ansi(text: &str) -> String {
    match ANSI_SGR.as_ref() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}

/// [`Presenter`] writing colored output to stdout
pub struct Console {
    typing_delay: Duration,
}

impl Console {
    pub fn new(typing_delay: Duration) -> Self {
        Self { typing_delay }
    }

    fn paint(text: &str, tone: Tone) -> ColoredString {
        match tone {
            Tone::Heading => text.blue().bold(),
            Tone::Label => text.cyan().bold(),
            Tone::Notice => text.yellow().bold(),
            Tone::Success => text.green().bold(),
            Tone::Failure => text.red().bold(),
            Tone::Strong => text.bold(),
            Tone::Plain => text.normal(),
            Tone::Addition => text.green(),
            Tone::Removal => text.red(),
            Tone::Context => text.bright_black(),
        }
    }
}

#[async_trait]
impl Presenter for Console {
    fn show_line(&self, text: &str, tone: Tone) {
        println!("{}", Self::paint(text, tone));
    }

    async fn type_line(&self, text: &str, indent: &str) {
        let clean = strip_ansi(text);
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{indent}");

        for ch in clean.chars() {
            let _ = write!(stdout, "{ch}");
            let _ = stdout.flush();
            tokio::time::sleep(self.typing_delay).await;
        }

        let _ = writeln!(stdout);
    }
}

/// Read one answer line from `reader`, trimmed
///
/// End of input reads as an empty answer.
pub fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// [`LineReader`] prompting on the terminal
///
/// Uses dialoguer on an interactive terminal. When stdin or stderr is not a
/// terminal, e.g. with piped answers, the prompt is printed and a plain
/// line is read from stdin instead.
#[derive(Default)]
pub struct TerminalInput;

#[async_trait]
impl LineReader for TerminalInput {
    async fn prompt_line(&mut self, prompt: &str) -> io::Result<String> {
        if !(io::stdin().is_terminal() && io::stderr().is_terminal()) {
            let mut stdout = io::stdout();
            write!(stdout, "{}: ", prompt.yellow().bold())?;
            stdout.flush()?;
            return read_answer(&mut io::stdin().lock());
        }

        let answer: String = dialoguer::Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)?;

        Ok(answer.trim().to_string())
    }
}
