//! Parsing the tagged output of the generation engine
//!
//! The engine prints free text, then a `<reasoning>` block, then the commit
//! message after `</reasoning>`. Output is consumed line by line as it
//! arrives so the reasoning can be shown live.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::GenerationError;
use crate::presenter::Presenter;

/// Marker opening the reasoning block
pub const REASONING_START: &str = "<reasoning>";

/// Marker closing the reasoning block; the message follows it
pub const REASONING_END: &str = "</reasoning>";

/// Indent applied to echoed reasoning lines
const ECHO_INDENT: &str = "  ";

/// Part of the stream a line belongs to
///
/// Sections only move forward: `Normal` → `Reasoning` → `Commit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    /// Before any marker; lines are discarded
    #[default]
    Normal,
    /// Between the markers
    Reasoning,
    /// After the end marker
    Commit,
}

impl Section {
    /// Section entered after a marker line, or `None` for a content line
    ///
    /// The start marker is checked first, so a line carrying both markers
    /// opens reasoning. Neither marker moves the stream backwards.
    ///
    /// # Example
    ///
    /// ```
    /// use git_commit_message::stream::Section;
    ///
    /// assert_eq!(Section::Normal.after("<reasoning>"), Some(Section::Reasoning));
    /// assert_eq!(Section::Commit.after("<reasoning>"), Some(Section::Commit));
    /// assert_eq!(Section::Normal.after("<reasoning>x</reasoning>"), Some(Section::Reasoning));
    /// assert_eq!(Section::Reasoning.after("plain text"), None);
    /// ```
    pub fn after(self, line: &str) -> Option<Section> {
        if line.contains(REASONING_START) {
            Some(self.max(Section::Reasoning))
        } else if line.contains(REASONING_END) {
            Some(Section::Commit)
        } else {
            None
        }
    }
}

/// What happened to a line fed into the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line held a marker and was dropped
    Marker(Section),
    /// The line was kept as content of the given section
    Content(Section),
    /// The line came before any marker and was dropped
    Discarded,
}

/// Reasoning and message separated out of one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedOutput {
    /// Text between the markers, verbatim, one `\n` per line
    pub reasoning: String,
    /// Text after the end marker, trimmed; empty when no end marker was seen
    pub message: String,
}

/// Line-at-a-time state machine behind [`consume`]
#[derive(Debug, Default)]
pub struct TaggedStreamParser {
    section: Section,
    reasoning: String,
    message: String,
}

impl TaggedStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current section
    pub fn section(&self) -> Section {
        self.section
    }

    /// Feed one line without its line terminator
    pub fn feed(&mut self, line: &str) -> LineOutcome {
        if let Some(next) = self.section.after(line) {
            self.section = next;
            return LineOutcome::Marker(next);
        }

        match self.section {
            Section::Normal => return LineOutcome::Discarded,
            Section::Reasoning => {
                self.reasoning.push_str(line);
                self.reasoning.push('\n');
            }
            Section::Commit => {
                self.message.push_str(line);
                self.message.push('\n');
            }
        }

        LineOutcome::Content(self.section)
    }

    /// Finish parsing and return both parts
    pub fn finish(self) -> TaggedOutput {
        TaggedOutput {
            reasoning: self.reasoning,
            message: self.message.trim().to_string(),
        }
    }
}

/// Parse a complete engine stream
///
/// Reads `reader` to its end. When `echo` is set, every reasoning line is
/// typed out through it as soon as it arrives. Invalid UTF-8 is replaced
/// rather than rejected.
///
/// # Errors
///
/// * Reading from the stream fails
///
/// # Example
///
/// ```
/// use git_commit_message::presenter::Presenter;
/// use git_commit_message::stream::consume;
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let output = b"<reasoning>\nsmall fix\n</reasoning>\nfix: typo\n";
/// let parsed = consume(&output[..], None::<&dyn Presenter>).await?;
/// assert_eq!(parsed.reasoning, "small fix\n");
/// assert_eq!(parsed.message, "fix: typo");
/// # Ok(())
/// # }
/// ```
pub async fn consume<R, P>(mut reader: R, echo: Option<&P>) -> Result<TaggedOutput, GenerationError>
where
    R: AsyncBufRead + Unpin,
    P: Presenter + ?Sized,
{
    let mut parser = TaggedStreamParser::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(GenerationError::ReadFailed)?;
        if read == 0 {
            break;
        }

        let text = String::from_utf8_lossy(&buf);
        let line = text.strip_suffix('\n').unwrap_or(&*text);
        let line = line.strip_suffix('\r').unwrap_or(line);

        if parser.feed(line) == LineOutcome::Content(Section::Reasoning)
            && let Some(presenter) = echo
        {
            presenter.type_line(line, ECHO_INDENT).await;
        }
    }

    Ok(parser.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPresenter;

    fn parse_lines(lines: &[&str]) -> TaggedOutput {
        let mut parser = TaggedStreamParser::new();
        for line in lines {
            parser.feed(line);
        }
        parser.finish()
    }

    #[test]
    fn test_parser_splits_reasoning_and_message() {
        // Arrange
        let lines = [
            "thinking out loud",
            "<reasoning>",
            "The diff renames a function.",
            "",
            "  Indented detail.",
            "</reasoning>",
            "",
            "refactor: rename parse to parse_line",
            "",
            "Body line.",
            "",
        ];

        // Act
        let output = parse_lines(&lines);

        // Assert - reasoning verbatim, message trimmed
        assert_eq!(
            output.reasoning,
            "The diff renames a function.\n\n  Indented detail.\n"
        );
        assert_eq!(
            output.message,
            "refactor: rename parse to parse_line\n\nBody line."
        );
    }

    #[test]
    fn test_parser_without_end_marker_has_empty_message() {
        // Arrange - reasoning never closed
        let lines = ["<reasoning>", "still thinking", "feat: looks like a message"];

        // Act
        let output = parse_lines(&lines);

        // Assert
        assert_eq!(output.reasoning, "still thinking\nfeat: looks like a message\n");
        assert!(output.message.is_empty());
    }

    #[test]
    fn test_parser_without_any_marker_is_empty() {
        // Act
        let output = parse_lines(&["feat: add thing", "body"]);

        // Assert - untagged output is not a message
        assert_eq!(output, TaggedOutput::default());
    }

    #[test]
    fn test_parser_end_marker_without_start() {
        // Act
        let output = parse_lines(&["noise", "</reasoning>", "fix: handle empty input"]);

        // Assert
        assert!(output.reasoning.is_empty());
        assert_eq!(output.message, "fix: handle empty input");
    }

    #[test]
    fn test_parser_marker_lines_are_not_content() {
        // Arrange - markers embedded in longer lines
        let lines = [
            "Sure! <reasoning> here we go",
            "reason",
            "done </reasoning> now",
            "chore: tidy",
        ];

        // Act
        let output = parse_lines(&lines);

        // Assert
        assert_eq!(output.reasoning, "reason\n");
        assert_eq!(output.message, "chore: tidy");
    }

    #[test]
    fn test_parser_never_moves_backwards() {
        // Arrange
        let mut parser = TaggedStreamParser::new();
        parser.feed("<reasoning>");
        parser.feed("</reasoning>");

        // Act - a stray start marker in the message section
        let outcome = parser.feed("<reasoning>");
        parser.feed("docs: update readme");

        // Assert
        assert_eq!(outcome, LineOutcome::Marker(Section::Commit));
        assert_eq!(parser.section(), Section::Commit);
        assert_eq!(parser.finish().message, "docs: update readme");
    }

    #[test]
    fn test_parser_single_line_with_both_markers() {
        // Act
        let output = parse_lines(&["<reasoning>short</reasoning>", "fix: one-liner"]);

        // Assert - the line only opens reasoning, so no message follows
        assert_eq!(output.reasoning, "fix: one-liner\n");
        assert!(output.message.is_empty());
    }

    #[test]
    fn test_parser_both_markers_after_commit_stays_in_commit() {
        // Act
        let output = parse_lines(&[
            "<reasoning>",
            "why",
            "</reasoning>",
            "feat: a",
            "<reasoning>echo</reasoning>",
            "body",
        ]);

        // Assert - marker line dropped, no regression
        assert_eq!(output.reasoning, "why\n");
        assert_eq!(output.message, "feat: a\nbody");
    }

    #[test]
    fn test_feed_reports_line_outcomes() {
        // Arrange
        let mut parser = TaggedStreamParser::new();

        // Act & Assert
        assert_eq!(parser.feed("hello"), LineOutcome::Discarded);
        assert_eq!(parser.feed("<reasoning>"), LineOutcome::Marker(Section::Reasoning));
        assert_eq!(parser.feed("why"), LineOutcome::Content(Section::Reasoning));
        assert_eq!(parser.feed("</reasoning>"), LineOutcome::Marker(Section::Commit));
        assert_eq!(parser.feed("what"), LineOutcome::Content(Section::Commit));
    }

    #[tokio::test]
    async fn test_consume_echoes_reasoning_only() {
        // Arrange
        let output = b"preamble\n<reasoning>\nfirst\nsecond\n</reasoning>\nfeat: x\n";
        let presenter = RecordingPresenter::default();

        // Act
        let parsed = consume(&output[..], Some(&presenter)).await.unwrap();

        // Assert - reasoning lines typed out in order, with indent
        assert_eq!(presenter.typed(), vec!["  first", "  second"]);
        assert_eq!(parsed.message, "feat: x");
    }

    #[tokio::test]
    async fn test_consume_suppressed_echo() {
        // Arrange
        let output = b"<reasoning>\nhidden\n</reasoning>\nfeat: y\n";

        // Act
        let parsed = consume(&output[..], None::<&RecordingPresenter>).await.unwrap();

        // Assert
        assert_eq!(parsed.reasoning, "hidden\n");
        assert_eq!(parsed.message, "feat: y");
    }

    #[tokio::test]
    async fn test_consume_handles_crlf_and_missing_final_newline() {
        // Arrange
        let output = b"<reasoning>\r\nwhy\r\n</reasoning>\r\nfix: z";

        // Act
        let parsed = consume(&output[..], None::<&RecordingPresenter>).await.unwrap();

        // Assert
        assert_eq!(parsed.reasoning, "why\n");
        assert_eq!(parsed.message, "fix: z");
    }

    #[tokio::test]
    async fn test_consume_replaces_invalid_utf8() {
        // Arrange
        let output = b"</reasoning>\nfix: bad \xFF byte\n";

        // Act
        let parsed = consume(&output[..], None::<&RecordingPresenter>).await.unwrap();

        // Assert
        assert!(parsed.message.contains('\u{FFFD}'));
        assert!(parsed.message.starts_with("fix: bad"));
    }

    #[tokio::test]
    async fn test_consume_empty_stream() {
        // Act
        let parsed = consume(&b""[..], None::<&RecordingPresenter>).await.unwrap();

        // Assert
        assert_eq!(parsed, TaggedOutput::default());
    }
}
