//! Interactive review of the generated commit message
//!
//! The user is offered commit, edit, regenerate and discard until one of
//! them ends the session. Every edit and regeneration goes back through the
//! proposal so the options are always shown again; nothing is committed
//! implicitly.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::editor::{Editor, edit_message};
use crate::error::GenerationError;
use crate::generator::Generator;
use crate::git::Vcs;
use crate::presenter::{LineReader, Presenter, Tone};

/// Question asked before the first generation and before every regeneration
pub const CONTEXT_PROMPT: &str =
    "Provide additional context for the commit (optional, press Enter to skip)";

/// One option the user can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Choice {
    Commit,
    Edit,
    Regenerate,
    Discard,
}

impl Choice {
    /// Display order
    pub const ALL: [Choice; 4] = [
        Choice::Commit,
        Choice::Edit,
        Choice::Regenerate,
        Choice::Discard,
    ];

    pub fn letter(self) -> char {
        match self {
            Choice::Commit => 'c',
            Choice::Edit => 'e',
            Choice::Regenerate => 'g',
            Choice::Discard => 'd',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Choice::Commit => "Commit with this message",
            Choice::Edit => "Edit this message",
            Choice::Regenerate => "Generate again with some context",
            Choice::Discard => "Discard",
        }
    }

    /// Parse a trimmed answer; only the bare letter is accepted
    ///
    /// # Example
    ///
    /// ```
    /// use git_commit_message::interaction::Choice;
    ///
    /// assert_eq!(Choice::parse("g"), Some(Choice::Regenerate));
    /// assert_eq!(Choice::parse("commit"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Choice> {
        Self::ALL
            .into_iter()
            .find(|c| input.len() == 1 && input.starts_with(c.letter()))
    }
}

/// Options that are currently unavailable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions(BTreeSet<Choice>);

impl Exclusions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, choice: Choice) -> Self {
        self.0.insert(choice);
        self
    }

    pub fn contains(&self, choice: Choice) -> bool {
        self.0.contains(&choice)
    }

    pub fn union(&self, other: &Exclusions) -> Exclusions {
        Exclusions(self.0.union(&other.0).copied().collect())
    }

    /// Options still on offer, in display order
    pub fn available(&self) -> impl Iterator<Item = Choice> + '_ {
        Choice::ALL.into_iter().filter(|c| !self.contains(*c))
    }
}

/// Where the review loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Proposed,
    Editing,
    Regenerating,
    Committed,
    Discarded,
    Aborted,
}

/// How the review ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed,
    Discarded,
    /// Unknown or unavailable option; `input` is what the user typed
    Aborted { input: String },
}

/// Ask for free-text context; a failed read counts as no context
pub async fn request_context(input: &mut dyn LineReader) -> String {
    match input.prompt_line(CONTEXT_PROMPT).await {
        Ok(context) => context,
        Err(e) => {
            warn!("Failed to read context: {}", e);
            String::new()
        }
    }
}

/// Drives the review of one final commit message
pub struct InteractionController<'a> {
    generator: &'a Generator<'a>,
    presenter: &'a dyn Presenter,
    input: &'a mut dyn LineReader,
    vcs: &'a dyn Vcs,
    editor: &'a dyn Editor,
    micro_messages: String,
    base: Exclusions,
    excluded: Exclusions,
    message: String,
}

impl<'a> InteractionController<'a> {
    /// `base` holds the options excluded by the run mode; it is restored
    /// whenever a usable message exists again.
    pub fn new(
        generator: &'a Generator<'a>,
        presenter: &'a dyn Presenter,
        input: &'a mut dyn LineReader,
        vcs: &'a dyn Vcs,
        editor: &'a dyn Editor,
        micro_messages: impl Into<String>,
        base: Exclusions,
    ) -> Self {
        Self {
            generator,
            presenter,
            input,
            vcs,
            editor,
            micro_messages: micro_messages.into(),
            excluded: base.clone(),
            base,
            message: String::new(),
        }
    }

    pub fn excluded(&self) -> &Exclusions {
        &self.excluded
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Take a generation result as the current proposal
    ///
    /// A message is shown typed out. Exhaustion leaves an empty message and
    /// excludes commit on top of the base exclusions.
    pub async fn propose(&mut self, result: Result<String, GenerationError>) {
        match result {
            Ok(message) => {
                self.presenter.show_panel("Final Commit Message");
                for line in message.lines() {
                    self.presenter.type_line(line, "").await;
                }
                self.message = message;
                self.excluded = self.base.clone();
            }
            Err(e) => {
                debug!("{}", e);
                self.presenter
                    .show_line("❌ Failed to generate a commit message.", Tone::Failure);
                self.message.clear();
                self.excluded = self.base.union(&Exclusions::none().with(Choice::Commit));
            }
        }
    }

    /// Run the review until commit, discard or an invalid choice
    pub async fn run(&mut self) -> Outcome {
        let mut state = State::Proposed;
        let mut answer = String::new();

        loop {
            debug!("Interaction state: {:?}", state);
            state = match state {
                State::Proposed => {
                    answer = self.choose().await;
                    match Choice::parse(&answer) {
                        Some(Choice::Discard) => State::Discarded,
                        Some(choice) if self.excluded.contains(choice) => State::Aborted,
                        Some(Choice::Commit) => self.commit().await,
                        Some(Choice::Edit) => State::Editing,
                        Some(Choice::Regenerate) => State::Regenerating,
                        None => State::Aborted,
                    }
                }
                State::Editing => {
                    self.edit().await;
                    State::Proposed
                }
                State::Regenerating => {
                    self.regenerate().await;
                    State::Proposed
                }
                State::Committed => return Outcome::Committed,
                State::Discarded => {
                    self.presenter
                        .show_line("❌ Commit discarded.", Tone::Failure);
                    return Outcome::Discarded;
                }
                State::Aborted => {
                    self.presenter
                        .show_line("Invalid option. Aborting.", Tone::Failure);
                    return Outcome::Aborted { input: answer };
                }
            };
        }
    }

    async fn choose(&mut self) -> String {
        self.presenter.show_line("", Tone::Plain);
        self.presenter.show_line("Options:", Tone::Heading);
        for choice in self.excluded.available() {
            self.presenter.show_line(
                &format!("  ({}) {}", choice.letter(), choice.label()),
                Tone::Strong,
            );
        }

        match self.input.prompt_line("Choose").await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Failed to read choice: {}", e);
                String::new()
            }
        }
    }

    async fn commit(&mut self) -> State {
        self.presenter
            .show_line("Committing with the following message:", Tone::Notice);
        self.presenter.show_line(&self.message, Tone::Plain);

        match self.vcs.commit(&self.message).await {
            Ok(()) => {
                self.presenter
                    .show_line("✅ Commit created successfully!", Tone::Success);
                State::Committed
            }
            Err(e) => {
                debug!("{}", e);
                self.presenter.show_line(
                    "❌ Commit failed. Please check the errors above.",
                    Tone::Failure,
                );
                State::Proposed
            }
        }
    }

    async fn edit(&mut self) {
        self.presenter.show_line(
            "Opening editor to edit the commit message...",
            Tone::Notice,
        );

        match edit_message(self.editor, &self.message).await {
            Ok(updated) => {
                self.presenter.show_panel("Updated Commit Message");
                self.presenter.show_line(&updated, Tone::Plain);
                if !updated.trim().is_empty() {
                    self.excluded = self.base.clone();
                }
                self.message = updated;
            }
            Err(e) => {
                debug!("{}", e);
                self.presenter
                    .show_line(&format!("Error with editor: {}", e), Tone::Failure);
            }
        }
    }

    async fn regenerate(&mut self) {
        self.presenter
            .show_line("Generating again with some context...", Tone::Notice);
        let context = request_context(&mut *self.input).await;

        let result = self
            .generator
            .final_message(&self.micro_messages, &context)
            .await;
        self.propose(result).await;
    }
}
