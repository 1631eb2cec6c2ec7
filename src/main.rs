//! CLI tool to generate git commit messages with a local Ollama model
//!
//! This tool splits the staged changes per file, lets the model reason
//! about each file, merges the results into one commit message and lets
//! the user review it before committing.

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::debug;

use git_commit_message::{
    config::{Config, load_config},
    diff::split_diff,
    editor::SystemEditor,
    engine::OllamaEngine,
    error::DiffError,
    generator::Generator,
    git::{GitCli, Vcs},
    interaction::{Exclusions, InteractionController, request_context},
    logging,
    presenter::{Console, Presenter, TerminalInput, Tone},
};

const LONG_ABOUT: &str = "\
Generates intelligent git commit messages based on staged changes.

  - Analyzes staged git changes (git diff --staged)
  - Splits changes into chunks for better analysis
  - Generates micro commit messages for each chunk
  - Combines them into a final cohesive commit message
  - Allows review and editing before committing";

/// Command-line arguments
#[derive(Parser)]
#[command(name = "git-commit-message")]
#[command(about = "Git Commit Message Generator", long_about = LONG_ABOUT)]
struct Args {
    /// Output only the final commit message without UI
    #[arg(long)]
    only_message: bool,

    /// Print detailed steps including chunks and diffs
    #[arg(long)]
    verbose: bool,

    /// Update the Ollama models before running
    #[arg(long)]
    update: bool,

    /// Path to a configuration file (TOML format)
    #[arg(long)]
    config: Option<String>,
}

/// Main entry point
///
/// # Process flow
///
/// 1. Parse command-line arguments and load the configuration
/// 2. Optionally pull the latest models
/// 3. Read the staged diff and ask for optional context
/// 4. Generate one micro-message per file, then the final message
/// 5. Print the message (`--only-message`) or start the interactive review
///
/// # Errors
///
/// * Configuration file not found or invalid
/// * Not in a git repository
/// * `--only-message` and no message after every retry
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    debug!("Using configuration: {:?}", config);

    let console = Console::new(config.typing_delay());
    let engine = OllamaEngine::from_config(&config);

    if args.update {
        let notices: Option<&dyn Presenter> = if args.only_message {
            None
        } else {
            Some(&console)
        };
        engine.update_models(notices).await;
    }

    if !args.only_message {
        show_banner(&console);
    }

    let diff = match GitCli.staged_diff().await {
        Ok(diff) => diff,
        Err(e @ DiffError::NoChanges) => {
            console.show_line(&format!("⚠️ {}", e), Tone::Failure);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("Error getting staged changes"),
    };

    let mut input = TerminalInput;
    let mut context = String::new();
    if !args.only_message {
        show_diff_box(&console, &diff);
        context = request_context(&mut input).await;
        console.show_panel("Reasoning");
    }

    let generator = Generator::new(&engine, &console)
        .quiet(args.only_message)
        .verbose(args.verbose)
        .timeout(config.generation_timeout());

    let chunks = split_diff(&diff);
    debug!("Split staged diff into {} chunk(s)", chunks.len());
    let micro_messages = generator.micro_messages(&chunks, &context).await;
    let result = generator.final_message(&micro_messages, &context).await;

    if args.only_message {
        match result {
            Ok(message) => println!("{}", message),
            Err(e) => bail!(e),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let editor = SystemEditor::from_env(&config.editor);
    let mut controller = InteractionController::new(
        &generator,
        &console,
        &mut input,
        &GitCli,
        &editor,
        micro_messages,
        Exclusions::none(),
    );
    controller.propose(result).await;
    let outcome = controller.run().await;
    debug!("Interaction finished: {:?}", outcome);

    Ok(ExitCode::SUCCESS)
}

fn show_banner(console: &Console) {
    console.show_line(
        "╔═════════════════════════════════════════════════════════════════╗",
        Tone::Heading,
    );
    console.show_line(
        "║                 Git Commit Message Generator                    ║",
        Tone::Heading,
    );
    console.show_line(
        "╚═════════════════════════════════════════════════════════════════╝",
        Tone::Heading,
    );
}

fn show_diff_box(console: &Console, diff: &str) {
    console.show_line("", Tone::Plain);
    console.show_line(
        "┌─────────────────────────────────────────────────────────────────┐",
        Tone::Heading,
    );
    console.show_line(
        "│ Diff                                                            │",
        Tone::Heading,
    );
    console.show_line(
        "└─────────────────────────────────────────────────────────────────┘",
        Tone::Heading,
    );
    console.show_diff(diff);
    console.show_line("", Tone::Plain);
}
