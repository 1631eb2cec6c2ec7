//! Prompt construction for commit message generation
//!
//! Builds the input for both engine profiles: one per diff chunk, and the
//! aggregated input that merges every micro-message into the final message.

/// Label introducing the user's context after a chunk
pub const CONTEXT_LABEL: &str = "User Extra Context Input: ";

/// Line closing each micro-message in the aggregated input
pub const MICRO_MESSAGE_DELIMITER: &str = "----";

/// Build the engine input for one diff chunk
///
/// The structure is:
/// ```text
/// {chunk}
///
/// User Extra Context Input: {context}
/// ```
/// The context part is left out entirely when `context` is empty.
///
/// # Example
///
/// ```
/// use git_commit_message::prompt::chunk_input;
///
/// assert_eq!(chunk_input("+line\n", ""), "+line\n");
/// assert_eq!(
///     chunk_input("+line\n", "hotfix"),
///     "+line\n\n\nUser Extra Context Input: hotfix"
/// );
/// ```
pub fn chunk_input(chunk: &str, context: &str) -> String {
    if context.is_empty() {
        chunk.to_string()
    } else {
        format!("{}\n\n{}{}", chunk, CONTEXT_LABEL, context)
    }
}

/// Append one micro-message to the running aggregate
///
/// Every message becomes its own block, closed by the delimiter line, even
/// when the message is empty, so block order always matches chunk order.
///
/// # Example
///
/// ```
/// use git_commit_message::prompt::push_micro_message;
///
/// let mut aggregate = String::new();
/// push_micro_message(&mut aggregate, "feat: a");
/// push_micro_message(&mut aggregate, "");
/// assert_eq!(aggregate, "\nfeat: a\n----\n\n\n----\n");
/// ```
pub fn push_micro_message(aggregate: &mut String, message: &str) {
    aggregate.push('\n');
    aggregate.push_str(message);
    aggregate.push('\n');
    aggregate.push_str(MICRO_MESSAGE_DELIMITER);
    aggregate.push('\n');
}

/// Build the aggregated input for the merge profile
///
/// The structure is:
/// ```text
///
/// ### Commits:
/// {micro_messages}
///
/// ### Extra user input context:
/// {context}
/// ```
pub fn final_input(micro_messages: &str, context: &str) -> String {
    format!(
        "\n### Commits:\n{}\n\n### Extra user input context:\n{}\n",
        micro_messages, context
    )
}
