//! Splitting a staged diff into per-file chunks
//!
//! Each chunk starts at a `diff --git` header line. Concatenating the chunks
//! in order gives back the original diff byte for byte.

/// Prefix that marks the start of a new file section in a unified git diff
pub const FILE_BOUNDARY: &str = "diff --git";

/// Check whether a line opens a new file section
///
/// # Example
///
/// ```
/// use git_commit_message::diff::is_file_boundary;
///
/// assert!(is_file_boundary("diff --git a/src/lib.rs b/src/lib.rs\n"));
/// assert!(!is_file_boundary("+diff --git inside a hunk"));
/// ```
pub fn is_file_boundary(line: &str) -> bool {
    line.starts_with(FILE_BOUNDARY)
}

/// Split a unified diff into one chunk per file section
///
/// Lines keep their own line endings, so the chunks concatenate back to
/// `diff` exactly. A boundary line always belongs to the chunk it opens.
///
/// # Arguments
///
/// * `diff` - Raw output of `git diff --staged`
///
/// # Returns
///
/// * `Vec<String>` - Ordered, non-empty chunks. Empty when `diff` is empty;
///   a single chunk when `diff` has no boundary line at all.
///
/// # Example
///
/// ```
/// use git_commit_message::diff::split_diff;
///
/// let diff = "diff --git a/a b/a\n+one\ndiff --git a/b b/b\n+two\n";
/// let chunks = split_diff(diff);
/// assert_eq!(chunks, vec!["diff --git a/a b/a\n+one\n", "diff --git a/b b/b\n+two\n"]);
/// assert_eq!(chunks.concat(), diff);
/// ```
pub fn split_diff(diff: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in diff.split_inclusive('\n') {
        if is_file_boundary(line) && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
