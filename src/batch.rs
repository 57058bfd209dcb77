//! Splitting of the `--command` string into single command lines.

/// Characters separating commands in a batch string.
pub const SEPARATORS: [char; 2] = [';', '\n'];

/// How a batch run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every line ran, or a command asked the session to exit.
    Completed,
    /// A command failed while abort-on-error was set.
    Aborted,
}

/// Lazily yield the trimmed, non-empty command lines of `batch`.
///
/// The iterator is `Clone`, so the same batch can be walked again from the
/// start.
pub fn split_commands(batch: &str) -> impl Iterator<Item = &str> + Clone {
    batch
        .split(SEPARATORS)
        .map(str::trim)
        .filter(|line| !line.is_empty())
}
