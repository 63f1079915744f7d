use thiserror::Error;

/// Diagnostics raised while interpreting a byte stream.
///
/// None of these are fatal: the dispatcher always resumes at the next
/// byte. They exist so a caller that wants visibility into malformed
/// input can collect them via `Terminal::take_diagnostics`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TermError {
    #[error("unknown escape sequence: {0}")]
    UnknownEscapeSequence(String),

    #[error("incomplete escape sequence aborted by a second ESC")]
    IncompleteEscapeSequence,

    #[error("unsupported sequence: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, TermError>;
