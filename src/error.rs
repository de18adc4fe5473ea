//! Error types for directive rewriting.

use thiserror::Error;

/// A structural problem found while scanning directives.
///
/// Whether an irregularity aborts the rewrite, prints a warning, or is
/// ignored is decided by one policy for the whole parse — see
/// [`crate::rewrite::Options`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Irregularity {
    /// A parameter closed without its type directive while `--typecheck`
    /// is in effect.
    #[error("line {line}: parameter `{name}` has no type declaration")]
    MissingType { name: String, line: usize },

    /// A type directive appeared with no parameter open.
    #[error("line {line}: type declaration without a preceding parameter")]
    TypeWithoutParameter { line: usize },

    /// A type directive names a different parameter than the open one.
    #[error("line {line}: type targets `{target}` but the open parameter is `{param}`")]
    NameMismatch {
        param: String,
        target: String,
        line: usize,
    },

    /// A second return directive opened while one was still accumulating.
    #[error("line {line}: `return` directive while an earlier one is still open")]
    DuplicateReturn { line: usize },
}

/// Any failure a rewrite can produce.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Irregular(#[from] Irregularity),

    /// Construction-time configuration failure: bad directive lead character.
    #[error("directive lead character must be ':' or '@', got {0:?}")]
    InvalidLead(char),

    /// Construction-time configuration failure: bad output mode name.
    #[error("unknown output mode: {0}. Use span or linebreak")]
    InvalidMode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
