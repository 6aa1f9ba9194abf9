//! Errors raised while turning a token stream into a document tree.

use thiserror::Error;

/// The token stream broke its nesting contract.
///
/// Any of these aborts the whole [`crate::builder::build`] call: a tree built from a malformed
/// stream has no defined shape, so no partial document is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// An inline `*_close` arrived while no inline style was open.
    #[error("inline token `{kind}` closes a style that was never opened")]
    UnbalancedInlineClose { kind: String },

    /// A block `*_close` arrived while no block was open.
    #[error("block token `{kind}` closes a block but none is open")]
    UnbalancedBlockClose { kind: String },

    /// A block `*_close` does not match the innermost open block.
    #[error("block token `{found}` cannot close the open `{expected}` block")]
    MismatchedBlockClose {
        expected: &'static str,
        found: String,
    },

    /// An `inline` token arrived with no block open to receive it.
    #[error("inline content appeared outside of any block")]
    InlineOutsideBlock,

    /// The stream ended with blocks still open.
    #[error("`{kind}` block was never closed")]
    UnclosedBlock { kind: &'static str },
}

pub type BuildResult<T> = Result<T, BuildError>;
