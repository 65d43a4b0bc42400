//! Error types for condition parsing

/// Errors produced while parsing a presence condition from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    /// Input was empty or whitespace only
    #[error("empty condition")]
    Empty,

    /// Unexpected character in the input
    #[error("unexpected character `{found}` at offset {offset} in condition `{input}`")]
    UnexpectedChar {
        input: String,
        offset: usize,
        found: char,
    },

    /// Input ended inside an unfinished expression
    #[error("condition `{input}` ended unexpectedly")]
    UnexpectedEnd { input: String },

    /// A complete expression was followed by more input
    #[error("trailing input at offset {offset} in condition `{input}`")]
    TrailingInput { input: String, offset: usize },

    /// An opening parenthesis was never closed
    #[error("unclosed parenthesis in condition `{input}`")]
    UnclosedParenthesis { input: String },
}
