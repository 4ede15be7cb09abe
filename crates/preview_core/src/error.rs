//! Error types of the preview pipeline.
//!
//! None of these are fatal: every failure degrades to "preview not updated
//! this cycle" and the previously displayed sections stay in place.

use std::fmt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stage of the parser adapter that produced a [`ParseFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// Lexical analysis of the raw content.
    Lex,
    /// Transformation of the lexed structure into section fragments.
    Page,
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex => f.write_str("lex"),
            Self::Page => f.write_str("page"),
        }
    }
}

/// A render aborted in one of the two parser stages.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {cause}")]
pub struct ParseFailure {
    pub stage: ParseStage,
    #[source]
    pub cause: BoxError,
}

impl ParseFailure {
    pub fn lex(cause: impl Into<BoxError>) -> Self {
        Self {
            stage: ParseStage::Lex,
            cause: cause.into(),
        }
    }

    pub fn page(cause: impl Into<BoxError>) -> Self {
        Self {
            stage: ParseStage::Page,
            cause: cause.into(),
        }
    }
}

/// Malformed input detected while lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    /// A fenced code block opened on `line` (1-indexed) is never closed.
    #[error("unterminated fenced code block starting at line {line}")]
    UnterminatedFence { line: usize },
}

/// Unresolvable content detected while building sections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// A relative link or image climbs above the repository root.
    #[error("`{target}` points outside of the repository root")]
    EscapesRoot { target: String },
}

/// Failure of one render attempt.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// The document content could not be read.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseFailure),
}
