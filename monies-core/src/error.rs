//! Error taxonomy shared by every statement parser.
//!
//! Every variant is terminal for the file being parsed: parsers never return
//! a partial transaction list alongside an error.

use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// Structural expectation violated (missing separator, wrong row width,
    /// missing statement header).
    #[error("unknown format: {0}")]
    Format(String),

    /// A single field failed to convert.
    #[error("bad {field} format {value:?}: {reason}")]
    FieldParse {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Sum of parsed amounts disagrees with the total printed on the statement.
    #[error("transaction amounts ({sum}) != payments total ({total})")]
    Reconciliation { sum: Decimal, total: Decimal },

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract text from PDF {}: {reason}", path.display())]
    Pdf { path: PathBuf, reason: String },

    #[error("file type extension {0:?} is not supported")]
    UnsupportedFormat(String),

    #[error("invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Coarse classification of [`ParseError`] for callers that only need to
/// decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    FieldParse,
    Reconciliation,
    Io,
    Unsupported,
}

impl ParseError {
    pub fn field(field: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        ParseError::FieldParse {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            // A pattern that fails to compile is a broken layout definition.
            ParseError::Format(_) | ParseError::Pattern(_) => ErrorKind::Format,
            ParseError::FieldParse { .. } => ErrorKind::FieldParse,
            ParseError::Reconciliation { .. } => ErrorKind::Reconciliation,
            ParseError::Io { .. } | ParseError::Pdf { .. } => ErrorKind::Io,
            ParseError::UnsupportedFormat(_) => ErrorKind::Unsupported,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
