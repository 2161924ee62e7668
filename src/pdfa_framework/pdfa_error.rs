use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

/// The machine-distinguishable kind of a [PdfaError].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    Format,
    Reference,
    Determinism,
    Normalization,
    Range,
}

/// Where a dangling state identifier was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateReference {
    StartState,
    EdgeSource,
    EdgeTarget { source: String },
}

impl fmt::Display for StateReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateReference::StartState => write!(f, "`start_state`"),
            StateReference::EdgeSource => write!(f, "`edges` as a source state"),
            StateReference::EdgeTarget { source } => {
                write!(f, "an edge leaving state `{}`", source)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PdfaError {
    /// The document cannot be read into the expected shape.
    #[error("could not read `{field}`: {message}")]
    Format { field: String, message: String },

    #[error("state `{state}` is referenced by {referenced_by}, but it is not declared in `nodes`")]
    Reference {
        state: String,
        referenced_by: StateReference,
    },

    #[error(
        "state `{state}` has two outgoing transitions on symbol `{symbol}` (to `{first_target}` and to `{second_target}`), which violates determinism"
    )]
    Determinism {
        state: String,
        symbol: String,
        first_target: String,
        second_target: String,
    },

    #[error("the {field} of state `{state}` sum to {total}, which is not 1 (tolerance {tolerance})")]
    Normalization {
        state: String,
        field: String,
        total: f64,
        tolerance: f64,
    },

    #[error("`{field}`{}: expected {expected}, found {actual}", in_state(.state))]
    Range {
        field: String,
        state: Option<String>,
        expected: String,
        actual: String,
    },
}

fn in_state(state: &Option<String>) -> String {
    match state {
        Some(state) => format!(" of state `{}`", state),
        None => String::new(),
    }
}

/// A problem found by the collecting validator. It carries the same context as the error that
/// loading the document would fail with.
pub type ValidationIssue = PdfaError;

impl PdfaError {
    pub fn format(field: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Format {
            field: field.into(),
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PdfaError::Format { .. } => ErrorKind::Format,
            PdfaError::Reference { .. } => ErrorKind::Reference,
            PdfaError::Determinism { .. } => ErrorKind::Determinism,
            PdfaError::Normalization { .. } => ErrorKind::Normalization,
            PdfaError::Range { .. } => ErrorKind::Range,
        }
    }

    /// The state the error is about, if it concerns a single state.
    pub fn state(&self) -> Option<&str> {
        match self {
            PdfaError::Format { .. } => None,
            PdfaError::Reference { state, .. }
            | PdfaError::Determinism { state, .. }
            | PdfaError::Normalization { state, .. } => Some(state),
            PdfaError::Range { state, .. } => state.as_deref(),
        }
    }

    /**
     * Prefixes the field path of a format error, such that errors from nested readers point to
     * the full location in the document. Other kinds are returned unchanged.
     */
    pub fn within(self, prefix: &str) -> Self {
        match self {
            PdfaError::Format { field, message } => PdfaError::Format {
                field: format!("{}.{}", prefix, field),
                message,
            },
            other => other,
        }
    }
}
