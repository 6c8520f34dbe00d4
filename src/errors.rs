use thiserror::Error;

/// Failures raised while turning sheet text into workouts.
///
/// None of these abort a plan build. `UnknownZone` and `UnrecognizedFormat`
/// drop the offending cell, `DateFormat` drops the whole week, and
/// `AmbiguousSplit` only disables compound-cell splitting for that cell.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown zone: {0} (expected Z1-Z6)")]
    UnknownZone(String),

    #[error("No date range found in week header: {0:?}")]
    DateFormat(String),

    #[error("Unrecognized workout format: {0:?}")]
    UnrecognizedFormat(String),

    #[error("Ambiguous compound cell ({clauses} clauses): {text:?}")]
    AmbiguousSplit { text: String, clauses: usize },
}

impl ParseError {
    /// Soft errors degrade gracefully; the rest drop a cell or a week.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            ParseError::UnrecognizedFormat(_) | ParseError::AmbiguousSplit { .. }
        )
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
