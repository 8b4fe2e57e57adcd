use thiserror::Error;

/// Why a single enrollment line (or a manually entered record) was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("expected 4 comma-separated fields, found {0}")]
    FieldCount(usize),

    #[error("field {index} ({name}) is empty")]
    EmptyField { index: usize, name: &'static str },

    #[error("student id '{0}' must be between 6 and 12 characters")]
    StudentIdLength(String),

    #[error("{field} '{value}' must be at least 2 characters")]
    TooShort { field: &'static str, value: String },
}
