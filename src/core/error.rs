use thiserror::Error;

/// Rejection of malformed input before any computation runs.
///
/// Every variant names the offending field path (for example
/// `transactions[2].date`) so the caller can point the user at the record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field}: list must not be empty")]
    Empty { field: String },

    #[error("{field}: invalid date {value:?} ({reason})")]
    InvalidDate {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{field}: value must be a finite number, got {value}")]
    NonFinite { field: String, value: f64 },

    #[error("{field}: value must not be negative, got {value}")]
    Negative { field: String, value: f64 },

    #[error("{field}: either an isin or a ticker is required")]
    MissingIdentifier { field: String },
}

impl InputError {
    /// Path of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            InputError::Empty { field }
            | InputError::InvalidDate { field, .. }
            | InputError::NonFinite { field, .. }
            | InputError::Negative { field, .. }
            | InputError::MissingIdentifier { field } => field,
        }
    }
}
