use thiserror::Error;

/// Reasons a reconciliation pass does not produce an updated record.
///
/// None of these is fatal to the editing session: the caller keeps the record
/// it passed in and surfaces the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("tax identifier must have 10 or 12 digits, got {digits}")]
    InvalidIdentifier { digits: usize },

    #[error("registry has no record for {tax_id}")]
    NotFound { tax_id: String },

    #[error("registry lookup failed: {0}")]
    LookupTransportFailure(String),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
