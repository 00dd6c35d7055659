/// Errors raised while encoding, decoding or validating a header document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// One or more schema rules are violated
    #[error("Schema violation: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    /// Text is not valid JSON or lacks a required section
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
