use crate::acquisition::AcquisitionError;
use crate::document::DocumentError;
use crate::store::StoreError;

/// Errors that can occur during dataset operations
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Header version unsupported or a size field out of range
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Payload shape disagrees with the header
    #[error("Data mismatch: {0}")]
    DataMismatch(String),

    /// Store file or dataset label already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Store file or dataset label does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store structure or a stored record is damaged
    #[error("Corrupt store: {0}")]
    Corrupt(String),

    /// Read index beyond the last acquisition
    #[error("Index {index} out of range for dataset with {count} acquisitions")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Acquisitions in the dataset
        count: usize,
    },

    /// The header document has already been written
    #[error("Header document already written")]
    AlreadyWritten,

    /// The header document violates the schema
    #[error("Schema violation: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    /// No header document has been written
    #[error("Header document not present")]
    NotPresent,

    /// Underlying storage error
    #[error("I/O error: {0}")]
    IoFailure(#[from] std::io::Error),

    /// Operation attempted after close
    #[error("Dataset is closed")]
    Closed,

    /// Mutation attempted through a read-only handle
    #[error("Dataset is opened read-only")]
    ReadOnly,

    /// Dataset label is empty, too long or contains control characters
    #[error("Invalid dataset name: {0}")]
    InvalidName(String),
}

impl From<AcquisitionError> for DatasetError {
    fn from(err: AcquisitionError) -> Self {
        match err {
            AcquisitionError::MalformedHeader(msg) => DatasetError::MalformedHeader(msg),
            AcquisitionError::DataMismatch { .. } => DatasetError::DataMismatch(err.to_string()),
            AcquisitionError::Truncated { .. } | AcquisitionError::TrailingBytes { .. } => {
                DatasetError::Corrupt(err.to_string())
            }
            AcquisitionError::IoError(e) => DatasetError::IoFailure(e),
        }
    }
}

impl From<DocumentError> for DatasetError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::SchemaViolation(violations) => DatasetError::SchemaViolation(violations),
            DocumentError::Json(e) => DatasetError::SchemaViolation(vec![e.to_string()]),
        }
    }
}

impl From<StoreError> for DatasetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => DatasetError::NotFound(path.display().to_string()),
            StoreError::AlreadyExists(path) => {
                DatasetError::AlreadyExists(path.display().to_string())
            }
            StoreError::Corrupt { .. } => DatasetError::Corrupt(err.to_string()),
            StoreError::IoError(e) => DatasetError::IoFailure(e),
        }
    }
}
