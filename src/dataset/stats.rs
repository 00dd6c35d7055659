use std::fmt;

/// Statistics of a dataset handle, returned by [`close`](super::Dataset::close)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStats {
    /// Dataset label
    pub name: String,

    /// Acquisitions in the dataset
    pub acquisition_count: usize,

    /// Acquisitions appended through this handle
    pub acquisitions_appended: usize,

    /// Bytes of acquisition records appended through this handle
    pub bytes_appended: u64,

    /// Whether the dataset has a header document
    pub has_header_document: bool,

    /// Size of the store file in bytes
    pub store_size_bytes: u64,
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dataset '{}': {} acquisitions ({} appended, {} bytes), header document {}, store {} bytes",
            self.name,
            self.acquisition_count,
            self.acquisitions_appended,
            self.bytes_appended,
            if self.has_header_document { "present" } else { "missing" },
            self.store_size_bytes
        )
    }
}
