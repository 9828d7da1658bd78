//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The named catalog file does not exist.
    #[error("Catalog not found: {0}")]
    CatalogNotFound(String),

    /// No record with this sequence number exists in the catalog.
    #[error("Record {seq} not found in {catalog}")]
    RecordNotFound {
        /// Catalog name.
        catalog: String,
        /// Requested sequence number.
        seq: u32,
    },

    /// Catalog name is not a plain `.json` file name.
    #[error("Invalid catalog name: {0}")]
    InvalidName(String),

    /// A record failed validation.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A password is already configured.
    #[error("Password is already set")]
    PasswordAlreadySet,

    /// No valid password is configured.
    #[error("Password is not set")]
    PasswordNotSet,

    /// Password does not match, or is too short to be set.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),
}

impl StoreError {
    /// Returns true if the error stems from disk access or corrupt files,
    /// as opposed to a bad request.
    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Io(_) | StoreError::Serialization(_))
    }

    /// Returns true if the error means the addressed item does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::CatalogNotFound(_) | StoreError::RecordNotFound { .. }
        )
    }
}

impl From<fnicon_core::CoreError> for StoreError {
    fn from(err: fnicon_core::CoreError) -> Self {
        match err {
            fnicon_core::CoreError::Serialization(e) => StoreError::Serialization(e),
            other => StoreError::InvalidRecord(other.to_string()),
        }
    }
}
