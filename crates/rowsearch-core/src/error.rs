//! Error types for rowsearch.

/// Errors that can occur while mapping, indexing or searching rows.
///
/// Mapper-level errors bubble up unmodified to the row service boundary,
/// which hands them to the caller. Nothing in this workspace retries.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The index definition cannot be used with the table.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong with the configuration
        message: String,
    },

    /// A row value cannot be coerced to its field's declared type.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// What went wrong
        message: String,
    },

    /// A runtime value matches no branch handled by the mapper.
    #[error("Type mismatch: field \"{field}\" cannot map value \"{value}\"")]
    TypeMismatch {
        /// Field being mapped
        field: String,
        /// Rendered offending value
        value: String,
    },

    /// The storage collaborator failed.
    #[error("Storage error: {message}")]
    Storage {
        /// What went wrong
        message: String,
    },

    /// The search engine failed.
    #[error("Index error: {message}")]
    Index {
        /// What went wrong
        message: String,
    },

    /// Configuration decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type alias for rowsearch operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error only concerns the row being processed.
    ///
    /// Row-scoped errors fail the current row's indexing attempt and must
    /// not affect other rows of the same batch.
    pub fn is_row_scoped(&self) -> bool {
        match self {
            Error::Validation { .. } => true,
            Error::TypeMismatch { .. } => true,
            Error::Configuration { .. } => false,
            Error::Storage { .. } => false,
            Error::Index { .. } => false,
            Error::Serialization(_) => false,
        }
    }

    /// Creates a new configuration error.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new validation error for a field.
    pub fn validation<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new type mismatch error for a field and a rendered value.
    pub fn type_mismatch<F, V>(field: F, value: V) -> Self
    where
        F: Into<String>,
        V: ToString,
    {
        Error::TypeMismatch {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Creates a new storage error.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

    /// Creates a new search engine error.
    pub fn index<S: Into<String>>(message: S) -> Self {
        Error::Index {
            message: message.into(),
        }
    }

    /// Name of the field this error is about, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } | Error::TypeMismatch { field, .. } => Some(field),
            _ => None,
        }
    }
}
