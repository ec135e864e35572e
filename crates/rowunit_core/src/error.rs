//! Error types for the unit-of-work engine.

use rowunit_store::StorageError;
use thiserror::Error;

/// Result type for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the unit-of-work engine.
///
/// Storage and mapping errors are batch-fatal: the first one encountered
/// while replaying a batch rolls back every connection the batch touched.
/// Usage errors are raised at attach time where feasible, before any
/// connection is involved.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The underlying store failed during begin, commit, rollback, or a
    /// dispatched statement.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// No mapper is registered under the given name.
    #[error("no such mapper: {name}")]
    NoSuchMapper {
        /// The unknown mapper name.
        name: String,
    },

    /// An entity is missing a field named in the column-field map.
    #[error("entity has no field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// The entity's identity field is unset where an identity is required.
    #[error("identity field is unset: {field}")]
    MissingIdentity {
        /// The identity field name.
        field: String,
    },

    /// A handle does not refer to a registered entity.
    #[error("no entity registered for {key}")]
    UnknownEntity {
        /// The stale handle, formatted.
        key: String,
    },

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a no-such-mapper error.
    pub fn no_such_mapper(name: impl Into<String>) -> Self {
        Self::NoSuchMapper { name: name.into() }
    }

    /// Creates a missing-field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates a missing-identity error.
    pub fn missing_identity(field: impl Into<String>) -> Self {
        Self::MissingIdentity {
            field: field.into(),
        }
    }

    /// Creates an unknown-entity error.
    pub fn unknown_entity(key: impl ToString) -> Self {
        Self::UnknownEntity {
            key: key.to_string(),
        }
    }

    /// Creates an invalid-operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
