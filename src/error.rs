//! Error taxonomy shared by every adapter, the wire codec and the format controller.
//!
//! All errors are raised synchronously to the immediate caller; nothing in this crate
//! retries or recovers. Read-style queries with a natural "nothing found" answer
//! (`get`, `at`, `get_property`, index lookups) return `None` instead of failing.

use thiserror::Error;

/// Result alias used across the adapter layer.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Coarse classification of an [`AdapterError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong shape or type passed to a constructor or mutator.
    InvalidArgument,
    /// A schema index, field name or path that must exist does not.
    Reference,
    /// A positional operation was given an out-of-bounds position.
    Range,
    /// The operation has no meaning for this adapter.
    Unsupported,
    /// Raw data could not be (de)serialized.
    Serialization,
}

/// Primary error type for adapter operations.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Wrong shape or type of argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Something that must exist does not.
    #[error("reference error: {0}")]
    Reference(String),

    /// Position outside the valid range.
    #[error("position {position} is out of range (len {len})")]
    Range { position: usize, len: usize },

    /// Operation not supported by this adapter.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdapterError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn range(position: usize, len: usize) -> Self {
        Self::Range { position, len }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Reference(_) => ErrorKind::Reference,
            Self::Range { .. } => ErrorKind::Range,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

/// Fail with a range error unless `position < len`.
pub(crate) fn check_position(position: usize, len: usize) -> Result<()> {
    if position < len {
        Ok(())
    } else {
        Err(AdapterError::range(position, len))
    }
}

/// Fail with a range error unless `position <= len` (insertion point).
pub(crate) fn check_insert_position(position: usize, len: usize) -> Result<()> {
    if position <= len {
        Ok(())
    } else {
        Err(AdapterError::range(position, len))
    }
}
