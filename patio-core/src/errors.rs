//! Closed error taxonomy for the yard core.
//!
//! Every failure a caller can observe is one of these variants; raw
//! transport errors never cross the store boundary (see `classifier`).

use serde::{Deserialize, Serialize};

/// Programmatic tag for a [`StoreError`], used by screens to pick a
/// localized message or a banner-level treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NetworkUnavailable,
    ServiceUnavailable,
    Validation,
    NotFound,
    Conflict,
    ServerError,
    Unexpected,
    NotAuthenticated,
    OccupiedCell,
    Storage,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("network unreachable: {0}")]
    NetworkUnavailable(String),

    #[error("{message}")]
    ServiceUnavailable { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServerError(String),

    #[error("unexpected response (HTTP {status}): {message}")]
    Unexpected { status: u16, message: String },

    #[error("no authenticated session")]
    NotAuthenticated,

    #[error("cell ({x},{y}) is already occupied")]
    OccupiedCell { x: i32, y: i32 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Locally-raised not-found with the default message.
    pub fn not_found() -> Self {
        StoreError::NotFound("record not found".into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NetworkUnavailable(_) => ErrorKind::NetworkUnavailable,
            StoreError::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::ServerError(_) => ErrorKind::ServerError,
            StoreError::Unexpected { .. } => ErrorKind::Unexpected,
            StoreError::NotAuthenticated => ErrorKind::NotAuthenticated,
            StoreError::OccupiedCell { .. } => ErrorKind::OccupiedCell,
            StoreError::Serialization(_) | StoreError::Io(_) => ErrorKind::Storage,
        }
    }

    /// Only network-unreachable and 502/503/504 push the whole process
    /// into offline mode; every other kind stays call-scoped.
    pub fn flips_offline(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NetworkUnavailable | ErrorKind::ServiceUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            StoreError::NetworkUnavailable("dns".into()).kind(),
            ErrorKind::NetworkUnavailable
        );
        assert_eq!(StoreError::not_found().kind(), ErrorKind::NotFound);
        assert_eq!(
            StoreError::OccupiedCell { x: 1, y: 1 }.kind(),
            ErrorKind::OccupiedCell
        );
    }

    #[test]
    fn test_only_two_kinds_flip_offline() {
        assert!(StoreError::NetworkUnavailable("refused".into()).flips_offline());
        assert!(StoreError::ServiceUnavailable {
            status: 503,
            message: "service unavailable (HTTP 503)".into()
        }
        .flips_offline());
        assert!(!StoreError::ServerError("internal server error".into()).flips_offline());
        assert!(!StoreError::Conflict("dup".into()).flips_offline());
        assert!(!StoreError::NotAuthenticated.flips_offline());
    }
}
