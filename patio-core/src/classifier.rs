//! Error classification.
//!
//! Pure mapping from a transport failure to the closed `StoreError` taxonomy,
//! plus the one side effect the design allows: flipping the shared
//! connectivity flag when the failure means the service is out of reach.
//! The classifier never panics and never lets a raw transport error escape.

use crate::connectivity::ConnectivityHandle;
use crate::errors::StoreError;
use crate::transport::TransportFailure;
use std::collections::HashMap;
use tracing::warn;

/// Caller-supplied replacements for the default message of any status code.
#[derive(Debug, Clone, Default)]
pub struct MessageOverrides {
    by_status: HashMap<u16, String>,
}

impl MessageOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, status: u16, message: &str) -> Self {
        self.by_status.insert(status, message.to_string());
        self
    }

    fn lookup(&self, status: u16) -> Option<&str> {
        self.by_status.get(&status).map(String::as_str)
    }
}

/// Status table from the design: 400 validation, 404 not-found, 409 conflict,
/// 500 server error, 502/503/504 service unavailable, anything else
/// unexpected. No response at all is network-unreachable.
pub fn classify(failure: TransportFailure, overrides: &MessageOverrides) -> StoreError {
    match failure {
        TransportFailure::NoResponse(reason) => StoreError::NetworkUnavailable(reason),
        TransportFailure::Status { code, message } => {
            let resolved = |fallback: &str| {
                overrides
                    .lookup(code)
                    .map(str::to_string)
                    .or(message.clone())
                    .unwrap_or_else(|| fallback.to_string())
            };
            match code {
                400 => StoreError::Validation(resolved("invalid request")),
                404 => StoreError::NotFound(resolved("record not found")),
                409 => StoreError::Conflict(resolved("record conflicts with an existing one")),
                500 => StoreError::ServerError(resolved("internal server error")),
                502 | 503 | 504 => StoreError::ServiceUnavailable {
                    status: code,
                    message: resolved(&format!("service unavailable (HTTP {code})")),
                },
                _ => StoreError::Unexpected {
                    status: code,
                    message: resolved("unhandled response"),
                },
            }
        }
    }
}

/// Classify and apply the offline side effect for subsequent calls. The
/// in-flight call is never retried; it fails with the returned error.
pub fn classify_and_route(
    failure: TransportFailure,
    overrides: &MessageOverrides,
    connectivity: &ConnectivityHandle,
) -> StoreError {
    let error = classify(failure, overrides);
    if error.flips_offline() {
        warn!(error = %error, "remote unreachable, entering offline mode");
        connectivity.set_offline();
    }
    error
}
