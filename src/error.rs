//! Error taxonomy for catalog access and assessment runs.
//!
//! Catalog errors split three ways: transient failures are retried with
//! backoff, item-level failures degrade a single database or table, and
//! everything else aborts discovery.

use thiserror::Error;

/// An error returned by the remote catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The caller lacks permission for a database or table.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The catalog API signaled rate limiting or throttling.
    #[error("throttled by catalog API: {0}")]
    Throttled(String),

    /// Connectivity failure (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be parsed into the expected shape.
    #[error("malformed catalog response: {0}")]
    Malformed(String),

    /// Any other API-level error.
    #[error("catalog API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl CatalogError {
    /// Whether retrying with backoff may help.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CatalogError::Throttled(_) | CatalogError::Network(_)
        )
    }

    /// Whether the failure is scoped to one item rather than the run.
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            CatalogError::AccessDenied(_) | CatalogError::Malformed(_)
        )
    }
}

/// A run-level failure of the assessment engine.
///
/// Only fatal conditions surface here; item-level and transient failures
/// are absorbed into the report as notes and status per the fail-soft
/// policy.
#[derive(Debug, Error)]
pub enum AssessError {
    /// Discovery failed before a single database was enumerated, so no
    /// meaningful partial report exists.
    #[error("catalog enumeration failed before any results were gathered: {cause}")]
    NothingEnumerated { cause: String },

    /// Discovery aborted mid-run and fail-soft delivery was disabled.
    #[error("discovery aborted: {cause}")]
    Aborted { cause: String },
}
