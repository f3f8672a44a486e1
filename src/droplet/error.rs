//! Error types for droplet reconciliation.

use thiserror::Error;

use crate::client::ClientError;

use super::DropletId;

/// Fatal reasons a reconciliation stops.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ReconcileError {
    /// Raised when the request cannot be acted on as given.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Raised when a supplied droplet id does not resolve.
    #[error("droplet {id} not found")]
    NotFound {
        /// Identifier that was looked up.
        id: DropletId,
    },
    /// Raised when the provider answers with an error-shaped response.
    #[error("provider error (HTTP {status}): {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Message returned by the provider.
        message: String,
    },
    /// Raised when the droplet does not become active in time.
    #[error("timeout waiting for droplet {droplet_id} to power on after {timeout_secs} seconds")]
    Timeout {
        /// Droplet being waited on.
        droplet_id: DropletId,
        /// Configured wait bound.
        timeout_secs: u64,
    },
    /// Raised when a success response lacks the expected structure.
    #[error("unexpected response while {context}")]
    Decode {
        /// What the engine was doing.
        context: String,
    },
    /// Wrapper for transport failures.
    #[error(transparent)]
    Transport(#[from] ClientError),
}
