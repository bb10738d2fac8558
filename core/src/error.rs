//! Error taxonomy for the venue core.
//!
//! # Design
//! Transport failures (`NetworkFailure`) are kept apart from responses the
//! remote store answered with a non-success status (`RemoteRejection`), so the
//! loader can report them identically while logs still tell them apart.
//! `Unauthorized` and `Conflict` never reach the network: they are raised
//! locally by the synchronizer before a request is built.

use thiserror::Error;

use crate::types::VenueId;

/// Errors produced by the client, the loader and the synchronizer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not complete (connection refused, timeout, ...).
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    RemoteRejection { status: u16, body: String },

    /// A save/unsave was attempted without a signed-in user.
    #[error("sign-in required")]
    Unauthorized,

    /// A toggle for this venue is already in flight, or the saved set is
    /// still loading and membership is unknown.
    #[error("toggle already in progress for venue {0}")]
    Conflict(VenueId),

    /// The response body was missing expected fields or was not JSON.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A configuration value could not be parsed.
    #[error("invalid configuration for {key}: {message}")]
    Config { key: &'static str, message: String },
}

impl ApiError {
    /// True for failures the user can only resolve by signing in.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
