//! Error types for the rooms client.
//!
//! # Design
//! Argument errors (`InvalidEndpoint`, `MissingCredential`, ...) are raised
//! before any request leaves the process. Everything the server or the
//! network reports is surfaced unchanged through `Http` or `Transport`; this
//! layer never retries or recovers.

use thiserror::Error;

/// Errors returned by `RoomsClient`, `RoomsCodec` and `Transport`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint was empty or contained whitespace.
    #[error("invalid endpoint: {0:?}")]
    InvalidEndpoint(String),

    /// No credential, or an empty one, was supplied.
    #[error("invalid credential: no access key or token supplied")]
    MissingCredential,

    /// The access key is not valid base64.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The connection string lacks `endpoint` or `accesskey`.
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// An operation that addresses a room was called with an empty id.
    #[error("room id must not be empty")]
    MissingRoomId,

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response (DNS, connect, TLS, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of a server-side failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
