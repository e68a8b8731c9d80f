//! Error handling for printhmi
//!
//! Provides error types for every layer of the controller:
//! - Connection errors (transport faults talking to the printer host)
//! - Host errors (RPC calls rejected or unanswered by the printer host)
//! - Display errors (serial touch display faults and rejected instructions)
//! - Status errors (missing or ill-typed fields in a status snapshot)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents faults of the persistent host connection itself. A connection
/// fault collapses the UI to the host-error screen.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// Transport is not connected
    #[error("Not connected to {endpoint}")]
    NotConnected {
        /// The endpoint that is not connected.
        endpoint: String,
    },

    /// Connection attempt timed out
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Connection lost
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// The reason the connection was lost.
        reason: String,
    },

    /// Invalid hostname or URL
    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// The endpoint that could not be used.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// WebSocket error
    #[error("WebSocket error: {reason}")]
    WebSocketError {
        /// The reason for the WebSocket error.
        reason: String,
    },

    /// Serial port error
    #[error("Serial port error: {reason}")]
    SerialError {
        /// The reason for the serial port error.
        reason: String,
    },
}

/// Host error type
///
/// Represents failures of individual calls made against the printer host.
#[derive(Error, Debug, Clone)]
pub enum HostError {
    /// The host answered with a JSON-RPC error object
    #[error("RPC error {code} from {method}: {message}")]
    Rpc {
        /// The method that failed.
        method: String,
        /// The JSON-RPC error code.
        code: i64,
        /// The error message reported by the host.
        message: String,
    },

    /// No answer within the call timeout
    #[error("Call {method} timed out after {timeout_ms}ms")]
    Timeout {
        /// The method that timed out.
        method: String,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The host answered with something unusable
    #[error("Invalid response to {method}: {reason}")]
    InvalidResponse {
        /// The method whose response was invalid.
        method: String,
        /// Why the response was rejected.
        reason: String,
    },

    /// File has no thumbnails
    #[error("No thumbnail available for {filename}")]
    NoThumbnail {
        /// The file that has no thumbnail.
        filename: String,
    },

    /// Thumbnail download or decoding failed
    #[error("Thumbnail fetch failed: {reason}")]
    ThumbnailFetch {
        /// The reason the fetch failed.
        reason: String,
    },
}

/// Display error type
///
/// Represents failures talking to the serial touch display.
#[derive(Error, Debug, Clone)]
pub enum DisplayError {
    /// The display rejected an instruction with a return code
    #[error("Display rejected '{instruction}' with code 0x{code:02x}")]
    Rejected {
        /// The instruction that was rejected.
        instruction: String,
        /// The return code sent by the display.
        code: u8,
    },

    /// No response within the timeout
    #[error("Display did not answer '{instruction}' within {timeout_ms}ms")]
    Timeout {
        /// The instruction that timed out.
        instruction: String,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The display answered with the wrong kind of frame
    #[error("Unexpected display response to '{instruction}': {frame}")]
    UnexpectedResponse {
        /// The instruction that was sent.
        instruction: String,
        /// A description of the received frame.
        frame: String,
    },

    /// The display link is not open
    #[error("Display not connected")]
    NotConnected,
}

/// Status error type
///
/// Raised while reading a status snapshot. Aborts one render pass only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatusError {
    /// A field is absent from the snapshot
    #[error("Missing status field {path}")]
    MissingField {
        /// Dotted path of the missing field.
        path: String,
    },

    /// A field holds a value of the wrong type
    #[error("Status field {path} is not {expected}")]
    InvalidField {
        /// Dotted path of the field.
        path: String,
        /// The expected type.
        expected: &'static str,
    },
}

/// Main error type for printhmi
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Host error
    #[error(transparent)]
    Host(#[from] HostError),

    /// Display error
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// Status error
    #[error(transparent)]
    Status(#[from] StatusError),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError::ConnectionTimeout { .. })
                | Error::Host(HostError::Timeout { .. })
                | Error::Display(DisplayError::Timeout { .. })
        )
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a missing or ill-typed status field
    pub fn is_status_error(&self) -> bool {
        matches!(self, Error::Status(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
