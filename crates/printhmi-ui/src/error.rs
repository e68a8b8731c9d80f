//! Error types for the UI crate.

use crate::page::PageKind;
use printhmi_core::StatusError;
use thiserror::Error;

/// Errors raised while handling a page hook
#[derive(Error, Debug)]
pub enum UiError {
    /// A transition targeted a page the catalog does not register
    #[error("Page {0} is not registered")]
    UnknownPage(PageKind),

    /// Text read from the display is not a valid number
    #[error("Invalid numeric input '{input}'")]
    InvalidInput {
        /// The raw text read from the display.
        input: String,
    },

    /// The configured UI catalog does not exist
    #[error("Unknown UI '{0}'")]
    UnknownUi(String),

    /// A status field needed for rendering is missing or ill-typed
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Display, host or other core error
    #[error(transparent)]
    Core(#[from] printhmi_core::Error),
}

/// Result type for UI operations
pub type UiResult<T> = std::result::Result<T, UiError>;
