//! Data models for printhmi
//!
//! Provides:
//! - Domain connection state of the printer host and firmware
//! - The canonical status store and its read-only snapshots
//! - The G-code file list
//! - Display property values and display events

pub mod display;
pub mod files;
pub mod status;

pub use display::{DisplayEvent, DisplayEventKind, DisplayValue};
pub use files::FileList;
pub use status::{
    merge_patch, SharedStatus, StatusMap, StatusSnapshot, StatusStore, SubscriptionSet,
};

use serde::{Deserialize, Serialize};

/// Connection state of the printer as seen by the UI
///
/// Derived from the transport lifecycle and the firmware status reported by
/// the host. Only the connection supervisor changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterConnectionState {
    /// Connecting, or connected but the firmware is not ready yet
    #[default]
    NotReady,
    /// Host connected and firmware ready
    Ready,
    /// Connection deliberately closed
    Stopped,
    /// The host could not be reached
    HostError,
    /// The host reports the firmware shut down or disconnected
    FirmwareError,
}

impl std::fmt::Display for PrinterConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "not ready"),
            Self::Ready => write!(f, "ready"),
            Self::Stopped => write!(f, "stopped"),
            Self::HostError => write!(f, "host error"),
            Self::FirmwareError => write!(f, "firmware error"),
        }
    }
}
