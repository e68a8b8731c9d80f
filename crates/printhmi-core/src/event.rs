//! Event channel from the connection supervisor to the UI
//!
//! Provides:
//! - Event types for connection state, status and file list changes
//! - An unbounded channel carrying them in arrival order

use crate::data::{FileList, PrinterConnectionState, StatusSnapshot};
use tokio::sync::mpsc;

/// Events published by the connection supervisor
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// Domain connection state changed (or was re-announced)
    StateChanged(PrinterConnectionState),
    /// Status store changed; carries the merged snapshot
    StatusUpdated(StatusSnapshot),
    /// File list was replaced
    FileListUpdated(FileList),
}

impl std::fmt::Display for HostEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostEvent::StateChanged(state) => write!(f, "State: {}", state),
            HostEvent::StatusUpdated(status) => {
                write!(f, "Status: {} objects", status.as_map().len())
            }
            HostEvent::FileListUpdated(files) => write!(f, "Files: {} entries", files.len()),
        }
    }
}

/// Sending half of the host event channel
pub type HostEventSender = mpsc::UnboundedSender<HostEvent>;

/// Receiving half of the host event channel
pub type HostEventReceiver = mpsc::UnboundedReceiver<HostEvent>;

/// Create a host event channel
pub fn host_event_channel() -> (HostEventSender, HostEventReceiver) {
    mpsc::unbounded_channel()
}
