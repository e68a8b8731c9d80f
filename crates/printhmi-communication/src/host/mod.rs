//! Printer host link
//!
//! Provides:
//! - The transport contract for the persistent host connection
//! - A Moonraker websocket JSON-RPC implementation
//! - The connection supervisor turning transport events into domain state
//! - Fire-and-forget printer commands and on-demand file queries

pub mod commands;
pub mod moonraker;
pub mod supervisor;
pub mod thumbnails;

pub use commands::{
    command_queue, format_macro, spawn_command_worker, CommandReceiver, CommandSender,
    HostCommand, PrinterCommands,
};
pub use moonraker::{MoonrakerClient, MoonrakerParams};
pub use supervisor::ConnectionSupervisor;
pub use thumbnails::{select_thumbnail, HttpThumbnailFetcher, ThumbnailFetcher, ThumbnailInfo};

use async_trait::async_trait;
use printhmi_core::Result;
use serde_json::Value;
use tokio::sync::mpsc;

/// RPC method names understood by the host
pub mod methods {
    /// Subscribe to printer object updates
    pub const OBJECTS_SUBSCRIBE: &str = "printer.objects.subscribe";
    /// Query printer objects once
    pub const OBJECTS_QUERY: &str = "printer.objects.query";
    /// Host information including the firmware state
    pub const SERVER_INFO: &str = "server.info";
    /// Run a G-code script
    pub const GCODE_SCRIPT: &str = "printer.gcode.script";
    /// Emergency stop
    pub const EMERGENCY_STOP: &str = "printer.emergency_stop";
    /// Restart the firmware host process
    pub const RESTART: &str = "printer.restart";
    /// Restart the firmware MCU
    pub const FIRMWARE_RESTART: &str = "printer.firmware_restart";
    /// Start printing a file
    pub const PRINT_START: &str = "printer.print.start";
    /// Pause the current print
    pub const PRINT_PAUSE: &str = "printer.print.pause";
    /// Resume the current print
    pub const PRINT_RESUME: &str = "printer.print.resume";
    /// Cancel the current print
    pub const PRINT_CANCEL: &str = "printer.print.cancel";
    /// Metadata of a G-code file
    pub const FILE_METADATA: &str = "server.files.metadata";
    /// Thumbnails embedded in a G-code file
    pub const FILE_THUMBNAILS: &str = "server.files.thumbnails";
}

/// Notification names pushed by the host
pub mod notifications {
    /// Firmware became ready
    pub const KLIPPY_READY: &str = "notify_klippy_ready";
    /// Firmware shut down
    pub const KLIPPY_SHUTDOWN: &str = "notify_klippy_shutdown";
    /// Host lost the firmware connection
    pub const KLIPPY_DISCONNECTED: &str = "notify_klippy_disconnected";
    /// Partial printer status update
    pub const STATUS_UPDATE: &str = "notify_status_update";
    /// G-code file list changed
    pub const FILELIST_CHANGED: &str = "notify_filelist_changed";
}

/// Raw lifecycle state of the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportState {
    /// A connection attempt is in progress
    Connecting,
    /// The connection is established
    Connected,
    /// The connection is being closed
    Disconnecting,
    /// The connection is closed
    Stopped,
    /// The host could not be reached in time
    ConnectTimeout,
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnecting => write!(f, "disconnecting"),
            Self::Stopped => write!(f, "stopped"),
            Self::ConnectTimeout => write!(f, "connect timeout"),
        }
    }
}

/// Event delivered by a transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Lifecycle change
    StateChanged(TransportState),
    /// Unsolicited notification from the host
    Notification {
        /// Notification name
        method: String,
        /// Positional payload
        params: Vec<Value>,
    },
}

/// Sending half of a transport event channel
pub type TransportEventSender = mpsc::UnboundedSender<TransportEvent>;

/// Receiving half of a transport event channel
pub type TransportEventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Create a transport event channel
pub fn transport_event_channel() -> (TransportEventSender, TransportEventReceiver) {
    mpsc::unbounded_channel()
}

/// Persistent RPC connection to the printer host
///
/// Lifecycle changes and notifications are reported on the event channel the
/// transport was built with.
#[async_trait]
pub trait HostTransport: Send + Sync {
    /// Start the connection. Calling it again while running is a no-op.
    async fn connect(&self) -> Result<()>;

    /// Close the connection and stop reconnecting
    async fn disconnect(&self) -> Result<()>;

    /// Call a method with named arguments (`Value::Null` for none)
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}
