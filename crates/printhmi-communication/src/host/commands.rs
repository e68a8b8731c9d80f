//! Printer commands
//!
//! Commands issued from UI handlers are fire-and-forget: they are queued and
//! run by a worker that logs failures instead of returning them. File
//! queries are awaited by the caller.

use super::thumbnails::{select_thumbnail, ThumbnailFetcher, ThumbnailInfo};
use super::{methods, HostTransport};
use image::DynamicImage;
use printhmi_core::{HostError, Result, SharedStatus};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A queued printer command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Run a G-code script
    Gcode(String),
    /// Emergency stop
    EmergencyStop,
    /// Restart the firmware host process
    Restart,
    /// Restart the firmware MCU
    FirmwareRestart,
    /// Start printing a file
    StartPrint(String),
    /// Pause the current print
    PausePrint,
    /// Resume the current print
    ResumePrint,
    /// Cancel the current print
    CancelPrint,
}

impl HostCommand {
    /// RPC method carrying this command
    pub fn method(&self) -> &'static str {
        match self {
            Self::Gcode(_) => methods::GCODE_SCRIPT,
            Self::EmergencyStop => methods::EMERGENCY_STOP,
            Self::Restart => methods::RESTART,
            Self::FirmwareRestart => methods::FIRMWARE_RESTART,
            Self::StartPrint(_) => methods::PRINT_START,
            Self::PausePrint => methods::PRINT_PAUSE,
            Self::ResumePrint => methods::PRINT_RESUME,
            Self::CancelPrint => methods::PRINT_CANCEL,
        }
    }

    /// RPC arguments
    pub fn params(&self) -> Value {
        match self {
            Self::Gcode(script) => json!({ "script": script }),
            Self::StartPrint(filename) => json!({ "filename": filename }),
            _ => Value::Null,
        }
    }

    /// Method and arguments of the call carrying this command
    pub fn rpc(&self) -> (&'static str, Value) {
        (self.method(), self.params())
    }
}

impl std::fmt::Display for HostCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gcode(script) => write!(f, "gcode '{}'", script),
            Self::StartPrint(filename) => write!(f, "start print '{}'", filename),
            other => write!(f, "{}", other.method()),
        }
    }
}

/// Sending half of the command queue
pub type CommandSender = mpsc::UnboundedSender<HostCommand>;

/// Receiving half of the command queue
pub type CommandReceiver = mpsc::UnboundedReceiver<HostCommand>;

/// Create a command queue
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}

/// Run queued commands against the transport
///
/// Each command is dispatched in queue order but without waiting for the
/// previous one to finish, so a long G-code script never delays an
/// emergency stop. Failures are logged at warn and dropped.
pub fn spawn_command_worker(
    transport: Arc<dyn HostTransport>,
    mut commands: CommandReceiver,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            tracing::debug!("Dispatching {}", command);
            let transport = Arc::clone(&transport);
            tokio::spawn(async move {
                let (method, params) = command.rpc();
                if let Err(e) = transport.call(method, params).await {
                    tracing::warn!("Command {} failed: {}", command, e);
                }
            });
        }
        tracing::debug!("Command queue closed");
    })
}

/// Format a macro invocation: the name followed by `KEY=value` pairs
pub fn format_macro(name: &str, params: &[(&str, String)]) -> String {
    let mut script = name.to_string();
    for (key, value) in params {
        script.push(' ');
        script.push_str(key);
        script.push('=');
        script.push_str(value);
    }
    script.trim().to_string()
}

/// Printer command facade used by UI handlers
#[derive(Clone)]
pub struct PrinterCommands {
    queue: CommandSender,
    transport: Arc<dyn HostTransport>,
    status: SharedStatus,
    thumbnails: Arc<dyn ThumbnailFetcher>,
}

impl PrinterCommands {
    /// Create the facade
    pub fn new(
        queue: CommandSender,
        transport: Arc<dyn HostTransport>,
        status: SharedStatus,
        thumbnails: Arc<dyn ThumbnailFetcher>,
    ) -> Self {
        Self {
            queue,
            transport,
            status,
            thumbnails,
        }
    }

    fn enqueue(&self, command: HostCommand) {
        if let Err(e) = self.queue.send(command) {
            tracing::warn!("Command queue closed, dropping {}", e.0);
        }
    }

    /// Run a G-code script
    pub fn run_gcode(&self, script: impl Into<String>) {
        self.enqueue(HostCommand::Gcode(script.into()));
    }

    /// Run a macro with `KEY=value` arguments
    pub fn run_macro(&self, name: &str, params: &[(&str, String)]) {
        self.run_gcode(format_macro(name, params));
    }

    /// Emergency stop
    pub fn emergency_stop(&self) {
        self.enqueue(HostCommand::EmergencyStop);
    }

    /// Restart the firmware host process
    pub fn restart(&self) {
        self.enqueue(HostCommand::Restart);
    }

    /// Restart the firmware MCU
    pub fn firmware_restart(&self) {
        self.enqueue(HostCommand::FirmwareRestart);
    }

    /// Start printing `filename`
    pub fn start_print(&self, filename: impl Into<String>) {
        self.enqueue(HostCommand::StartPrint(filename.into()));
    }

    /// Pause the current print
    pub fn pause_print(&self) {
        self.enqueue(HostCommand::PausePrint);
    }

    /// Resume the current print
    pub fn resume_print(&self) {
        self.enqueue(HostCommand::ResumePrint);
    }

    /// Cancel the current print
    pub fn cancel_print(&self) {
        self.enqueue(HostCommand::CancelPrint);
    }

    /// Flip an output pin between off and full on
    ///
    /// The current value comes from the status store; a missing pin counts
    /// as off.
    pub fn toggle_pin(&self, pin: &str) {
        let object = format!("output_pin {pin}");
        let current = self
            .status
            .read()
            .object(&object)
            .and_then(|obj| obj.get("value"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let value = if current > 0.0 { 0 } else { 1 };
        self.run_macro("SET_PIN", &[("PIN", pin.to_string()), ("VALUE", value.to_string())]);
    }

    /// Shared status store
    pub fn status(&self) -> &SharedStatus {
        &self.status
    }

    /// Metadata of a G-code file
    pub async fn file_metadata(&self, filename: &str) -> Result<Value> {
        self.transport
            .call(methods::FILE_METADATA, json!({ "filename": filename }))
            .await
    }

    /// Thumbnails embedded in a G-code file
    pub async fn thumbnails(&self, filename: &str) -> Result<Vec<ThumbnailInfo>> {
        let result = self
            .transport
            .call(methods::FILE_THUMBNAILS, json!({ "filename": filename }))
            .await?;
        serde_json::from_value(result).map_err(|e| {
            HostError::InvalidResponse {
                method: methods::FILE_THUMBNAILS.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Fetch and decode the thumbnail of `filename` closest to `width`
    pub async fn thumbnail(&self, width: u32, filename: &str) -> Result<DynamicImage> {
        let candidates = self.thumbnails(filename).await?;
        let chosen = select_thumbnail(&candidates, width).ok_or_else(|| HostError::NoThumbnail {
            filename: filename.to_string(),
        })?;
        let bytes = self.thumbnails.fetch(&chosen.thumbnail_path).await?;
        image::load_from_memory(&bytes).map_err(|e| {
            HostError::ThumbnailFetch {
                reason: format!("cannot decode {}: {}", chosen.thumbnail_path, e),
            }
            .into()
        })
    }
}
