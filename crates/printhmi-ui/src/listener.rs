//! Upward interface from the supervisor and display to a UI implementation

use crate::error::UiResult;
use async_trait::async_trait;
use printhmi_core::{
    DisplayEvent, FileList, HostEvent, PrinterConnectionState, StatusSnapshot,
};

/// Receiver of connection, status and display events
///
/// A failing handler only loses that one update; callers log the error and
/// keep delivering.
#[async_trait]
pub trait HmiListener: Send {
    /// Show the initial page
    async fn start(&mut self) -> UiResult<()>;

    async fn on_ready(&mut self) -> UiResult<()>;

    async fn on_not_ready(&mut self) -> UiResult<()>;

    async fn on_host_error(&mut self) -> UiResult<()>;

    async fn on_firmware_error(&mut self) -> UiResult<()>;

    async fn on_stopped(&mut self) -> UiResult<()>;

    async fn on_printer_status_update(&mut self, status: &StatusSnapshot) -> UiResult<()>;

    async fn on_file_list_update(&mut self, files: &FileList) -> UiResult<()>;

    async fn on_display_event(&mut self, event: &DisplayEvent) -> UiResult<()>;

    /// Route a connection state to its handler
    async fn on_connection_state(&mut self, state: PrinterConnectionState) -> UiResult<()> {
        match state {
            PrinterConnectionState::Ready => self.on_ready().await,
            PrinterConnectionState::NotReady => self.on_not_ready().await,
            PrinterConnectionState::HostError => self.on_host_error().await,
            PrinterConnectionState::FirmwareError => self.on_firmware_error().await,
            PrinterConnectionState::Stopped => self.on_stopped().await,
        }
    }

    /// Route a supervisor event to its handler
    async fn on_host_event(&mut self, event: &HostEvent) -> UiResult<()> {
        match event {
            HostEvent::StateChanged(state) => self.on_connection_state(*state).await,
            HostEvent::StatusUpdated(status) => self.on_printer_status_update(status).await,
            HostEvent::FileListUpdated(files) => self.on_file_list_update(files).await,
        }
    }
}
