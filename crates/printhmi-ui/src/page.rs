//! Page contract
//!
//! Every page implements the same three hooks. Unused hooks fall back to
//! no-op defaults so dispatch never needs to ask what a page supports.

use crate::context::PageContext;
use crate::error::UiResult;
use async_trait::async_trait;
use printhmi_core::{DisplayEvent, StatusSnapshot};

/// Role of a page in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Splash screen shown while the printer is not ready
    Boot,
    /// Home dashboard
    Main,
    /// Print dashboard
    Printing,
    /// Second print dashboard with details
    PrintingDetail,
    /// Numeric entry for heater targets
    Keypad,
    /// Axis movement
    Move,
    /// Filament load and unload
    Filament,
    /// G-code file browser
    FileList,
    /// Settings menu
    Settings,
    /// Language selection
    Language,
    /// Bed calibration
    Calibration,
    /// Firmware error screen with restart actions
    Reset,
    /// Paused print
    Pause,
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PageKind::Boot => "boot",
            PageKind::Main => "main",
            PageKind::Printing => "printing",
            PageKind::PrintingDetail => "printing-detail",
            PageKind::Keypad => "keypad",
            PageKind::Move => "move",
            PageKind::Filament => "filament",
            PageKind::FileList => "file-list",
            PageKind::Settings => "settings",
            PageKind::Language => "language",
            PageKind::Calibration => "calibration",
            PageKind::Reset => "reset",
            PageKind::Pause => "pause",
        };
        f.write_str(name)
    }
}

/// One addressable screen of the display
///
/// `on_event` and `on_status` return the page to switch to, if any.
#[async_trait]
pub trait Page: Send + Sync {
    /// Role of this page
    fn kind(&self) -> PageKind;

    /// Page id as known by the display firmware
    fn id(&self) -> u8;

    /// Page name as known by the display firmware
    fn name(&self) -> &'static str;

    /// Runs after the display has switched to this page
    async fn on_enter(&mut self, _ctx: &mut PageContext) -> UiResult<()> {
        Ok(())
    }

    /// Display event while this page is current
    async fn on_event(
        &mut self,
        _ctx: &mut PageContext,
        _event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        Ok(None)
    }

    /// Status push while this page is current
    async fn on_status(
        &mut self,
        _ctx: &mut PageContext,
        _status: &StatusSnapshot,
    ) -> UiResult<Option<PageKind>> {
        Ok(None)
    }
}
