//! UI for the Qidi Q1 Pro stock TJC display firmware

pub mod home;
pub mod keypad;
pub mod menus;
pub mod motion;
pub mod nav;
pub mod printing;

pub use home::MainPage;
pub use keypad::KeypadPage;
pub use menus::{BootPage, CalibrationPage, FileListPage, LanguagePage, ResetPage, SettingsPage};
pub use motion::{FilamentPage, MovePage};
pub use printing::{PausePage, PrintingDetailPage, PrintingPage};

use crate::context::PageContext;
use crate::error::UiResult;
use crate::listener::HmiListener;
use crate::machine::PageMachine;
use crate::page::{Page, PageKind};
use async_trait::async_trait;
use printhmi_core::{DisplayEvent, DisplayEventKind, FileList, StatusSnapshot, SubscriptionSet};

/// Catalog key
pub const KEY: &str = "openq1";

pub(crate) const THUMBNAIL_COMPONENT: &str = "cp0";
pub(crate) const THUMBNAIL_SIZE: u32 = 160;
pub(crate) const THUMBNAIL_BACKGROUND: &str = "4d4d4d";

const HEATER_FIELDS: &[&str] = &["temperature", "target"];

/// Printer objects the pages read
pub fn printer_objects() -> SubscriptionSet {
    SubscriptionSet::new()
        .with("extruder", HEATER_FIELDS)
        .with("heater_bed", HEATER_FIELDS)
        .with("heater_generic chamber", HEATER_FIELDS)
        .with("output_pin caselight", &["value"])
        .with("output_pin sound", &["value"])
        .with("output_pin beep", &["value"])
        .with("fan_generic cooling_fan", &["speed"])
        .with("fan_generic auxiliary_cooling_fan", &["speed"])
        .with("heater_fan chamber_fan", &["speed"])
        .with(
            "print_stats",
            &["state", "filename", "print_duration", "total_duration"],
        )
        .with("display_status", &["progress"])
        .with("motion_report", &["live_position"])
}

/// One fresh instance of every page
pub fn pages() -> Vec<Box<dyn Page>> {
    vec![
        Box::new(BootPage),
        Box::new(MainPage::new()),
        Box::new(PrintingPage::new()),
        Box::new(PrintingDetailPage),
        Box::new(KeypadPage),
        Box::new(MovePage),
        Box::new(FilamentPage),
        Box::new(FileListPage),
        Box::new(SettingsPage),
        Box::new(LanguagePage),
        Box::new(CalibrationPage),
        Box::new(ResetPage),
        Box::new(PausePage),
    ]
}

/// Page machine wired to connection and display events
pub struct OpenQ1Ui {
    machine: PageMachine,
}

impl OpenQ1Ui {
    pub fn new(context: PageContext) -> Self {
        Self {
            machine: PageMachine::new(context, pages(), PageKind::Boot),
        }
    }

    pub fn machine(&self) -> &PageMachine {
        &self.machine
    }

    pub fn current(&self) -> PageKind {
        self.machine.current()
    }
}

#[async_trait]
impl HmiListener for OpenQ1Ui {
    async fn start(&mut self) -> UiResult<()> {
        self.machine.transition(PageKind::Boot).await
    }

    async fn on_ready(&mut self) -> UiResult<()> {
        self.machine.transition(PageKind::Main).await
    }

    async fn on_not_ready(&mut self) -> UiResult<()> {
        self.machine.transition(PageKind::Boot).await
    }

    async fn on_host_error(&mut self) -> UiResult<()> {
        self.machine.transition(PageKind::Boot).await
    }

    async fn on_firmware_error(&mut self) -> UiResult<()> {
        self.machine.transition(PageKind::Reset).await
    }

    async fn on_stopped(&mut self) -> UiResult<()> {
        self.machine.transition(PageKind::Boot).await
    }

    async fn on_printer_status_update(&mut self, status: &StatusSnapshot) -> UiResult<()> {
        self.machine.dispatch_status_update(status).await
    }

    async fn on_file_list_update(&mut self, files: &FileList) -> UiResult<()> {
        tracing::debug!("File list updated: {} entries", files.len());
        self.machine.context_mut().files = files.clone();
        Ok(())
    }

    async fn on_display_event(&mut self, event: &DisplayEvent) -> UiResult<()> {
        if event.kind == DisplayEventKind::Reconnected {
            // handled by the caller with a full status re-push
            return Ok(());
        }
        self.machine.dispatch_display_event(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{drain, fake_context, FakeDisplay};
    use printhmi_communication::HostCommand;
    use printhmi_core::{HostEvent, PrinterConnectionState};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_catalog_is_complete() {
        let pages = pages();
        let kinds: HashSet<PageKind> = pages.iter().map(|p| p.kind()).collect();
        let ids: HashSet<u8> = pages.iter().map(|p| p.id()).collect();
        assert_eq!(kinds.len(), pages.len());
        assert_eq!(ids.len(), pages.len());
    }

    #[test]
    fn test_subscription_covers_pages() {
        let objects = printer_objects();
        let names: Vec<&str> = objects.objects().collect();
        for object in [
            "extruder",
            "heater_generic chamber",
            "output_pin caselight",
            "print_stats",
            "display_status",
            "motion_report",
        ] {
            assert!(names.contains(&object), "missing {}", object);
        }
    }

    #[tokio::test]
    async fn test_connection_states_pick_pages() {
        let display = FakeDisplay::new();
        let (ctx, _rx) = fake_context(Arc::clone(&display));
        let mut ui = OpenQ1Ui::new(ctx);

        ui.start().await.unwrap();
        assert_eq!(ui.current(), PageKind::Boot);

        for (state, page) in [
            (PrinterConnectionState::Ready, PageKind::Main),
            (PrinterConnectionState::FirmwareError, PageKind::Reset),
            (PrinterConnectionState::HostError, PageKind::Boot),
            (PrinterConnectionState::Ready, PageKind::Main),
            (PrinterConnectionState::Stopped, PageKind::Boot),
        ] {
            ui.on_host_event(&HostEvent::StateChanged(state)).await.unwrap();
            assert_eq!(ui.current(), page, "after {}", state);
        }
    }

    #[tokio::test]
    async fn test_home_estop_stays_on_home() {
        let display = FakeDisplay::new();
        let (ctx, mut rx) = fake_context(Arc::clone(&display));
        let mut ui = OpenQ1Ui::new(ctx);
        ui.on_ready().await.unwrap();
        display.clear();

        ui.on_display_event(&DisplayEvent::touch(3, 2, true)).await.unwrap();

        assert_eq!(ui.current(), PageKind::Main);
        assert_eq!(drain(&mut rx), vec![HostCommand::EmergencyStop]);
        assert!(display.commands().is_empty());
    }

    #[tokio::test]
    async fn test_reconnected_event_is_not_forwarded() {
        let display = FakeDisplay::new();
        let (ctx, _rx) = fake_context(Arc::clone(&display));
        let mut ui = OpenQ1Ui::new(ctx);
        ui.start().await.unwrap();
        display.clear();

        ui.on_display_event(&DisplayEvent::signal(DisplayEventKind::Reconnected))
            .await
            .unwrap();

        assert_eq!(ui.current(), PageKind::Boot);
        assert!(display.commands().is_empty());
    }

    #[tokio::test]
    async fn test_file_list_kept_in_context() {
        let display = FakeDisplay::new();
        let (ctx, _rx) = fake_context(display);
        let mut ui = OpenQ1Ui::new(ctx);

        let files = FileList::from_payload(&serde_json::json!({ "benchy.gcode": {} }));
        ui.on_host_event(&HostEvent::FileListUpdated(files)).await.unwrap();

        assert!(ui.machine().context().files.contains("benchy.gcode"));
    }
}
