//! Home dashboard

use super::nav::{heater_button, nav_target};
use super::{THUMBNAIL_BACKGROUND, THUMBNAIL_COMPONENT, THUMBNAIL_SIZE};
use crate::context::PageContext;
use crate::error::UiResult;
use crate::heater::Heater;
use crate::page::{Page, PageKind};
use crate::render::{is_heating, temperature, Highlight};
use crate::thumbnail::ThumbnailSlot;
use async_trait::async_trait;
use printhmi_core::{DisplayEvent, StatusSnapshot};

const HIGHLIGHT: Highlight = Highlight::new(32, 33);

const CASELIGHT_BUTTON: u8 = 0;
const SOUND_BUTTON: u8 = 1;
const ESTOP_BUTTON: u8 = 2;

/// Temperatures, pins and the current file at a glance
pub struct MainPage {
    thumbnail: ThumbnailSlot,
}

impl MainPage {
    pub fn new() -> Self {
        Self {
            thumbnail: ThumbnailSlot::new(THUMBNAIL_COMPONENT, THUMBNAIL_SIZE, THUMBNAIL_BACKGROUND),
        }
    }
}

impl Default for MainPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Page for MainPage {
    fn kind(&self) -> PageKind {
        PageKind::Main
    }

    fn id(&self) -> u8 {
        3
    }

    fn name(&self) -> &'static str {
        "main"
    }

    async fn on_enter(&mut self, ctx: &mut PageContext) -> UiResult<()> {
        ctx.display.set_number("b6.picc", 31).await?;
        ctx.display.set_text("tip.txt", "").await?;
        Ok(())
    }

    async fn on_event(
        &mut self,
        ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        let Some(component) = event.touched_component() else {
            return Ok(None);
        };
        tracing::debug!("Main: {}", event);

        match component {
            CASELIGHT_BUTTON => ctx.printer.toggle_pin("caselight"),
            SOUND_BUTTON => {
                ctx.printer.toggle_pin("sound");
                ctx.printer.toggle_pin("beep");
            }
            ESTOP_BUTTON => ctx.printer.emergency_stop(),
            other => {
                if let Some(heater) = heater_button(other) {
                    return Ok(Some(ctx.open_keypad(heater, PageKind::Main)));
                }
                return Ok(nav_target(other));
            }
        }
        Ok(None)
    }

    async fn on_status(
        &mut self,
        ctx: &mut PageContext,
        status: &StatusSnapshot,
    ) -> UiResult<Option<PageKind>> {
        if status.str("print_stats", "state")? == "printing" {
            return Ok(Some(PageKind::Printing));
        }

        let display = ctx.display.as_ref();
        for (heater, value, button) in [
            (Heater::Extruder, "n0.val", "b3"),
            (Heater::Bed, "n1.val", "b4"),
            (Heater::Chamber, "n2.val", "b5"),
        ] {
            display.set_number(value, temperature(status, heater)?).await?;
            HIGHLIGHT
                .apply(display, button, is_heating(status, heater)?)
                .await?;
        }

        HIGHLIGHT
            .apply(display, "b0", status.f64("output_pin caselight", "value")? > 0.0)
            .await?;
        HIGHLIGHT
            .apply(display, "b1", status.f64("output_pin sound", "value")? > 0.0)
            .await?;

        let filename = status.str("print_stats", "filename")?;
        display.set_text("t0.txt", filename).await?;
        self.thumbnail.render(ctx, filename).await?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{drain, fake_context, fake_context_with_status, FakeDisplay};
    use printhmi_communication::HostCommand;
    use printhmi_core::{DisplayEventKind, DisplayValue, StatusError};
    use serde_json::json;
    use std::sync::Arc;

    fn status(state: &str, filename: &str) -> StatusSnapshot {
        let value = json!({
            "print_stats": { "state": state, "filename": filename },
            "extruder": { "temperature": 24.7, "target": 210.0 },
            "heater_bed": { "temperature": 60.2, "target": 60.0 },
            "heater_generic chamber": { "temperature": 30.0, "target": 0.0 },
            "output_pin caselight": { "value": 1.0 },
            "output_pin sound": { "value": 0.0 }
        });
        StatusSnapshot::from(value.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_estop_sends_one_command_without_transition() {
        let display = FakeDisplay::new();
        let (mut ctx, mut rx) = fake_context(display);
        let mut page = MainPage::new();

        let next = page
            .on_event(&mut ctx, &DisplayEvent::touch(3, ESTOP_BUTTON, true))
            .await
            .unwrap();

        assert_eq!(next, None);
        assert_eq!(drain(&mut rx), vec![HostCommand::EmergencyStop]);
    }

    #[tokio::test]
    async fn test_sound_button_toggles_both_pins() {
        let display = FakeDisplay::new();
        let (mut ctx, mut rx) = fake_context(display);
        let mut page = MainPage::new();

        page.on_event(&mut ctx, &DisplayEvent::touch(3, SOUND_BUTTON, false))
            .await
            .unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![
                HostCommand::Gcode("SET_PIN PIN=sound VALUE=1".to_string()),
                HostCommand::Gcode("SET_PIN PIN=beep VALUE=1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_heater_button_opens_keypad() {
        let display = FakeDisplay::new();
        let (mut ctx, _rx) = fake_context(display);
        let mut page = MainPage::new();

        let next = page
            .on_event(&mut ctx, &DisplayEvent::touch(3, 23, true))
            .await
            .unwrap();

        assert_eq!(next, Some(PageKind::Keypad));
        assert_eq!(ctx.return_page(), Some(PageKind::Main));
        assert_eq!(ctx.heater_selection().map(|s| s.heater()), Some(Heater::Chamber));
    }

    #[tokio::test]
    async fn test_nav_fallback_and_non_touch_events() {
        let display = FakeDisplay::new();
        let (mut ctx, mut rx) = fake_context(display);
        let mut page = MainPage::new();

        let next = page
            .on_event(&mut ctx, &DisplayEvent::touch(3, 33, true))
            .await
            .unwrap();
        assert_eq!(next, Some(PageKind::Settings));

        let next = page
            .on_event(&mut ctx, &DisplayEvent::signal(DisplayEventKind::Wakeup))
            .await
            .unwrap();
        assert_eq!(next, None);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_status_renders_dashboard() {
        let display = FakeDisplay::new();
        let (mut ctx, _rx, _host) =
            fake_context_with_status(Arc::clone(&display), Default::default());
        let mut page = MainPage::new();

        let next = page.on_status(&mut ctx, &status("standby", "")).await.unwrap();

        assert_eq!(next, None);
        assert_eq!(display.last("n0.val"), Some(DisplayValue::Number(24)));
        assert_eq!(display.last("b3.picc"), Some(DisplayValue::Number(33)));
        assert_eq!(display.last("b4.picc"), Some(DisplayValue::Number(32)));
        assert_eq!(display.last("b5.picc"), Some(DisplayValue::Number(32)));
        assert_eq!(display.last("b0.picc"), Some(DisplayValue::Number(33)));
        assert_eq!(display.last("b1.picc"), Some(DisplayValue::Number(32)));
        assert_eq!(display.commands(), vec!["vis cp0,0"]);
    }

    #[tokio::test]
    async fn test_printing_state_switches_page() {
        let display = FakeDisplay::new();
        let (mut ctx, _rx) = fake_context(Arc::clone(&display));
        let mut page = MainPage::new();

        let next = page
            .on_status(&mut ctx, &status("printing", "benchy.gcode"))
            .await
            .unwrap();
        assert_eq!(next, Some(PageKind::Printing));
    }

    #[tokio::test]
    async fn test_missing_field_aborts_render() {
        let display = FakeDisplay::new();
        let (mut ctx, _rx) = fake_context(Arc::clone(&display));
        let mut page = MainPage::new();
        let status = StatusSnapshot::from(
            json!({ "print_stats": { "state": "standby" } })
                .as_object()
                .cloned()
                .unwrap(),
        );

        let result = page.on_status(&mut ctx, &status).await;
        assert!(matches!(
            result,
            Err(crate::UiError::Status(StatusError::MissingField { .. }))
        ));
    }
}
