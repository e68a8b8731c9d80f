//! Axis movement and filament pages

use super::nav::nav_target;
use crate::context::PageContext;
use crate::error::UiResult;
use crate::heater::Heater;
use crate::page::{Page, PageKind};
use crate::render::{is_heating, target, temperature, Highlight};
use async_trait::async_trait;
use printhmi_core::{DisplayEvent, StatusSnapshot};

/// Live toolhead position
#[derive(Debug, Default)]
pub struct MovePage;

impl MovePage {
    const FILAMENT_BUTTON: u8 = 22;
}

#[async_trait]
impl Page for MovePage {
    fn kind(&self) -> PageKind {
        PageKind::Move
    }

    fn id(&self) -> u8 {
        18
    }

    fn name(&self) -> &'static str {
        "move"
    }

    async fn on_event(
        &mut self,
        _ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        Ok(event.touched_component().and_then(|component| match component {
            Self::FILAMENT_BUTTON => Some(PageKind::Filament),
            other => nav_target(other),
        }))
    }

    async fn on_status(
        &mut self,
        ctx: &mut PageContext,
        status: &StatusSnapshot,
    ) -> UiResult<Option<PageKind>> {
        for (axis, field) in ["t0.txt", "t1.txt", "t2.txt"].into_iter().enumerate() {
            let position = status.f64_at("motion_report", "live_position", axis)?;
            ctx.display.set_text(field, &format!("{:.1}", position)).await?;
        }
        Ok(None)
    }
}

/// Heater overview used while loading filament
#[derive(Debug, Default)]
pub struct FilamentPage;

impl FilamentPage {
    const HIGHLIGHT: Highlight = Highlight::new(176, 177);
    const MOVE_BUTTON: u8 = 23;
}

#[async_trait]
impl Page for FilamentPage {
    fn kind(&self) -> PageKind {
        PageKind::Filament
    }

    fn id(&self) -> u8 {
        62
    }

    fn name(&self) -> &'static str {
        "filament"
    }

    async fn on_event(
        &mut self,
        _ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        Ok(event.touched_component().and_then(|component| match component {
            Self::MOVE_BUTTON => Some(PageKind::Move),
            other => nav_target(other),
        }))
    }

    async fn on_status(
        &mut self,
        ctx: &mut PageContext,
        status: &StatusSnapshot,
    ) -> UiResult<Option<PageKind>> {
        let display = ctx.display.as_ref();
        // Each heater drives two elements off the same predicate
        for (heater, text, value, buttons) in [
            (Heater::Extruder, "t0.txt", "n0.val", ["b2", "b0"]),
            (Heater::Bed, "t1.txt", "n1.val", ["b3", "b1"]),
            (Heater::Chamber, "t2.txt", "n2.val", ["b12", "b13"]),
        ] {
            display
                .set_text(text, &temperature(status, heater)?.to_string())
                .await?;
            display.set_number(value, target(status, heater)?).await?;
            let heating = is_heating(status, heater)?;
            for button in buttons {
                Self::HIGHLIGHT.apply(display, button, heating).await?;
            }
        }
        Ok(None)
    }
}
