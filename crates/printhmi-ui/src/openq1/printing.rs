//! Pages shown while a print job is active

use super::nav::{heater_button, nav_target};
use super::{THUMBNAIL_BACKGROUND, THUMBNAIL_COMPONENT, THUMBNAIL_SIZE};
use crate::context::PageContext;
use crate::error::UiResult;
use crate::heater::Heater;
use crate::page::{Page, PageKind};
use crate::render::{fan_percent, is_heating, print_times, target, temperature, Highlight};
use crate::thumbnail::ThumbnailSlot;
use async_trait::async_trait;
use printhmi_core::{DisplayEvent, StatusSnapshot};

const HIGHLIGHT: Highlight = Highlight::new(51, 52);

const FANS: [(&str, &str, &str); 3] = [
    ("fan_generic cooling_fan", "n4.val", "b4"),
    ("fan_generic auxiliary_cooling_fan", "n5.val", "b5"),
    ("heater_fan chamber_fan", "n6.val", "b6"),
];

/// Main page once the job in `state` has ended
///
/// A job moving between `printing` and `paused` keeps whichever print page is
/// up; pushes racing a pause or resume request would otherwise bounce it.
fn follow_print_state(state: &str) -> Option<PageKind> {
    match state {
        "printing" | "paused" => None,
        _ => Some(PageKind::Main),
    }
}

/// Print dashboard: temperatures, fans, progress and time estimates
pub struct PrintingPage {
    thumbnail: ThumbnailSlot,
}

impl PrintingPage {
    const CASELIGHT_BUTTON: u8 = 3;
    const DETAIL_BUTTON: u8 = 2;
    const PAUSE_BUTTON: u8 = 10;
    const ESTOP_BUTTON: u8 = 11;

    pub fn new() -> Self {
        Self {
            thumbnail: ThumbnailSlot::new(THUMBNAIL_COMPONENT, THUMBNAIL_SIZE, THUMBNAIL_BACKGROUND),
        }
    }
}

impl Default for PrintingPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Page for PrintingPage {
    fn kind(&self) -> PageKind {
        PageKind::Printing
    }

    fn id(&self) -> u8 {
        8
    }

    fn name(&self) -> &'static str {
        "printing"
    }

    async fn on_enter(&mut self, ctx: &mut PageContext) -> UiResult<()> {
        for (_, value, _) in FANS {
            ctx.display.set_number(value, 0).await?;
        }
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
        tracing::debug!("Printing: {}", event);

        let next = match component {
            Self::CASELIGHT_BUTTON => {
                ctx.printer.toggle_pin("caselight");
                None
            }
            Self::PAUSE_BUTTON => {
                ctx.printer.pause_print();
                Some(PageKind::Pause)
            }
            Self::ESTOP_BUTTON => {
                ctx.printer.emergency_stop();
                None
            }
            Self::DETAIL_BUTTON => Some(PageKind::PrintingDetail),
            other => match heater_button(other) {
                Some(heater) => Some(ctx.open_keypad(heater, PageKind::Printing)),
                None => nav_target(other),
            },
        };
        Ok(next)
    }

    async fn on_status(
        &mut self,
        ctx: &mut PageContext,
        status: &StatusSnapshot,
    ) -> UiResult<Option<PageKind>> {
        let state = status.str("print_stats", "state")?;
        if let Some(next) = follow_print_state(state) {
            return Ok(Some(next));
        }

        let display = ctx.display.as_ref();
        for (heater, value, button, text) in [
            (Heater::Extruder, "n0.val", "b0", "t0.txt"),
            (Heater::Bed, "n1.val", "b1", "t1.txt"),
            (Heater::Chamber, "n2.val", "b7", "t5.txt"),
        ] {
            display.set_number(value, temperature(status, heater)?).await?;
            HIGHLIGHT
                .apply(display, button, is_heating(status, heater)?)
                .await?;
            display
                .set_text(text, &target(status, heater)?.to_string())
                .await?;
        }

        // b3 is lit while the light is off
        HIGHLIGHT
            .apply(display, "b3", status.f64("output_pin caselight", "value")? < 1.0)
            .await?;

        for (object, value, button) in FANS {
            let speed = fan_percent(status, object);
            display.set_number(value, speed).await?;
            HIGHLIGHT.apply(display, button, speed > 0).await?;
        }

        let filename = status.str("print_stats", "filename")?;
        display.set_text("t4.txt", filename).await?;
        self.thumbnail.render(ctx, filename).await?;

        let progress = status.f64("display_status", "progress")? * 100.0;
        let elapsed = status.f64("print_stats", "print_duration")?;
        display.set_number("j0.val", progress as i64).await?;
        display.set_number("n7.val", progress as i64).await?;

        let (elapsed, total) = print_times(elapsed, progress);
        display.set_text("t2.txt", &elapsed).await?;
        display.set_text("t3.txt", &total).await?;
        Ok(None)
    }
}

/// Second print page, toggled from the print dashboard
#[derive(Debug, Default)]
pub struct PrintingDetailPage;

impl PrintingDetailPage {
    const OVERVIEW_BUTTON: u8 = 0;
}

#[async_trait]
impl Page for PrintingDetailPage {
    fn kind(&self) -> PageKind {
        PageKind::PrintingDetail
    }

    fn id(&self) -> u8 {
        12
    }

    fn name(&self) -> &'static str {
        "printing2"
    }

    async fn on_event(
        &mut self,
        _ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        Ok(event.touched_component().and_then(|component| match component {
            Self::OVERVIEW_BUTTON => Some(PageKind::Printing),
            other => nav_target(other),
        }))
    }

    async fn on_status(
        &mut self,
        _ctx: &mut PageContext,
        status: &StatusSnapshot,
    ) -> UiResult<Option<PageKind>> {
        let state = status.str("print_stats", "state")?;
        Ok(follow_print_state(state))
    }
}

/// Paused print: resume or cancel
#[derive(Debug, Default)]
pub struct PausePage;

impl PausePage {
    const RESUME_BUTTON: u8 = 0;
    const CANCEL_BUTTON: u8 = 1;
}

#[async_trait]
impl Page for PausePage {
    fn kind(&self) -> PageKind {
        PageKind::Pause
    }

    fn id(&self) -> u8 {
        10
    }

    fn name(&self) -> &'static str {
        "pause"
    }

    async fn on_event(
        &mut self,
        ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        let Some(component) = event.touched_component() else {
            return Ok(None);
        };
        let next = match component {
            Self::RESUME_BUTTON => {
                ctx.printer.resume_print();
                Some(PageKind::Printing)
            }
            Self::CANCEL_BUTTON => {
                ctx.printer.cancel_print();
                Some(PageKind::Main)
            }
            other => nav_target(other),
        };
        Ok(next)
    }

    async fn on_status(
        &mut self,
        _ctx: &mut PageContext,
        status: &StatusSnapshot,
    ) -> UiResult<Option<PageKind>> {
        let state = status.str("print_stats", "state")?;
        Ok(follow_print_state(state))
    }
}
