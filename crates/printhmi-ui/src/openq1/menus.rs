//! Boot screen and the menu pages

use super::nav::nav_target;
use crate::context::PageContext;
use crate::error::UiResult;
use crate::page::{Page, PageKind};
use async_trait::async_trait;
use printhmi_core::{DisplayEvent, DisplayValue};

/// Splash screen
#[derive(Debug, Default)]
pub struct BootPage;

#[async_trait]
impl Page for BootPage {
    fn kind(&self) -> PageKind {
        PageKind::Boot
    }

    fn id(&self) -> u8 {
        0
    }

    fn name(&self) -> &'static str {
        "logo"
    }

    async fn on_enter(&mut self, ctx: &mut PageContext) -> UiResult<()> {
        ctx.display
            .set(
                "version.val",
                DisplayValue::Number(ctx.options.version_marker),
                Some(ctx.options.timeout),
            )
            .await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FileListPage;

#[async_trait]
impl Page for FileListPage {
    fn kind(&self) -> PageKind {
        PageKind::FileList
    }

    fn id(&self) -> u8 {
        4
    }

    fn name(&self) -> &'static str {
        "filelist"
    }

    async fn on_enter(&mut self, ctx: &mut PageContext) -> UiResult<()> {
        tracing::debug!("File list has {} entries", ctx.files.len());
        Ok(())
    }

    async fn on_event(
        &mut self,
        _ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        Ok(event.touched_component().and_then(nav_target))
    }
}

#[derive(Debug, Default)]
pub struct SettingsPage;

impl SettingsPage {
    const LANGUAGE_BUTTON: u8 = 0;
    const CALIBRATION_BUTTON: u8 = 22;
}

#[async_trait]
impl Page for SettingsPage {
    fn kind(&self) -> PageKind {
        PageKind::Settings
    }

    fn id(&self) -> u8 {
        45
    }

    fn name(&self) -> &'static str {
        "common_set"
    }

    async fn on_event(
        &mut self,
        _ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        Ok(event.touched_component().and_then(|component| match component {
            Self::LANGUAGE_BUTTON => Some(PageKind::Language),
            Self::CALIBRATION_BUTTON => Some(PageKind::Calibration),
            other => nav_target(other),
        }))
    }
}

#[derive(Debug, Default)]
pub struct LanguagePage;

#[async_trait]
impl Page for LanguagePage {
    fn kind(&self) -> PageKind {
        PageKind::Language
    }

    fn id(&self) -> u8 {
        46
    }

    fn name(&self) -> &'static str {
        "language"
    }

    async fn on_event(
        &mut self,
        _ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        Ok(event.touched_component().and_then(|component| match component {
            0 => Some(PageKind::Settings),
            other => nav_target(other),
        }))
    }
}

/// Bed levelling
#[derive(Debug, Default)]
pub struct CalibrationPage;

#[async_trait]
impl Page for CalibrationPage {
    fn kind(&self) -> PageKind {
        PageKind::Calibration
    }

    fn id(&self) -> u8 {
        27
    }

    fn name(&self) -> &'static str {
        "level_mode"
    }

    async fn on_event(
        &mut self,
        _ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        Ok(event.touched_component().and_then(|component| match component {
            23 => Some(PageKind::Settings),
            other => nav_target(other),
        }))
    }
}

/// Shown when the firmware shut down; offers host and firmware restarts
#[derive(Debug, Default)]
pub struct ResetPage;

impl ResetPage {
    const BACK_BUTTON: u8 = 0;
    const RESTART_BUTTON: u8 = 2;
    const FIRMWARE_RESTART_BUTTON: u8 = 3;
}

#[async_trait]
impl Page for ResetPage {
    fn kind(&self) -> PageKind {
        PageKind::Reset
    }

    fn id(&self) -> u8 {
        48
    }

    fn name(&self) -> &'static str {
        "reset"
    }

    async fn on_event(
        &mut self,
        ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        let Some(component) = event.touched_component() else {
            return Ok(None);
        };
        tracing::info!("Reset: {}", event);
        let next = match component {
            Self::BACK_BUTTON => Some(PageKind::Main),
            Self::RESTART_BUTTON => {
                ctx.printer.restart();
                None
            }
            Self::FIRMWARE_RESTART_BUTTON => {
                ctx.printer.firmware_restart();
                None
            }
            other => nav_target(other),
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{drain, fake_context, FakeDisplay};
    use printhmi_communication::HostCommand;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_boot_writes_version_marker() {
        let display = FakeDisplay::new();
        let (mut ctx, _rx) = fake_context(Arc::clone(&display));
        ctx.options.version_marker = 21;

        BootPage.on_enter(&mut ctx).await.unwrap();

        assert_eq!(display.sets(), vec![("version.val".to_string(), DisplayValue::Number(21))]);
    }

    #[tokio::test]
    async fn test_settings_routes() {
        let display = FakeDisplay::new();
        let (mut ctx, _rx) = fake_context(display);
        let mut page = SettingsPage;

        for (component, expected) in [
            (0, Some(PageKind::Language)),
            (22, Some(PageKind::Calibration)),
            (31, Some(PageKind::Move)),
            (5, None),
        ] {
            let next = page
                .on_event(&mut ctx, &DisplayEvent::touch(45, component, true))
                .await
                .unwrap();
            assert_eq!(next, expected, "component {}", component);
        }
    }

    #[tokio::test]
    async fn test_reset_actions() {
        let display = FakeDisplay::new();
        let (mut ctx, mut rx) = fake_context(display);
        let mut page = ResetPage;

        for component in [2, 3] {
            let next = page
                .on_event(&mut ctx, &DisplayEvent::touch(48, component, true))
                .await
                .unwrap();
            assert_eq!(next, None);
        }
        assert_eq!(
            drain(&mut rx),
            vec![HostCommand::Restart, HostCommand::FirmwareRestart]
        );

        let next = page
            .on_event(&mut ctx, &DisplayEvent::touch(48, 0, true))
            .await
            .unwrap();
        assert_eq!(next, Some(PageKind::Main));
    }

    #[tokio::test]
    async fn test_back_buttons() {
        let display = FakeDisplay::new();
        let (mut ctx, _rx) = fake_context(display);

        let next = LanguagePage
            .on_event(&mut ctx, &DisplayEvent::touch(46, 0, true))
            .await
            .unwrap();
        assert_eq!(next, Some(PageKind::Settings));

        let next = CalibrationPage
            .on_event(&mut ctx, &DisplayEvent::touch(27, 23, true))
            .await
            .unwrap();
        assert_eq!(next, Some(PageKind::Settings));

        let next = FileListPage
            .on_event(&mut ctx, &DisplayEvent::touch(4, 30, true))
            .await
            .unwrap();
        assert_eq!(next, Some(PageKind::Main));
    }
}
