//! Numeric keypad for heater targets
//!
//! Opened by a dashboard after it stored a heater selection and its own page
//! as the return page. Both are consumed when the keypad closes.

use crate::context::PageContext;
use crate::error::{UiError, UiResult};
use crate::page::{Page, PageKind};
use async_trait::async_trait;
use printhmi_core::{DisplayEvent, DisplayValue};

const DEFAULT_MAX_DIGITS: i64 = 3;

/// Parse the text entered on the keypad
pub fn parse_entry(value: &DisplayValue) -> UiResult<i64> {
    match value {
        DisplayValue::Number(n) => Ok(*n),
        DisplayValue::Text(text) => text.trim().parse().map_err(|_| UiError::InvalidInput {
            input: text.clone(),
        }),
    }
}

#[derive(Debug, Default)]
pub struct KeypadPage;

impl KeypadPage {
    const CONFIRM_BUTTON: u8 = 31;
    const CANCEL_BUTTON: u8 = 32;
}

#[async_trait]
impl Page for KeypadPage {
    fn kind(&self) -> PageKind {
        PageKind::Keypad
    }

    fn id(&self) -> u8 {
        9
    }

    fn name(&self) -> &'static str {
        "keybdB"
    }

    async fn on_enter(&mut self, ctx: &mut PageContext) -> UiResult<()> {
        let (title, max_digits) = match ctx.heater_selection() {
            Some(selection) => (selection.title(), selection.max_digits()),
            None => ("", DEFAULT_MAX_DIGITS),
        };
        ctx.display.set_text("show.txt", "").await?;
        ctx.display.set_text("t100.txt", title).await?;
        ctx.display.set_number("inputlenth.val", max_digits).await?;
        Ok(())
    }

    async fn on_event(
        &mut self,
        ctx: &mut PageContext,
        event: &DisplayEvent,
    ) -> UiResult<Option<PageKind>> {
        match event.touched_component() {
            Some(Self::CANCEL_BUTTON) => {
                ctx.take_heater_selection();
                Ok(Some(ctx.take_return_page()))
            }
            Some(Self::CONFIRM_BUTTON) => {
                let value = parse_entry(&ctx.display.get("input.txt").await?)?;
                match ctx.take_heater_selection() {
                    Some(selection) => {
                        tracing::info!("Setting {} target to {}", selection.title(), value);
                        selection.apply(value);
                    }
                    None => tracing::warn!("Keypad confirmed {} with no heater selected", value),
                }
                Ok(Some(ctx.take_return_page()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heater::Heater;
    use crate::testing::{drain, fake_context, FakeDisplay};
    use printhmi_communication::HostCommand;
    use std::sync::Arc;

    #[test]
    fn test_parse_entry() {
        assert_eq!(parse_entry(&DisplayValue::from(" 215 ")).unwrap(), 215);
        assert_eq!(parse_entry(&DisplayValue::from(60i64)).unwrap(), 60);
        assert!(matches!(
            parse_entry(&DisplayValue::from("")),
            Err(UiError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_enter_without_selection_shows_empty_title() {
        let display = FakeDisplay::new();
        let (mut ctx, _rx) = fake_context(Arc::clone(&display));

        KeypadPage.on_enter(&mut ctx).await.unwrap();

        assert_eq!(display.last("t100.txt"), Some(DisplayValue::from("")));
        assert_eq!(display.last("inputlenth.val"), Some(DisplayValue::from(3i64)));
    }

    #[tokio::test]
    async fn test_enter_shows_selected_heater() {
        let display = FakeDisplay::new();
        let (mut ctx, _rx) = fake_context(Arc::clone(&display));
        ctx.open_keypad(Heater::Bed, PageKind::Main);

        KeypadPage.on_enter(&mut ctx).await.unwrap();

        assert_eq!(display.last("t100.txt"), Some(DisplayValue::from("Bed")));
        assert_eq!(display.last("inputlenth.val"), Some(DisplayValue::from(2i64)));
    }

    #[tokio::test]
    async fn test_confirm_sets_target_and_returns() {
        let display = FakeDisplay::new();
        display.with_value("input.txt", "215");
        let (mut ctx, mut rx) = fake_context(Arc::clone(&display));
        ctx.open_keypad(Heater::Extruder, PageKind::Printing);

        let next = KeypadPage
            .on_event(&mut ctx, &DisplayEvent::touch(9, 31, true))
            .await
            .unwrap();

        assert_eq!(next, Some(PageKind::Printing));
        assert!(ctx.heater_selection().is_none());
        assert_eq!(ctx.return_page(), None);
        assert_eq!(
            drain(&mut rx),
            vec![HostCommand::Gcode(
                "SET_HEATER_TEMPERATURE HEATER=extruder TARGET=215".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_cancel_clears_context() {
        let display = FakeDisplay::new();
        let (mut ctx, mut rx) = fake_context(display);
        ctx.open_keypad(Heater::Chamber, PageKind::Main);

        let next = KeypadPage
            .on_event(&mut ctx, &DisplayEvent::touch(9, 32, true))
            .await
            .unwrap();

        assert_eq!(next, Some(PageKind::Main));
        assert!(ctx.heater_selection().is_none());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_entry_stays_on_keypad() {
        let display = FakeDisplay::new();
        display.with_value("input.txt", "");
        let (mut ctx, mut rx) = fake_context(Arc::clone(&display));
        ctx.open_keypad(Heater::Bed, PageKind::Main);

        let result = KeypadPage
            .on_event(&mut ctx, &DisplayEvent::touch(9, 31, true))
            .await;

        assert!(matches!(result, Err(UiError::InvalidInput { .. })));
        assert!(ctx.heater_selection().is_some());
        assert_eq!(ctx.return_page(), Some(PageKind::Main));
        assert!(drain(&mut rx).is_empty());
    }
}
