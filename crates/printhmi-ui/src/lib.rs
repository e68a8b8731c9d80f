//! # printhmi UI
//!
//! Page state machine and the page catalogs driving a touch display.
//!
//! Pages share one [`PageContext`] that carries the display, the printer
//! command facade and the modal keypad state. A catalog is picked by key
//! from the configuration.

pub mod context;
pub mod error;
pub mod heater;
pub mod listener;
pub mod machine;
pub mod openq1;
pub mod page;
pub mod render;
pub mod thumbnail;

#[cfg(test)]
mod testing;

pub use context::{PageContext, UiOptions};
pub use error::{UiError, UiResult};
pub use heater::{Heater, HeaterSelection};
pub use listener::HmiListener;
pub use machine::PageMachine;
pub use page::{Page, PageKind};

use printhmi_core::SubscriptionSet;

/// Catalog keys accepted by [`build_ui`]
pub const UI_KEYS: &[&str] = &[openq1::KEY];

/// Build the UI registered under `key`
pub fn build_ui(key: &str, context: PageContext) -> UiResult<Box<dyn HmiListener>> {
    match key {
        openq1::KEY => Ok(Box::new(openq1::OpenQ1Ui::new(context))),
        other => Err(UiError::UnknownUi(other.to_string())),
    }
}

/// Printer objects the UI registered under `key` subscribes to
pub fn printer_objects(key: &str) -> UiResult<SubscriptionSet> {
    match key {
        openq1::KEY => Ok(openq1::printer_objects()),
        other => Err(UiError::UnknownUi(other.to_string())),
    }
}
