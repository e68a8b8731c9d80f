//! Shared state handed to every page hook

use crate::heater::{Heater, HeaterSelection};
use crate::page::PageKind;
use printhmi_communication::{PrinterCommands, TouchDisplay};
use printhmi_core::FileList;
use std::sync::Arc;
use std::time::Duration;

/// Display options that pages need
#[derive(Debug, Clone, PartialEq)]
pub struct UiOptions {
    /// Value the boot page writes to `version.val`
    pub version_marker: i64,
    /// Response timeout for the boot page write
    pub timeout: Duration,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            version_marker: 18,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Context passed to page hooks
///
/// Holds the modal keypad state: at most one pending heater selection and
/// one return page, both cleared when the keypad consumes them.
pub struct PageContext {
    /// Touch display
    pub display: Arc<dyn TouchDisplay>,
    /// Printer command facade
    pub printer: PrinterCommands,
    /// Display options
    pub options: UiOptions,
    /// Latest file list from the host
    pub files: FileList,
    heater_selection: Option<HeaterSelection>,
    return_page: Option<PageKind>,
}

impl PageContext {
    /// Create a context with no pending keypad request
    pub fn new(display: Arc<dyn TouchDisplay>, printer: PrinterCommands, options: UiOptions) -> Self {
        Self {
            display,
            printer,
            options,
            files: FileList::new(),
            heater_selection: None,
            return_page: None,
        }
    }

    /// Prepare the keypad to set `heater`, returning to `from` afterwards
    ///
    /// Returns the page to switch to.
    pub fn open_keypad(&mut self, heater: Heater, from: PageKind) -> PageKind {
        self.heater_selection = Some(HeaterSelection::set_target(heater, self.printer.clone()));
        self.return_page = Some(from);
        PageKind::Keypad
    }

    /// Pending heater selection, if any
    pub fn heater_selection(&self) -> Option<&HeaterSelection> {
        self.heater_selection.as_ref()
    }

    /// Replace the pending heater selection
    pub fn set_heater_selection(&mut self, selection: Option<HeaterSelection>) {
        self.heater_selection = selection;
    }

    /// Consume the pending heater selection
    pub fn take_heater_selection(&mut self) -> Option<HeaterSelection> {
        self.heater_selection.take()
    }

    /// Pending return page, if any
    pub fn return_page(&self) -> Option<PageKind> {
        self.return_page
    }

    /// Consume the pending return page, defaulting to the home page
    pub fn take_return_page(&mut self) -> PageKind {
        self.return_page.take().unwrap_or(PageKind::Main)
    }
}
