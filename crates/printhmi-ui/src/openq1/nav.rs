//! Component ids shared across OpenQ1 pages

use crate::heater::Heater;
use crate::page::PageKind;

pub const NAV_HOME: u8 = 30;
pub const NAV_MOVE: u8 = 31;
pub const NAV_FILES: u8 = 32;
pub const NAV_SETTINGS: u8 = 33;

pub const EXTRUDER_BUTTON: u8 = 21;
pub const BED_BUTTON: u8 = 22;
pub const CHAMBER_BUTTON: u8 = 23;

/// Page behind a bottom navigation bar button
pub fn nav_target(component: u8) -> Option<PageKind> {
    match component {
        NAV_HOME => Some(PageKind::Main),
        NAV_MOVE => Some(PageKind::Move),
        NAV_FILES => Some(PageKind::FileList),
        NAV_SETTINGS => Some(PageKind::Settings),
        _ => None,
    }
}

/// Heater whose temperature button is `component` on the dashboards
pub fn heater_button(component: u8) -> Option<Heater> {
    match component {
        EXTRUDER_BUTTON => Some(Heater::Extruder),
        BED_BUTTON => Some(Heater::Bed),
        CHAMBER_BUTTON => Some(Heater::Chamber),
        _ => None,
    }
}
