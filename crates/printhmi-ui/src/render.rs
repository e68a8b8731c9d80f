//! Rendering helpers shared by the page catalog

use crate::error::UiResult;
use crate::heater::Heater;
use printhmi_communication::TouchDisplay;
use printhmi_core::{StatusError, StatusSnapshot};

/// Time field placeholder while no estimate is available
pub const TIME_PLACEHOLDER: &str = "--:--";

/// A heater is heating when its target is above its temperature
pub fn is_heating(status: &StatusSnapshot, heater: Heater) -> Result<bool, StatusError> {
    let object = heater.status_object();
    Ok(status.f64(object, "target")? > status.f64(object, "temperature")?)
}

/// Current temperature truncated to whole degrees
pub fn temperature(status: &StatusSnapshot, heater: Heater) -> Result<i64, StatusError> {
    Ok(status.f64(heater.status_object(), "temperature")? as i64)
}

/// Target temperature truncated to whole degrees
pub fn target(status: &StatusSnapshot, heater: Heater) -> Result<i64, StatusError> {
    Ok(status.f64(heater.status_object(), "target")? as i64)
}

/// Fan speed as a percentage; a missing fan or speed reads as 0
pub fn fan_percent(status: &StatusSnapshot, object: &str) -> i64 {
    status
        .optional_f64(object, "speed")
        .map(|speed| (speed * 100.0) as i64)
        .unwrap_or(0)
}

/// Format seconds as `HH:MM`
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    format!("{:02}:{:02}", hours, minutes)
}

/// Elapsed and estimated total time fields for a print
///
/// `progress` is a percentage. Both fields show the placeholder until some
/// time has elapsed and some progress was made.
pub fn print_times(elapsed: f64, progress: f64) -> (String, String) {
    if elapsed <= 0.0 || progress <= 0.0 {
        return (TIME_PLACEHOLDER.to_string(), TIME_PLACEHOLDER.to_string());
    }
    let total = elapsed / (progress / 100.0);
    (format_time(elapsed), format_time(total))
}

/// Picture pair used to show an element as on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    /// Picture id when off
    pub regular: i64,
    /// Picture id when on
    pub highlight: i64,
}

impl Highlight {
    /// Create a picture pair
    pub const fn new(regular: i64, highlight: i64) -> Self {
        Self { regular, highlight }
    }

    /// Set the picture of `element`
    pub async fn apply(&self, display: &dyn TouchDisplay, element: &str, on: bool) -> UiResult<()> {
        let picture = if on { self.highlight } else { self.regular };
        display
            .set_number(&format!("{element}.picc"), picture)
            .await?;
        Ok(())
    }
}
