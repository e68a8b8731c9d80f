//! Values and events exchanged with the touch display

use std::fmt;

/// Value of a display property
///
/// Numeric properties (`.val`, `.picc`) take numbers, text properties
/// (`.txt`) take strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayValue {
    /// Integer property value
    Number(i64),
    /// Text property value
    Text(String),
}

impl DisplayValue {
    /// Numeric content, if this is a number
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DisplayValue::Number(n) => Some(*n),
            DisplayValue::Text(_) => None,
        }
    }

    /// Text content, if this is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DisplayValue::Number(_) => None,
            DisplayValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(n) => write!(f, "{}", n),
            DisplayValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for DisplayValue {
    fn from(n: i64) -> Self {
        DisplayValue::Number(n)
    }
}

impl From<i32> for DisplayValue {
    fn from(n: i32) -> Self {
        DisplayValue::Number(n.into())
    }
}

impl From<&str> for DisplayValue {
    fn from(s: &str) -> Self {
        DisplayValue::Text(s.to_string())
    }
}

impl From<String> for DisplayValue {
    fn from(s: String) -> Self {
        DisplayValue::Text(s)
    }
}

/// Kind of event reported by the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayEventKind {
    /// A component was pressed or released
    Touch,
    /// Raw touch coordinates
    TouchCoordinate,
    /// The display went to sleep
    Sleep,
    /// The display woke up
    Wakeup,
    /// The display finished booting
    Startup,
    /// The display started a firmware upgrade from SD card
    SdCardUpgrade,
    /// The serial link was re-established after a fault
    Reconnected,
}

impl fmt::Display for DisplayEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayEventKind::Touch => "touch",
            DisplayEventKind::TouchCoordinate => "touch-coordinate",
            DisplayEventKind::Sleep => "sleep",
            DisplayEventKind::Wakeup => "wakeup",
            DisplayEventKind::Startup => "startup",
            DisplayEventKind::SdCardUpgrade => "sd-card-upgrade",
            DisplayEventKind::Reconnected => "reconnected",
        };
        f.write_str(name)
    }
}

/// Event received from the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEvent {
    /// What happened
    pub kind: DisplayEventKind,
    /// Page the display was showing, when reported
    pub page_id: u8,
    /// Component that was touched, 0 for events without one
    pub component_id: u8,
    /// Extra payload (press/release flag for touches)
    pub value: Option<i64>,
}

impl DisplayEvent {
    /// A touch on a component; `pressed` is false on release
    pub fn touch(page_id: u8, component_id: u8, pressed: bool) -> Self {
        Self {
            kind: DisplayEventKind::Touch,
            page_id,
            component_id,
            value: Some(i64::from(pressed)),
        }
    }

    /// An event that carries no component
    pub fn signal(kind: DisplayEventKind) -> Self {
        Self {
            kind,
            page_id: 0,
            component_id: 0,
            value: None,
        }
    }

    /// Component id if this is a touch event
    pub fn touched_component(&self) -> Option<u8> {
        (self.kind == DisplayEventKind::Touch).then_some(self.component_id)
    }
}

impl fmt::Display for DisplayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DisplayEventKind::Touch => write!(
                f,
                "touch page={} component={} value={:?}",
                self.page_id, self.component_id, self.value
            ),
            kind => write!(f, "{}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touched_component() {
        assert_eq!(DisplayEvent::touch(3, 21, true).touched_component(), Some(21));
        assert_eq!(
            DisplayEvent::signal(DisplayEventKind::Wakeup).touched_component(),
            None
        );
    }

    #[test]
    fn test_display_value_accessors() {
        assert_eq!(DisplayValue::from(42i64).as_i64(), Some(42));
        assert_eq!(DisplayValue::from("210").as_str(), Some("210"));
        assert_eq!(DisplayValue::from("210").as_i64(), None);
    }
}
