//! Heaters that can be given a target from the keypad

use printhmi_communication::PrinterCommands;

/// A settable heater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heater {
    /// Hotend
    Extruder,
    /// Heated bed
    Bed,
    /// Heated chamber
    Chamber,
}

impl Heater {
    /// Heater name used by `SET_HEATER_TEMPERATURE`
    pub fn name(&self) -> &'static str {
        match self {
            Heater::Extruder => "extruder",
            Heater::Bed => "heater_bed",
            Heater::Chamber => "chamber",
        }
    }

    /// Printer object carrying temperature and target
    pub fn status_object(&self) -> &'static str {
        match self {
            Heater::Extruder => "extruder",
            Heater::Bed => "heater_bed",
            Heater::Chamber => "heater_generic chamber",
        }
    }

    /// Title shown above the keypad
    pub fn title(&self) -> &'static str {
        match self {
            Heater::Extruder => "Extruder",
            Heater::Bed => "Bed",
            Heater::Chamber => "Chamber",
        }
    }

    /// Maximum number of digits accepted by the keypad
    pub fn max_digits(&self) -> i64 {
        match self {
            Heater::Extruder => 3,
            Heater::Bed | Heater::Chamber => 2,
        }
    }
}

type TargetCallback = Box<dyn Fn(i64) + Send + Sync>;

/// Pending keypad request: which heater, and what to do with the value
pub struct HeaterSelection {
    heater: Heater,
    callback: TargetCallback,
}

impl HeaterSelection {
    /// Selection with a custom callback
    pub fn new(heater: Heater, callback: impl Fn(i64) + Send + Sync + 'static) -> Self {
        Self {
            heater,
            callback: Box::new(callback),
        }
    }

    /// Selection that sets the heater target through the printer
    pub fn set_target(heater: Heater, printer: PrinterCommands) -> Self {
        Self::new(heater, move |target| {
            printer.run_macro(
                "SET_HEATER_TEMPERATURE",
                &[("HEATER", heater.name().to_string()), ("TARGET", target.to_string())],
            )
        })
    }

    /// Selected heater
    pub fn heater(&self) -> Heater {
        self.heater
    }

    /// Title shown above the keypad
    pub fn title(&self) -> &'static str {
        self.heater.title()
    }

    /// Maximum number of digits accepted by the keypad
    pub fn max_digits(&self) -> i64 {
        self.heater.max_digits()
    }

    /// Hand the entered value to the callback
    pub fn apply(&self, value: i64) {
        (self.callback)(value)
    }
}

impl std::fmt::Debug for HeaterSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaterSelection")
            .field("heater", &self.heater)
            .finish_non_exhaustive()
    }
}
