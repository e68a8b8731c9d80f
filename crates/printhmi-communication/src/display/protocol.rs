//! TJC / Nextion serial instruction set
//!
//! Instructions are ASCII text terminated by three `0xFF` bytes. Return
//! frames start with a type byte, carry a type-specific payload and end with
//! the same terminator.

use printhmi_core::{DisplayEvent, DisplayEventKind, DisplayValue};

/// Frame terminator
pub const TERMINATOR: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Return code: instruction succeeded
pub const RET_SUCCESS: u8 = 0x01;
/// Return frame: string value
pub const RET_STRING: u8 = 0x70;
/// Return frame: numeric value
pub const RET_NUMBER: u8 = 0x71;
/// Event frame: touch press or release
pub const EVT_TOUCH: u8 = 0x65;
/// Return frame: current page id
pub const RET_CURRENT_PAGE: u8 = 0x66;
/// Event frame: touch coordinate while awake
pub const EVT_TOUCH_COORD: u8 = 0x67;
/// Event frame: touch coordinate while asleep
pub const EVT_TOUCH_COORD_SLEEP: u8 = 0x68;
/// Event frame: display went to sleep
pub const EVT_SLEEP: u8 = 0x86;
/// Event frame: display woke up
pub const EVT_WAKEUP: u8 = 0x87;
/// Event frame: display finished booting
pub const EVT_STARTUP: u8 = 0x88;
/// Event frame: display started an SD card upgrade
pub const EVT_SD_UPGRADE: u8 = 0x89;
/// Highest error return code
pub const RET_ERROR_MAX: u8 = 0x24;

/// Decoded frame received from the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Instruction accepted
    Success,
    /// Instruction rejected with a return code
    Error(u8),
    /// String value
    Text(String),
    /// 32-bit signed value
    Number(i32),
    /// Current page id
    CurrentPage(u8),
    /// Component pressed or released
    Touch {
        /// Page id
        page: u8,
        /// Component id
        component: u8,
        /// True on press, false on release
        pressed: bool,
    },
    /// Raw touch coordinate
    TouchCoordinate {
        /// Horizontal position
        x: u16,
        /// Vertical position
        y: u16,
        /// True on press, false on release
        pressed: bool,
    },
    /// Unsolicited status signal
    Signal(DisplayEventKind),
    /// Anything this decoder does not know
    Unknown(Vec<u8>),
}

impl Frame {
    /// Convert an unsolicited frame into a display event
    ///
    /// Returns `None` for frames that answer an instruction.
    pub fn to_event(&self) -> Option<DisplayEvent> {
        match self {
            Frame::Touch {
                page,
                component,
                pressed,
            } => Some(DisplayEvent::touch(*page, *component, *pressed)),
            Frame::TouchCoordinate { pressed, .. } => Some(DisplayEvent {
                value: Some(i64::from(*pressed)),
                ..DisplayEvent::signal(DisplayEventKind::TouchCoordinate)
            }),
            Frame::Signal(kind) => Some(DisplayEvent::signal(*kind)),
            _ => None,
        }
    }

    /// True for frames that answer an instruction
    pub fn is_response(&self) -> bool {
        self.to_event().is_none()
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frame::Success => write!(f, "success"),
            Frame::Error(code) => write!(f, "error 0x{:02x}", code),
            Frame::Text(text) => write!(f, "text \"{}\"", text),
            Frame::Number(value) => write!(f, "number {}", value),
            Frame::CurrentPage(page) => write!(f, "page {}", page),
            Frame::Touch {
                page,
                component,
                pressed,
            } => write!(f, "touch {}:{} pressed={}", page, component, pressed),
            Frame::TouchCoordinate { x, y, pressed } => {
                write!(f, "touch at ({}, {}) pressed={}", x, y, pressed)
            }
            Frame::Signal(kind) => write!(f, "{}", kind),
            Frame::Unknown(bytes) => write!(f, "unknown {:02x?}", bytes),
        }
    }
}

/// Quote a string for use in an instruction
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Instruction assigning `value` to an attribute path
pub fn set_instruction(path: &str, value: &DisplayValue) -> String {
    match value {
        DisplayValue::Number(n) => format!("{path}={n}"),
        DisplayValue::Text(text) => format!("{path}={}", quote(text)),
    }
}

/// Instruction reading an attribute path
pub fn get_instruction(path: &str) -> String {
    format!("get {path}")
}

/// Encode an instruction with its terminator
pub fn encode(instruction: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(instruction.len() + TERMINATOR.len());
    bytes.extend_from_slice(instruction.as_bytes());
    bytes.extend_from_slice(&TERMINATOR);
    bytes
}

/// Payload length of fixed-size frames, excluding type byte and terminator
fn fixed_payload_len(header: u8) -> Option<usize> {
    match header {
        RET_NUMBER => Some(4),
        EVT_TOUCH => Some(3),
        RET_CURRENT_PAGE => Some(1),
        EVT_TOUCH_COORD | EVT_TOUCH_COORD_SLEEP => Some(5),
        _ => None,
    }
}

fn decode_frame(header: u8, payload: &[u8]) -> Frame {
    match header {
        RET_SUCCESS => Frame::Success,
        code if code <= RET_ERROR_MAX => Frame::Error(code),
        RET_STRING => Frame::Text(String::from_utf8_lossy(payload).into_owned()),
        RET_NUMBER => Frame::Number(i32::from_le_bytes([
            payload[0], payload[1], payload[2], payload[3],
        ])),
        RET_CURRENT_PAGE => Frame::CurrentPage(payload[0]),
        EVT_TOUCH => Frame::Touch {
            page: payload[0],
            component: payload[1],
            pressed: payload[2] != 0,
        },
        EVT_TOUCH_COORD | EVT_TOUCH_COORD_SLEEP => Frame::TouchCoordinate {
            x: u16::from_be_bytes([payload[0], payload[1]]),
            y: u16::from_be_bytes([payload[2], payload[3]]),
            pressed: payload[4] != 0,
        },
        EVT_SLEEP => Frame::Signal(DisplayEventKind::Sleep),
        EVT_WAKEUP => Frame::Signal(DisplayEventKind::Wakeup),
        EVT_STARTUP => Frame::Signal(DisplayEventKind::Startup),
        EVT_SD_UPGRADE => Frame::Signal(DisplayEventKind::SdCardUpgrade),
        _ => {
            let mut bytes = vec![header];
            bytes.extend_from_slice(payload);
            Frame::Unknown(bytes)
        }
    }
}

/// Incremental frame decoder
///
/// Bytes may arrive split at any point. Fixed-size frames are cut by length
/// so payload bytes equal to `0xFF` are not mistaken for the terminator.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes not yet consumed
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all buffered bytes
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Take the next complete frame, if any
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let header = *self.buffer.first()?;

            if let Some(len) = fixed_payload_len(header) {
                let total = 1 + len + TERMINATOR.len();
                if self.buffer.len() < total {
                    return None;
                }
                if self.buffer[1 + len..total] != TERMINATOR {
                    tracing::trace!("Resyncing display stream at 0x{:02x}", header);
                    self.buffer.remove(0);
                    continue;
                }
                let frame = decode_frame(header, &self.buffer[1..1 + len]);
                self.buffer.drain(..total);
                return Some(frame);
            }

            let end = self
                .buffer
                .windows(TERMINATOR.len())
                .position(|window| window == TERMINATOR)?;
            if end == 0 {
                // Stray terminator with no frame in front of it.
                self.buffer.drain(..TERMINATOR.len());
                continue;
            }
            let frame = decode_frame(header, &self.buffer[1..end]);
            self.buffer.drain(..end + TERMINATOR.len());
            return Some(frame);
        }
    }
}
