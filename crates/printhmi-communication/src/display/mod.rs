//! Serial touch display link
//!
//! The UI addresses display components by attribute path (`n0.val`,
//! `t0.txt`) and sends raw instructions (`page main`, `vis cp0,1`).

pub mod protocol;
pub mod tjc;

pub use protocol::{Frame, FrameDecoder};
pub use tjc::{TjcDisplay, TjcParams};

use async_trait::async_trait;
use printhmi_core::{DisplayEvent, DisplayValue, Result};
use std::time::Duration;
use tokio::sync::mpsc;

/// Sending half of a display event channel
pub type DisplayEventSender = mpsc::UnboundedSender<DisplayEvent>;

/// Receiving half of a display event channel
pub type DisplayEventReceiver = mpsc::UnboundedReceiver<DisplayEvent>;

/// Create a display event channel
pub fn display_event_channel() -> (DisplayEventSender, DisplayEventReceiver) {
    mpsc::unbounded_channel()
}

/// Attribute and instruction access to a touch display
#[async_trait]
pub trait TouchDisplay: Send + Sync {
    /// Read an attribute
    async fn get(&self, path: &str) -> Result<DisplayValue>;

    /// Write an attribute, optionally with a non-default response timeout
    async fn set(&self, path: &str, value: DisplayValue, timeout: Option<Duration>) -> Result<()>;

    /// Send a raw instruction
    async fn command(&self, instruction: &str) -> Result<()>;

    /// Write a numeric attribute
    async fn set_number(&self, path: &str, value: i64) -> Result<()> {
        self.set(path, DisplayValue::Number(value), None).await
    }

    /// Write a text attribute
    async fn set_text(&self, path: &str, value: &str) -> Result<()> {
        self.set(path, DisplayValue::from(value), None).await
    }
}
