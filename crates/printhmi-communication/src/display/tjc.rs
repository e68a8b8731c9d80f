//! TJC / Nextion display over a serial port
//!
//! Responses carry no request id, so outstanding instructions are matched
//! to return frames in FIFO order. A request that times out keeps its queue
//! slot so the late reply cannot be taken by the next request. Serial writes
//! run on the blocking pool; a blocking reader thread decodes frames,
//! forwards events and reopens the port after a fault.

use super::protocol::{self, Frame, FrameDecoder};
use super::{DisplayEventSender, TouchDisplay};
use async_trait::async_trait;
use parking_lot::Mutex;
use printhmi_core::{
    ConnectionError, DisplayError, DisplayEvent, DisplayEventKind, DisplayValue, Error, Result,
};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Read timeout of the serial port; bounds how long the reader takes to notice shutdown
const READ_POLL: Duration = Duration::from_millis(50);

/// Serial parameters of the display link
#[derive(Debug, Clone, PartialEq)]
pub struct TjcParams {
    /// Serial device path
    pub device: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Default response timeout per instruction
    pub timeout: Duration,
    /// Pause between reopen attempts after a fault
    pub reconnect_interval: Duration,
}

impl Default for TjcParams {
    fn default() -> Self {
        Self {
            device: "/dev/ttyS1".to_string(),
            baud_rate: 115_200,
            timeout: Duration::from_secs(1),
            reconnect_interval: Duration::from_secs(2),
        }
    }
}

/// Outstanding instruction; `reply` is `None` once the caller gave up on it
struct Pending {
    id: u64,
    reply: Option<oneshot::Sender<Frame>>,
}

struct Shared {
    params: TjcParams,
    writer: Mutex<Option<Box<dyn Write + Send>>>,
    write_order: tokio::sync::Mutex<()>,
    pending: Mutex<VecDeque<Pending>>,
    next_id: AtomicU64,
    running: AtomicBool,
    events: DisplayEventSender,
}

impl Shared {
    fn open(&self) -> Result<Box<dyn serialport::SerialPort>> {
        let serial_error = |e: serialport::Error| ConnectionError::SerialError {
            reason: format!("{}: {}", self.params.device, e),
        };
        let port = serialport::new(&self.params.device, self.params.baud_rate)
            .timeout(READ_POLL)
            .open()
            .map_err(serial_error)?;
        let reader = port.try_clone().map_err(serial_error)?;
        *self.writer.lock() = Some(Box::new(port));
        tracing::info!(
            "Opened display on {} at {} baud",
            self.params.device,
            self.params.baud_rate
        );
        Ok(reader)
    }

    fn write_instruction(&self, instruction: &str) -> Result<()> {
        let mut writer = self.writer.lock();
        let port = writer.as_mut().ok_or(DisplayError::NotConnected)?;
        port.write_all(&protocol::encode(instruction))
            .and_then(|_| port.flush())
            .map_err(|e| ConnectionError::SerialError {
                reason: e.to_string(),
            })?;
        tracing::trace!("Display <- {}", instruction);
        Ok(())
    }

    fn dispatch(&self, frame: Frame) {
        if let Some(event) = frame.to_event() {
            tracing::debug!("Display event {}", event);
            self.emit(event);
            return;
        }
        match self.pending.lock().pop_front() {
            Some(Pending {
                reply: Some(reply), ..
            }) => {
                let _ = reply.send(frame);
            }
            Some(Pending { id, reply: None }) => {
                tracing::debug!("Late reply to abandoned request {}: {}", id, frame)
            }
            None => tracing::debug!("Unsolicited display frame: {}", frame),
        }
    }

    fn emit(&self, event: DisplayEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Display event receiver dropped");
        }
    }

    fn fail_pending(&self) {
        // Dropping the reply senders wakes the waiting callers.
        self.pending.lock().clear();
    }

    /// Reopen the port until it succeeds or the display is closed
    fn reopen(&self) -> Option<Box<dyn serialport::SerialPort>> {
        while self.running.load(Ordering::SeqCst) {
            std::thread::sleep(self.params.reconnect_interval);
            match self.open() {
                Ok(reader) => return Some(reader),
                Err(e) => tracing::warn!("Display reopen failed: {}", e),
            }
        }
        None
    }
}

fn read_loop(shared: Arc<Shared>, mut port: Box<dyn serialport::SerialPort>) {
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 256];

    while shared.running.load(Ordering::SeqCst) {
        match port.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                decoder.push(&buf[..n]);
                while let Some(frame) = decoder.next_frame() {
                    shared.dispatch(frame);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => {
                tracing::warn!("Display link fault on {}: {}", shared.params.device, e);
                shared.writer.lock().take();
                shared.fail_pending();
                decoder.clear();
                match shared.reopen() {
                    Some(reader) => {
                        port = reader;
                        shared.emit(DisplayEvent::signal(DisplayEventKind::Reconnected));
                    }
                    None => break,
                }
            }
        }
    }
    tracing::debug!("Display reader stopped");
}

/// TJC / Nextion display
pub struct TjcDisplay {
    shared: Arc<Shared>,
}

impl TjcDisplay {
    /// Create a display reporting events on `events`
    pub fn new(params: TjcParams, events: DisplayEventSender) -> Self {
        Self {
            shared: Arc::new(Shared {
                params,
                writer: Mutex::new(None),
                write_order: tokio::sync::Mutex::new(()),
                pending: Mutex::new(VecDeque::new()),
                next_id: AtomicU64::new(1),
                running: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Serial parameters
    pub fn params(&self) -> &TjcParams {
        &self.shared.params
    }

    /// Open the port, start the reader and enable success acknowledgements
    pub async fn connect(&self) -> Result<()> {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let reader = match self.shared.open() {
            Ok(reader) => reader,
            Err(e) => {
                self.shared.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        let shared = Arc::clone(&self.shared);
        std::thread::Builder::new()
            .name("tjc-reader".to_string())
            .spawn(move || read_loop(shared, reader))
            .map_err(Error::Io)?;

        // The answer to this one arrives before acks are on, so it is not awaited.
        self.shared.write_instruction("bkcmd=3")?;
        Ok(())
    }

    /// Wake the display from sleep
    pub async fn wakeup(&self) -> Result<()> {
        self.command("sleep=0").await
    }

    /// Stop the reader and close the port
    pub fn close(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.writer.lock().take();
        self.shared.fail_pending();
    }

    async fn request(&self, instruction: &str, timeout: Duration) -> Result<Frame> {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        // Queue entries and serial writes must keep the same order.
        let order = self.shared.write_order.lock().await;
        self.shared.pending.lock().push_back(Pending {
            id,
            reply: Some(tx),
        });
        let shared = Arc::clone(&self.shared);
        let owned = instruction.to_string();
        let written = tokio::task::spawn_blocking(move || shared.write_instruction(&owned))
            .await
            .map_err(|e| Error::other(format!("display writer failed: {e}")))
            .and_then(|written| written);
        if let Err(e) = written {
            self.shared.pending.lock().retain(|pending| pending.id != id);
            return Err(e);
        }
        drop(order);

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(frame)) => Ok(frame),
            Ok(Err(_)) => Err(DisplayError::NotConnected.into()),
            Err(_) => {
                // The display still answers eventually; leave the slot to absorb it.
                if let Some(pending) = self
                    .shared
                    .pending
                    .lock()
                    .iter_mut()
                    .find(|pending| pending.id == id)
                {
                    pending.reply = None;
                }
                Err(DisplayError::Timeout {
                    instruction: instruction.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into())
            }
        }
    }

    async fn execute(&self, instruction: &str, timeout: Duration) -> Result<()> {
        match self.request(instruction, timeout).await? {
            Frame::Success => Ok(()),
            Frame::Error(code) => Err(DisplayError::Rejected {
                instruction: instruction.to_string(),
                code,
            }
            .into()),
            other => Err(DisplayError::UnexpectedResponse {
                instruction: instruction.to_string(),
                frame: other.to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl TouchDisplay for TjcDisplay {
    async fn get(&self, path: &str) -> Result<DisplayValue> {
        let instruction = protocol::get_instruction(path);
        match self.request(&instruction, self.shared.params.timeout).await? {
            Frame::Text(text) => Ok(DisplayValue::Text(text)),
            Frame::Number(value) => Ok(DisplayValue::Number(i64::from(value))),
            Frame::Error(code) => Err(DisplayError::Rejected { instruction, code }.into()),
            other => Err(DisplayError::UnexpectedResponse {
                instruction,
                frame: other.to_string(),
            }
            .into()),
        }
    }

    async fn set(&self, path: &str, value: DisplayValue, timeout: Option<Duration>) -> Result<()> {
        let instruction = protocol::set_instruction(path, &value);
        self.execute(&instruction, timeout.unwrap_or(self.shared.params.timeout))
            .await
    }

    async fn command(&self, instruction: &str) -> Result<()> {
        self.execute(instruction, self.shared.params.timeout).await
    }
}

impl Drop for TjcDisplay {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
    }
}
