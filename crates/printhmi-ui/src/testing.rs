//! In-memory display and host used by the page tests

use crate::context::{PageContext, UiOptions};
use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgba};
use parking_lot::Mutex;
use printhmi_communication::{
    command_queue, CommandReceiver, HostCommand, HostTransport, PrinterCommands, ThumbnailFetcher,
    TouchDisplay,
};
use printhmi_core::{DisplayError, DisplayValue, HostError, StatusMap, StatusStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// Display recording every write and instruction
#[derive(Default)]
pub struct FakeDisplay {
    sets: Mutex<Vec<(String, DisplayValue)>>,
    commands: Mutex<Vec<String>>,
    values: Mutex<HashMap<String, DisplayValue>>,
}

impl FakeDisplay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_value(&self, path: &str, value: impl Into<DisplayValue>) {
        self.values.lock().insert(path.to_string(), value.into());
    }

    pub fn sets(&self) -> Vec<(String, DisplayValue)> {
        self.sets.lock().clone()
    }

    /// Last value written to `path`
    pub fn last(&self, path: &str) -> Option<DisplayValue> {
        self.sets
            .lock()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, v)| v.clone())
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    pub fn clear(&self) {
        self.sets.lock().clear();
        self.commands.lock().clear();
    }
}

#[async_trait]
impl TouchDisplay for FakeDisplay {
    async fn get(&self, path: &str) -> printhmi_core::Result<DisplayValue> {
        self.values
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| DisplayError::NotConnected.into())
    }

    async fn set(
        &self,
        path: &str,
        value: DisplayValue,
        _timeout: Option<Duration>,
    ) -> printhmi_core::Result<()> {
        self.sets.lock().push((path.to_string(), value));
        Ok(())
    }

    async fn command(&self, instruction: &str) -> printhmi_core::Result<()> {
        self.commands.lock().push(instruction.to_string());
        Ok(())
    }
}

/// Host serving one thumbnail for every file
#[derive(Default)]
pub struct FakeHost {
    pub calls: Mutex<Vec<String>>,
    pub fetches: Mutex<Vec<String>>,
}

#[async_trait]
impl HostTransport for FakeHost {
    async fn connect(&self) -> printhmi_core::Result<()> {
        Ok(())
    }

    async fn disconnect(&self) -> printhmi_core::Result<()> {
        Ok(())
    }

    async fn call(&self, method: &str, params: Value) -> printhmi_core::Result<Value> {
        self.calls.lock().push(method.to_string());
        match method {
            "server.files.thumbnails" => {
                let filename = params["filename"].as_str().unwrap_or_default();
                Ok(json!([{
                    "width": 160,
                    "height": 160,
                    "size": 1024,
                    "thumbnail_path": format!(".thumbs/{filename}-160x160.png")
                }]))
            }
            _ => Err(HostError::Rpc {
                method: method.to_string(),
                code: -32601,
                message: "Method not found".to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl ThumbnailFetcher for FakeHost {
    async fn fetch(&self, thumbnail_path: &str) -> printhmi_core::Result<Vec<u8>> {
        self.fetches.lock().push(thumbnail_path.to_string());
        let image = ImageBuffer::from_pixel(4, 4, Rgba([255u8, 0, 0, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| printhmi_core::Error::other(e.to_string()))?;
        Ok(bytes.into_inner())
    }
}

/// Context over `display` with a fresh command queue and an empty store
pub fn fake_context(display: Arc<FakeDisplay>) -> (PageContext, CommandReceiver) {
    let (ctx, rx, _) = fake_context_with_status(display, StatusMap::new());
    (ctx, rx)
}

/// Context whose status store starts as `status`
pub fn fake_context_with_status(
    display: Arc<FakeDisplay>,
    status: StatusMap,
) -> (PageContext, CommandReceiver, Arc<FakeHost>) {
    let (queue, rx) = command_queue();
    let host = Arc::new(FakeHost::default());
    let store = StatusStore::shared();
    store.write().replace(status);
    let printer = PrinterCommands::new(
        queue,
        Arc::clone(&host) as Arc<dyn HostTransport>,
        store,
        Arc::clone(&host) as Arc<dyn ThumbnailFetcher>,
    );
    let ctx = PageContext::new(display, printer, UiOptions::default());
    (ctx, rx, host)
}

/// Drain queued commands
pub fn drain(rx: &mut CommandReceiver) -> Vec<HostCommand> {
    let mut out = Vec::new();
    while let Ok(command) = rx.try_recv() {
        out.push(command);
    }
    out
}
