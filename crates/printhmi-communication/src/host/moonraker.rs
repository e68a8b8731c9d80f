//! Moonraker websocket JSON-RPC client
//!
//! Keeps one websocket open to the Moonraker API server, correlates
//! responses to calls by request id and forwards notifications and
//! lifecycle changes on the transport event channel. A dropped socket is
//! reopened after the reconnect interval until `disconnect` is called.

use super::{HostTransport, TransportEvent, TransportEventSender, TransportState};
use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use printhmi_core::{ConnectionError, HostError, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type Reply = oneshot::Sender<Result<Value>>;

/// Connection parameters for a Moonraker host
#[derive(Debug, Clone, PartialEq)]
pub struct MoonrakerParams {
    /// Host name or address, optionally with an `http://` or `https://` scheme
    pub host: String,
    /// API port
    pub port: u16,
    /// Sent as `X-Api-Key` when set
    pub api_key: Option<String>,
    /// Limit for one connection attempt
    pub connect_timeout: Duration,
    /// Limit for one RPC call
    pub call_timeout: Duration,
    /// Pause between reconnect attempts
    pub reconnect_interval: Duration,
}

impl Default for MoonrakerParams {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 7125,
            api_key: None,
            connect_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(10),
            reconnect_interval: Duration::from_secs(2),
        }
    }
}

impl MoonrakerParams {
    /// Base URL for plain HTTP requests such as file downloads
    ///
    /// A host given with a scheme is used as is, otherwise `http://host:port`.
    pub fn http_base_url(&self) -> Result<Url> {
        let raw = if has_scheme(&self.host) {
            self.host.clone()
        } else {
            format!("http://{}:{}", self.host, self.port)
        };
        Url::parse(&raw).map_err(|e| {
            ConnectionError::InvalidEndpoint {
                endpoint: raw.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Websocket endpoint of the JSON-RPC API
    pub fn websocket_url(&self) -> Result<Url> {
        let mut url = self.http_base_url()?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|_| ConnectionError::InvalidEndpoint {
            endpoint: url.to_string(),
            reason: format!("cannot use scheme {scheme}"),
        })?;
        url.set_path("/websocket");
        Ok(url)
    }
}

fn has_scheme(host: &str) -> bool {
    host.starts_with("http://") || host.starts_with("https://")
}

struct Shared {
    params: MoonrakerParams,
    events: TransportEventSender,
    sink: tokio::sync::Mutex<Option<WsSink>>,
    pending: Mutex<HashMap<u64, (String, Reply)>>,
    next_id: AtomicU64,
    running: AtomicBool,
}

impl Shared {
    fn emit_state(&self, state: TransportState) {
        tracing::debug!("Moonraker transport {}", state);
        if self.events.send(TransportEvent::StateChanged(state)).is_err() {
            tracing::trace!("Transport event receiver dropped");
        }
    }

    fn fail_pending(&self, reason: &str) {
        let drained: Vec<_> = self.pending.lock().drain().collect();
        for (_, (_, reply)) in drained {
            let _ = reply.send(Err(ConnectionError::ConnectionLost {
                reason: reason.to_string(),
            }
            .into()));
        }
    }

    fn handle_text(&self, text: &str) {
        let message: Value = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Discarding malformed Moonraker message: {}", e);
                return;
            }
        };

        if let Some(id) = message.get("id").and_then(Value::as_u64) {
            let Some((method, reply)) = self.pending.lock().remove(&id) else {
                tracing::debug!("Response for unknown request id {}", id);
                return;
            };
            let _ = reply.send(parse_response(&method, &message));
            return;
        }

        if let Some(method) = message.get("method").and_then(Value::as_str) {
            let params = match message.get("params") {
                Some(Value::Array(params)) => params.clone(),
                Some(other) => vec![other.clone()],
                None => Vec::new(),
            };
            let event = TransportEvent::Notification {
                method: method.to_string(),
                params,
            };
            if self.events.send(event).is_err() {
                tracing::trace!("Transport event receiver dropped");
            }
        }
    }
}

fn parse_response(method: &str, message: &Value) -> Result<Value> {
    if let Some(error) = message.get("error") {
        return Err(HostError::Rpc {
            method: method.to_string(),
            code: error.get("code").and_then(Value::as_i64).unwrap_or(-1),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        }
        .into());
    }
    message
        .get("result")
        .cloned()
        .ok_or_else(|| {
            HostError::InvalidResponse {
                method: method.to_string(),
                reason: "response has neither result nor error".to_string(),
            }
            .into()
        })
}

/// Build the JSON-RPC request frame for a call
fn request_frame(id: u64, method: &str, params: Value) -> Value {
    let mut request = json!({
        "jsonrpc": "2.0",
        "method": method,
        "id": id,
    });
    if !params.is_null() {
        request["params"] = params;
    }
    request
}

async fn connection_loop(shared: Arc<Shared>) {
    while shared.running.load(Ordering::SeqCst) {
        shared.emit_state(TransportState::Connecting);

        match open_socket(&shared.params).await {
            Ok(stream) => {
                let (sink, mut reader) = stream.split();
                *shared.sink.lock().await = Some(sink);
                tracing::info!("Connected to Moonraker at {}:{}", shared.params.host, shared.params.port);
                shared.emit_state(TransportState::Connected);

                while let Some(message) = reader.next().await {
                    match message {
                        Ok(Message::Text(text)) => shared.handle_text(&text),
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!("Moonraker websocket error: {}", e);
                            break;
                        }
                    }
                }

                shared.sink.lock().await.take();
                shared.fail_pending("websocket closed");
                if shared.running.load(Ordering::SeqCst) {
                    tracing::warn!("Moonraker connection lost, reconnecting");
                    shared.emit_state(TransportState::Stopped);
                }
            }
            Err(e) => {
                tracing::warn!("Cannot reach Moonraker: {}", e);
                shared.emit_state(TransportState::ConnectTimeout);
            }
        }

        if !shared.running.load(Ordering::SeqCst) {
            break;
        }
        tokio::time::sleep(shared.params.reconnect_interval).await;
    }
}

async fn open_socket(
    params: &MoonrakerParams,
) -> Result<WebSocketStream<MaybeTlsStream<TcpStream>>> {
    let url = params.websocket_url()?;
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| ConnectionError::InvalidEndpoint {
            endpoint: url.to_string(),
            reason: e.to_string(),
        })?;
    if let Some(key) = params.api_key.as_deref().filter(|key| !key.is_empty()) {
        let value = HeaderValue::from_str(key).map_err(|e| ConnectionError::InvalidEndpoint {
            endpoint: url.to_string(),
            reason: format!("invalid api key: {e}"),
        })?;
        request.headers_mut().insert("X-Api-Key", value);
    }

    match tokio::time::timeout(params.connect_timeout, connect_async(request)).await {
        Ok(Ok((stream, _))) => Ok(stream),
        Ok(Err(e)) => Err(ConnectionError::WebSocketError {
            reason: e.to_string(),
        }
        .into()),
        Err(_) => Err(ConnectionError::ConnectionTimeout {
            timeout_ms: params.connect_timeout.as_millis() as u64,
        }
        .into()),
    }
}

/// Moonraker transport
pub struct MoonrakerClient {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl MoonrakerClient {
    /// Create a client reporting on `events`
    pub fn new(params: MoonrakerParams, events: TransportEventSender) -> Self {
        Self {
            shared: Arc::new(Shared {
                params,
                events,
                sink: tokio::sync::Mutex::new(None),
                pending: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                running: AtomicBool::new(false),
            }),
            task: Mutex::new(None),
        }
    }

    /// Connection parameters
    pub fn params(&self) -> &MoonrakerParams {
        &self.shared.params
    }

    /// Whether the client is connecting or connected
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostTransport for MoonrakerClient {
    async fn connect(&self) -> Result<()> {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // Fail fast on an unusable endpoint instead of looping on it.
        if let Err(e) = self.shared.params.websocket_url() {
            self.shared.running.store(false, Ordering::SeqCst);
            return Err(e);
        }
        let handle = tokio::spawn(connection_loop(Arc::clone(&self.shared)));
        *self.task.lock() = Some(handle);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.shared.emit_state(TransportState::Disconnecting);

        if let Some(mut sink) = self.shared.sink.lock().await.take() {
            if let Err(e) = sink.send(Message::Close(None)).await {
                tracing::debug!("Close frame not sent: {}", e);
            }
        }
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        self.shared.fail_pending("disconnected");
        self.shared.emit_state(TransportState::Stopped);
        Ok(())
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.shared
            .pending
            .lock()
            .insert(id, (method.to_string(), tx));

        let frame = request_frame(id, method, params).to_string();
        {
            let mut sink = self.shared.sink.lock().await;
            let sent = match sink.as_mut() {
                Some(sink) => sink.send(Message::Text(frame)).await.map_err(|e| {
                    ConnectionError::WebSocketError {
                        reason: e.to_string(),
                    }
                }),
                None => Err(ConnectionError::NotConnected {
                    endpoint: format!("{}:{}", self.shared.params.host, self.shared.params.port),
                }),
            };
            if let Err(e) = sent {
                self.shared.pending.lock().remove(&id);
                return Err(e.into());
            }
        }
        tracing::trace!("Sent {} (id {})", method, id);

        match tokio::time::timeout(self.shared.params.call_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ConnectionError::ConnectionLost {
                reason: format!("{method} abandoned"),
            }
            .into()),
            Err(_) => {
                self.shared.pending.lock().remove(&id);
                Err(HostError::Timeout {
                    method: method.to_string(),
                    timeout_ms: self.shared.params.call_timeout.as_millis() as u64,
                }
                .into())
            }
        }
    }
}

impl Drop for MoonrakerClient {
    fn drop(&mut self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::transport_event_channel;

    fn params(host: &str) -> MoonrakerParams {
        MoonrakerParams {
            host: host.to_string(),
            ..MoonrakerParams::default()
        }
    }

    #[test]
    fn test_urls_for_bare_host() {
        let params = params("printer.local");
        assert_eq!(
            params.websocket_url().unwrap().as_str(),
            "ws://printer.local:7125/websocket"
        );
        assert_eq!(
            params.http_base_url().unwrap().as_str(),
            "http://printer.local:7125/"
        );
    }

    #[test]
    fn test_urls_for_host_with_scheme() {
        let params = params("https://printer.example.com");
        assert_eq!(
            params.websocket_url().unwrap().as_str(),
            "wss://printer.example.com/websocket"
        );
        assert_eq!(
            params.http_base_url().unwrap().as_str(),
            "https://printer.example.com/"
        );
    }

    #[test]
    fn test_request_frame_omits_null_params() {
        let frame = request_frame(7, "server.info", Value::Null);
        assert_eq!(frame["id"], 7);
        assert_eq!(frame["method"], "server.info");
        assert!(frame.get("params").is_none());

        let frame = request_frame(8, "printer.gcode.script", json!({"script": "G28"}));
        assert_eq!(frame["params"]["script"], "G28");
    }

    #[test]
    fn test_parse_response() {
        let ok = parse_response("server.info", &json!({"id": 1, "result": {"klippy_state": "ready"}}));
        assert_eq!(ok.unwrap()["klippy_state"], "ready");

        let err = parse_response(
            "printer.gcode.script",
            &json!({"id": 2, "error": {"code": 400, "message": "Unknown command"}}),
        );
        assert!(matches!(
            err,
            Err(printhmi_core::Error::Host(HostError::Rpc { code: 400, .. }))
        ));
    }

    #[tokio::test]
    async fn test_notification_is_forwarded() {
        let (tx, mut rx) = transport_event_channel();
        let client = MoonrakerClient::new(MoonrakerParams::default(), tx);
        client.shared.handle_text(
            r#"{"jsonrpc":"2.0","method":"notify_status_update","params":[{"extruder":{"temperature":200.5}},123.4]}"#,
        );

        match rx.recv().await {
            Some(TransportEvent::Notification { method, params }) => {
                assert_eq!(method, "notify_status_update");
                assert_eq!(params.len(), 2);
                assert_eq!(params[0]["extruder"]["temperature"], 200.5);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_response_resolves_pending_call() {
        let (tx, _rx) = transport_event_channel();
        let client = MoonrakerClient::new(MoonrakerParams::default(), tx);
        let (reply_tx, reply_rx) = oneshot::channel();
        client
            .shared
            .pending
            .lock()
            .insert(5, ("server.info".to_string(), reply_tx));

        client
            .shared
            .handle_text(r#"{"jsonrpc":"2.0","id":5,"result":{"klippy_state":"shutdown"}}"#);

        let result = reply_rx.await.unwrap().unwrap();
        assert_eq!(result["klippy_state"], "shutdown");
        assert!(client.shared.pending.lock().is_empty());
    }

    #[tokio::test]
    async fn test_call_without_socket_fails() {
        let (tx, _rx) = transport_event_channel();
        let client = MoonrakerClient::new(MoonrakerParams::default(), tx);
        let result = client.call("server.info", Value::Null).await;
        assert!(matches!(
            result,
            Err(printhmi_core::Error::Connection(ConnectionError::NotConnected { .. }))
        ));
        assert!(client.shared.pending.lock().is_empty());
    }
}
