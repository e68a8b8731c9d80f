//! Connection supervisor
//!
//! Owns the status store and the file list, projects raw transport states
//! onto [`PrinterConnectionState`] and publishes every change as a
//! [`HostEvent`]. Transport events are handled one at a time in arrival
//! order; the side effects of a single event run concurrently.

use super::commands::{CommandSender, PrinterCommands};
use super::thumbnails::ThumbnailFetcher;
use super::{
    methods, notifications, HostTransport, TransportEvent, TransportEventReceiver,
    TransportState,
};
use parking_lot::RwLock;
use printhmi_core::{
    FileList, HostError, HostEvent, HostEventSender, PrinterConnectionState, Result,
    SharedStatus, StatusMap, StatusSnapshot, StatusStore, SubscriptionSet,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Keeps the domain view of the printer host in sync
pub struct ConnectionSupervisor {
    transport: Arc<dyn HostTransport>,
    subscriptions: SubscriptionSet,
    status: SharedStatus,
    files: RwLock<FileList>,
    state: RwLock<PrinterConnectionState>,
    running: AtomicBool,
    events: HostEventSender,
}

impl ConnectionSupervisor {
    /// Create a supervisor publishing on `events`
    pub fn new(
        transport: Arc<dyn HostTransport>,
        subscriptions: SubscriptionSet,
        events: HostEventSender,
    ) -> Self {
        Self {
            transport,
            subscriptions,
            status: StatusStore::shared(),
            files: RwLock::new(FileList::new()),
            state: RwLock::new(PrinterConnectionState::NotReady),
            running: AtomicBool::new(false),
            events,
        }
    }

    /// Current domain connection state
    pub fn state(&self) -> PrinterConnectionState {
        *self.state.read()
    }

    /// Shared status store
    pub fn status(&self) -> SharedStatus {
        Arc::clone(&self.status)
    }

    /// Latest file list
    pub fn files(&self) -> FileList {
        self.files.read().clone()
    }

    /// Whether `connect` was called without a later `disconnect`
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Transport used for calls
    pub fn transport(&self) -> Arc<dyn HostTransport> {
        Arc::clone(&self.transport)
    }

    /// Command facade bound to this supervisor's transport and status store
    pub fn commands(
        &self,
        queue: CommandSender,
        thumbnails: Arc<dyn ThumbnailFetcher>,
    ) -> PrinterCommands {
        PrinterCommands::new(queue, self.transport(), self.status(), thumbnails)
    }

    /// Start the host connection
    pub async fn connect(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        *self.state.write() = PrinterConnectionState::NotReady;
        if let Err(e) = self.transport.connect().await {
            self.running.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    /// Close the host connection
    pub async fn disconnect(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.update_state(PrinterConnectionState::Stopped);
        if let Err(e) = self.transport.disconnect().await {
            tracing::warn!("Transport disconnect failed: {}", e);
        }
    }

    /// Announce the current state and status again
    pub fn republish(&self) {
        self.publish(HostEvent::StateChanged(self.state()));
        let snapshot = self.status.read().snapshot();
        self.publish(HostEvent::StatusUpdated(snapshot));
    }

    /// Process transport events until the channel closes
    pub fn spawn(self: Arc<Self>, mut events: TransportEventReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle_transport_event(event).await;
            }
            tracing::debug!("Transport event channel closed");
        })
    }

    /// Handle one transport event
    pub async fn handle_transport_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::StateChanged(state) => self.on_transport_state(state).await,
            TransportEvent::Notification { method, params } => {
                self.on_notification(&method, &params).await
            }
        }
    }

    async fn on_transport_state(&self, state: TransportState) {
        tracing::debug!("Transport {}", state);
        match state {
            TransportState::Connecting | TransportState::Disconnecting => {
                self.update_state(PrinterConnectionState::NotReady)
            }
            TransportState::Stopped => self.update_state(PrinterConnectionState::Stopped),
            TransportState::ConnectTimeout => {
                self.update_state(PrinterConnectionState::HostError)
            }
            TransportState::Connected => {
                self.update_state(PrinterConnectionState::NotReady);
                let (subscribed, firmware) =
                    tokio::join!(self.subscribe(), self.query_firmware_state());
                if let Err(e) = subscribed {
                    tracing::error!("Subscribing to printer objects failed: {}", e);
                }
                if let Err(e) = firmware {
                    tracing::error!("Querying firmware state failed: {}", e);
                }
            }
        }
    }

    async fn on_notification(&self, method: &str, params: &[Value]) {
        match method {
            notifications::KLIPPY_READY => {
                let (refreshed, subscribed) = tokio::join!(self.refresh_status(), self.subscribe());
                if let Err(e) = &subscribed {
                    tracing::error!("Subscribing to printer objects failed: {}", e);
                }
                let snapshot = refreshed
                    .map_err(|e| tracing::error!("Status refresh failed: {}", e))
                    .ok();
                self.become_ready(snapshot);
            }
            notifications::KLIPPY_SHUTDOWN | notifications::KLIPPY_DISCONNECTED => {
                self.update_state(PrinterConnectionState::FirmwareError)
            }
            notifications::STATUS_UPDATE => match params.first().and_then(Value::as_object) {
                Some(patch) => {
                    let snapshot = {
                        let mut store = self.status.write();
                        store.merge_patch(patch);
                        store.snapshot()
                    };
                    self.publish(HostEvent::StatusUpdated(snapshot));
                }
                None => tracing::warn!("Status update without a status object"),
            },
            notifications::FILELIST_CHANGED => {
                let files = params
                    .first()
                    .map(FileList::from_payload)
                    .unwrap_or_default();
                *self.files.write() = files.clone();
                self.publish(HostEvent::FileListUpdated(files));
            }
            other => tracing::trace!("Ignoring notification {}", other),
        }
    }

    async fn subscribe(&self) -> Result<()> {
        self.transport
            .call(
                methods::OBJECTS_SUBSCRIBE,
                json!({ "objects": self.subscriptions.to_params() }),
            )
            .await?;
        tracing::debug!("Subscribed to {} printer objects", self.subscriptions.len());
        Ok(())
    }

    /// Replace the status store with a full query of the subscribed objects
    async fn refresh_status(&self) -> Result<StatusSnapshot> {
        let result = self
            .transport
            .call(
                methods::OBJECTS_QUERY,
                json!({ "objects": self.subscriptions.to_params() }),
            )
            .await?;
        let status: StatusMap = result
            .get("status")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| HostError::InvalidResponse {
                method: methods::OBJECTS_QUERY.to_string(),
                reason: "missing status object".to_string(),
            })?;
        let mut store = self.status.write();
        store.replace(status);
        Ok(store.snapshot())
    }

    async fn query_firmware_state(&self) -> Result<()> {
        let info = self.transport.call(methods::SERVER_INFO, Value::Null).await?;
        let klippy_state = info
            .get("klippy_state")
            .and_then(Value::as_str)
            .unwrap_or_default();
        match klippy_state {
            "ready" => {
                let snapshot = self.refresh_status().await?;
                self.become_ready(Some(snapshot));
            }
            "shutdown" | "disconnected" => {
                self.update_state(PrinterConnectionState::FirmwareError)
            }
            other => tracing::info!("Firmware is {}, waiting for it to become ready", other),
        }
        Ok(())
    }

    /// Announce Ready, followed by the fresh snapshot so the new page can render
    fn become_ready(&self, snapshot: Option<StatusSnapshot>) {
        self.update_state(PrinterConnectionState::Ready);
        if let Some(snapshot) = snapshot {
            self.publish(HostEvent::StatusUpdated(snapshot));
        }
    }

    fn update_state(&self, state: PrinterConnectionState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        if previous != state {
            tracing::info!("Printer connection {} -> {}", previous, state);
        }
        self.publish(HostEvent::StateChanged(state));
    }

    fn publish(&self, event: HostEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("No listener for host events");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printhmi_core::host_event_channel;

    struct NullTransport;

    #[async_trait::async_trait]
    impl HostTransport for NullTransport {
        async fn connect(&self) -> Result<()> {
            Ok(())
        }

        async fn disconnect(&self) -> Result<()> {
            Ok(())
        }

        async fn call(&self, _method: &str, _params: Value) -> Result<Value> {
            Ok(json!({}))
        }
    }

    fn supervisor() -> (ConnectionSupervisor, printhmi_core::HostEventReceiver) {
        let (tx, rx) = host_event_channel();
        let supervisor = ConnectionSupervisor::new(
            Arc::new(NullTransport),
            SubscriptionSet::new().with_all("print_stats"),
            tx,
        );
        (supervisor, rx)
    }

    #[tokio::test]
    async fn test_transport_state_projection() {
        let (supervisor, _rx) = supervisor();
        for (raw, expected) in [
            (TransportState::Connecting, PrinterConnectionState::NotReady),
            (TransportState::Stopped, PrinterConnectionState::Stopped),
            (TransportState::ConnectTimeout, PrinterConnectionState::HostError),
            (TransportState::Disconnecting, PrinterConnectionState::NotReady),
        ] {
            supervisor
                .handle_transport_event(TransportEvent::StateChanged(raw))
                .await;
            assert_eq!(supervisor.state(), expected, "after {}", raw);
        }
    }

    #[tokio::test]
    async fn test_status_update_merges_and_publishes() {
        let (supervisor, mut rx) = supervisor();
        supervisor
            .handle_transport_event(TransportEvent::Notification {
                method: "notify_status_update".to_string(),
                params: vec![json!({"print_stats": {"state": "printing"}}), json!(12.5)],
            })
            .await;

        match rx.recv().await {
            Some(HostEvent::StatusUpdated(snapshot)) => {
                assert_eq!(snapshot.str("print_stats", "state").unwrap(), "printing");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_republish_announces_state_and_status() {
        let (supervisor, mut rx) = supervisor();
        supervisor.republish();
        assert!(matches!(
            rx.recv().await,
            Some(HostEvent::StateChanged(PrinterConnectionState::NotReady))
        ));
        assert!(matches!(rx.recv().await, Some(HostEvent::StatusUpdated(_))));
    }
}
