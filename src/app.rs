//! Wiring of the host link, the display and the UI

use printhmi_communication::{
    command_queue, display_event_channel, spawn_command_worker, transport_event_channel,
    ConnectionSupervisor, HostTransport, HttpThumbnailFetcher, MoonrakerClient, MoonrakerParams,
    TjcDisplay, TjcParams, TouchDisplay,
};
use printhmi_core::{host_event_channel, DisplayEventKind};
use printhmi_settings::{Config, HmiSettings, MoonrakerSettings};
use printhmi_ui::{build_ui, printer_objects, PageContext, UiOptions};
use std::sync::Arc;

/// Moonraker connection parameters from the configuration
pub fn moonraker_params(settings: &MoonrakerSettings) -> MoonrakerParams {
    MoonrakerParams {
        host: settings.host.clone(),
        port: settings.port,
        api_key: settings.api_key().map(str::to_string),
        connect_timeout: settings.connect_timeout(),
        call_timeout: settings.call_timeout(),
        reconnect_interval: settings.reconnect_interval(),
    }
}

/// Serial display parameters from the configuration
pub fn tjc_params(settings: &HmiSettings) -> TjcParams {
    TjcParams {
        device: settings.device.clone(),
        baud_rate: settings.baud,
        timeout: settings.timeout(),
        ..TjcParams::default()
    }
}

/// Run the controller until Ctrl-C
pub async fn run(config: Config) -> anyhow::Result<()> {
    let subscriptions = printer_objects(&config.hmi.ui)?;

    // Host side
    let params = moonraker_params(&config.moonraker);
    let base_url = params.http_base_url()?;
    let (transport_tx, transport_rx) = transport_event_channel();
    let transport: Arc<dyn HostTransport> = Arc::new(MoonrakerClient::new(params, transport_tx));
    let (host_tx, mut host_rx) = host_event_channel();
    let supervisor = Arc::new(ConnectionSupervisor::new(
        Arc::clone(&transport),
        subscriptions,
        host_tx,
    ));
    let (queue, commands) = command_queue();
    let worker = spawn_command_worker(Arc::clone(&transport), commands);
    let fetcher = Arc::new(HttpThumbnailFetcher::new(
        base_url,
        config.moonraker.thumbnail_timeout(),
    )?);
    let printer = supervisor.commands(queue, fetcher);

    // Display side
    let (display_tx, mut display_rx) = display_event_channel();
    let display = Arc::new(TjcDisplay::new(tjc_params(&config.hmi), display_tx));
    display.connect().await?;
    if let Err(e) = display.wakeup().await {
        tracing::warn!("Display wakeup failed: {}", e);
    }

    let options = UiOptions {
        version_marker: config.hmi.version_marker,
        timeout: config.hmi.timeout(),
    };
    let context = PageContext::new(
        Arc::clone(&display) as Arc<dyn TouchDisplay>,
        printer,
        options,
    );
    let mut ui = build_ui(&config.hmi.ui, context)?;
    if let Err(e) = ui.start().await {
        tracing::warn!("Boot page failed: {}", e);
    }

    let supervisor_task = Arc::clone(&supervisor).spawn(transport_rx);
    supervisor.connect().await?;
    tracing::info!(
        "Connecting to {}:{}",
        config.moonraker.host,
        config.moonraker.port
    );

    loop {
        tokio::select! {
            Some(event) = host_rx.recv() => {
                tracing::debug!("Host event: {}", event);
                if let Err(e) = ui.on_host_event(&event).await {
                    tracing::warn!("Dropped {}: {}", event, e);
                }
            }
            Some(event) = display_rx.recv() => {
                if event.kind == DisplayEventKind::Reconnected {
                    tracing::info!("Display reconnected, pushing full state");
                    supervisor.republish();
                } else if let Err(e) = ui.on_display_event(&event).await {
                    tracing::warn!("Dropped {}: {}", event, e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    supervisor.disconnect().await;
    display.close();
    supervisor_task.abort();
    worker.abort();
    Ok(())
}
