//! # printhmi Communication
//!
//! Links to the two peers of the controller: the printer host reached over
//! the Moonraker websocket API, and the TJC / Nextion touch display on a
//! serial port.

pub mod display;
pub mod host;

pub use display::{
    display_event_channel, DisplayEventReceiver, DisplayEventSender, Frame, FrameDecoder,
    TjcDisplay, TjcParams, TouchDisplay,
};

pub use host::{
    command_queue, format_macro, select_thumbnail, spawn_command_worker,
    transport_event_channel, CommandReceiver, CommandSender, ConnectionSupervisor, HostCommand,
    HostTransport, HttpThumbnailFetcher, MoonrakerClient, MoonrakerParams, PrinterCommands,
    ThumbnailFetcher, ThumbnailInfo, TransportEvent, TransportEventReceiver,
    TransportEventSender, TransportState,
};
