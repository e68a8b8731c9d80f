//! # printhmi Core
//!
//! Core types shared by every printhmi crate.
//! Provides the printer status model, the domain connection state,
//! display value and event types, the supervisor-to-UI event channel
//! and the error taxonomy.

pub mod data;
pub mod error;
pub mod event;

pub use data::{
    merge_patch, DisplayEvent, DisplayEventKind, DisplayValue, FileList,
    PrinterConnectionState, SharedStatus, StatusMap, StatusSnapshot, StatusStore,
    SubscriptionSet,
};

pub use error::{ConnectionError, DisplayError, Error, HostError, Result, StatusError};

pub use event::{host_event_channel, HostEvent, HostEventReceiver, HostEventSender};
