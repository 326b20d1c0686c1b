//! Orchestration layer of the Fingate door controller.
//!
//! Wires the fingerprint session, the door controller, the notification
//! bus, and the status display together through bounded mailboxes:
//!
//! ```text
//! FingerprintSession ──outcomes(4)──> Notifier ──> NotificationEgress
//!         │                              │
//!         │                              └──door(5)──> DoorController
//!         ├──────────display(5)──────────────┬───────> StatusDisplay
//!         │                (door events join)┘
//!         └<─confirmation watch─── ConfirmationHandle <── bus glue
//! ```
//!
//! Every queue is bounded and every producer-side wait is finite, so one
//! stalled consumer can never wedge the rest of the system. The
//! confirmation path is a single-slot watch: a late acknowledgment
//! overwrites an unread one, it never queues behind it.
//!
//! This crate builds the channels and the notifier; the session and door
//! tasks are spawned by the caller with its concrete transport and
//! actuator, typically straight from a [`Mailboxes`] value.

#![allow(async_fn_in_trait)]

pub mod bus;
pub mod confirm;
pub mod display;
pub mod notifier;
pub mod wiring;

pub use bus::{MockBus, NotificationEgress};
pub use confirm::{ConfirmationHandle, confirmation_channel};
pub use display::{LogDisplay, MockDisplay, StatusDisplay, run_display};
pub use notifier::{Notifier, NotifierConfig};
pub use wiring::Mailboxes;
