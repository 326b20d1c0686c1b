//! Door actuation for the Fingate controller.
//!
//! The [`DoorController`] task owns the actuator and a bounded command
//! mailbox. Commands are serviced run-to-completion with one exception:
//! while the door is open or in motion the mailbox is still drained, so an
//! emergency stop always takes effect without waiting for the cycle to
//! finish. A completed open always ends in the unconditional auto-close
//! after the dwell; no command can leave the door standing open.
//!
//! Observers read [`fingate_core::DoorStatus`] snapshots from a watch
//! channel and can never see a torn update.

#![allow(async_fn_in_trait)]

pub mod actuator;
pub mod controller;

pub use actuator::{Actuator, MockActuator};
pub use controller::DoorController;
