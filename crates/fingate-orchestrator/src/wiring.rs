//! Mailbox construction.
//!
//! One place builds every channel with its deployed depth, so queue sizing
//! never drifts between tasks. The endpoints are plain fields: the caller
//! moves each one into the task it belongs to and keeps the handles it
//! wants to drive the system with.

use fingate_biometric::{EnrollRequest, SessionChannels};
use fingate_core::{
    DisplayEvent, DoorCommand, DoorStatus, FingerprintOutcome,
    constants::{DISPLAY_QUEUE_DEPTH, DOOR_QUEUE_DEPTH, ENROLL_QUEUE_DEPTH, OUTCOME_QUEUE_DEPTH},
};
use tokio::sync::{mpsc, watch};

use crate::confirm::{ConfirmationHandle, confirmation_channel};

/// Every mailbox of the controller, pre-wired at the deployed depths.
#[derive(Debug)]
pub struct Mailboxes {
    /// Endpoints owned by the fingerprint session task.
    pub session: SessionChannels,

    /// Consumer end of the outcome mailbox, owned by the notifier.
    pub outcomes: mpsc::Receiver<FingerprintOutcome>,

    /// Producer handle for door commands (notifier, operator surfaces).
    pub door_commands: mpsc::Sender<DoorCommand>,

    /// Consumer end of the door mailbox, owned by the door controller.
    pub door_mailbox: mpsc::Receiver<DoorCommand>,

    /// Status publisher, owned by the door controller.
    pub door_status_tx: watch::Sender<DoorStatus>,

    /// Status snapshots for any observer.
    pub door_status: watch::Receiver<DoorStatus>,

    /// Producer handle for display events (door controller task).
    pub display_events: mpsc::Sender<DisplayEvent>,

    /// Consumer end of the display mailbox, owned by the display task.
    pub display_mailbox: mpsc::Receiver<DisplayEvent>,

    /// Producer handle for enrollment requests.
    pub enroll_requests: mpsc::Sender<EnrollRequest>,

    /// Registered delivery handle for inbound confirmations.
    pub confirmations: ConfirmationHandle,
}

impl Mailboxes {
    #[must_use]
    pub fn new() -> Self {
        let (outcome_tx, outcomes) = mpsc::channel(OUTCOME_QUEUE_DEPTH);
        let (door_commands, door_mailbox) = mpsc::channel(DOOR_QUEUE_DEPTH);
        let (door_status_tx, door_status) = watch::channel(DoorStatus::default());
        let (display_tx, display_mailbox) = mpsc::channel(DISPLAY_QUEUE_DEPTH);
        let (enroll_requests, enroll_rx) = mpsc::channel(ENROLL_QUEUE_DEPTH);
        let (confirmations, confirmation_rx) = confirmation_channel();

        Self {
            session: SessionChannels {
                outcomes: outcome_tx,
                display: display_tx.clone(),
                enroll_requests: enroll_rx,
                confirmations: confirmation_rx,
            },
            outcomes,
            door_commands,
            door_mailbox,
            door_status_tx,
            door_status,
            display_events: display_tx,
            display_mailbox,
            enroll_requests,
            confirmations,
        }
    }
}

impl Default for Mailboxes {
    fn default() -> Self {
        Self::new()
    }
}
