//! Inbound confirmation delivery.
//!
//! The remote peer acknowledges outcome notifications on its own bus topic
//! ([`fingate_core::constants::CONFIRMATION_TOPIC`]). The bus glue that
//! receives those frames holds a [`ConfirmationHandle`] registered at
//! wiring time and calls [`ConfirmationHandle::deliver`]; the fingerprint
//! session observes the watch side. Latest wins: an unread acknowledgment
//! is overwritten, never queued.

use fingate_core::{Confirmation, constants::OUTCOME_TOPIC};
use tokio::sync::watch;
use tracing::debug;

/// Create the single-slot confirmation path.
#[must_use]
pub fn confirmation_channel() -> (ConfirmationHandle, watch::Receiver<Option<Confirmation>>) {
    let (tx, rx) = watch::channel(None);
    (ConfirmationHandle { tx }, rx)
}

/// Registered delivery handle for inbound confirmations.
#[derive(Debug, Clone)]
pub struct ConfirmationHandle {
    tx: watch::Sender<Option<Confirmation>>,
}

impl ConfirmationHandle {
    /// Deliver a confirmation. `confirmation.topic` names the topic being
    /// acknowledged, not the topic the frame arrived on.
    pub fn deliver(&self, confirmation: Confirmation) {
        debug!(
            topic = format_args!("0x{:03X}", confirmation.topic),
            code = confirmation.code,
            "confirmation delivered"
        );
        self.tx.send_replace(Some(confirmation));
    }

    /// Deliver an acknowledgment of the outcome topic, as carried by a
    /// frame received on the confirmation topic.
    pub fn deliver_outcome_ack(&self, code: u8) {
        self.deliver(Confirmation {
            topic: OUTCOME_TOPIC,
            code,
        });
    }
}
