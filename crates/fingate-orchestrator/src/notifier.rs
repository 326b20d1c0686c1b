//! The notifier task: single consumer of the fingerprint-outcome mailbox.
//!
//! Every outcome becomes one bus notification; a granted outcome can also
//! become a door-open request, depending on deployment policy (some sites
//! let the companion device decide and send the open command itself over
//! the bus). The door enqueue uses a short finite timeout so a wedged door
//! task can never stall notification delivery.

use std::time::Duration;

use fingate_core::{
    DoorCommand, FingerprintOutcome,
    constants::{DEFAULT_ENQUEUE_TIMEOUT_MS, OUTCOME_TOPIC},
};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::bus::NotificationEgress;

/// Deployment policy of the notifier.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Whether a `Match` outcome also enqueues `DoorCommand::Open`.
    pub forward_door_open: bool,

    /// Finite wait for room in the door mailbox.
    pub enqueue_timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            forward_door_open: true,
            enqueue_timeout: Duration::from_millis(DEFAULT_ENQUEUE_TIMEOUT_MS),
        }
    }
}

/// Fans fingerprint outcomes out to the bus and, per policy, the door.
pub struct Notifier<B> {
    bus: B,
    config: NotifierConfig,
    outcomes: mpsc::Receiver<FingerprintOutcome>,
    door: mpsc::Sender<DoorCommand>,
}

impl<B: NotificationEgress> Notifier<B> {
    pub fn new(
        bus: B,
        config: NotifierConfig,
        outcomes: mpsc::Receiver<FingerprintOutcome>,
        door: mpsc::Sender<DoorCommand>,
    ) -> Self {
        Self {
            bus,
            config,
            outcomes,
            door,
        }
    }

    /// Run until the outcome mailbox closes.
    pub async fn run(mut self) {
        info!(
            forward_door_open = self.config.forward_door_open,
            "notifier started"
        );
        while let Some(outcome) = self.outcomes.recv().await {
            self.dispatch(outcome).await;
        }
        info!("outcome mailbox closed, notifier stopping");
    }

    async fn dispatch(&mut self, outcome: FingerprintOutcome) {
        // Payload: [granted_flag, id_hi, id_lo]. Denials and failures all
        // carry the zero payload; the peer only distinguishes granted ids.
        let payload = match outcome.template_id() {
            Some(id) => {
                let slot = id.to_be_bytes();
                [1, slot[0], slot[1]]
            }
            None => [0, 0, 0],
        };
        debug!(%outcome, ?payload, "notifying peer");
        if let Err(err) = self.bus.send(OUTCOME_TOPIC, &payload).await {
            // Fire and forget: the bus glue owns any retry policy.
            warn!(error = %err, %outcome, "bus notification failed");
        }

        if self.config.forward_door_open && outcome.is_granted() {
            match timeout(self.config.enqueue_timeout, self.door.send(DoorCommand::Open)).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => warn!("door mailbox closed, open request dropped"),
                Err(_) => warn!(
                    timeout_ms = self.config.enqueue_timeout.as_millis() as u64,
                    "door mailbox full, open request dropped"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MockBus;
    use fingate_core::TemplateId;

    struct Harness {
        bus: MockBus,
        outcomes: mpsc::Sender<FingerprintOutcome>,
        door: mpsc::Receiver<DoorCommand>,
    }

    fn spawn_notifier(config: NotifierConfig) -> Harness {
        let bus = MockBus::new();
        let (outcomes, outcomes_rx) = mpsc::channel(4);
        let (door_tx, door) = mpsc::channel(5);
        tokio::spawn(Notifier::new(bus.clone(), config, outcomes_rx, door_tx).run());
        Harness {
            bus,
            outcomes,
            door,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_notifies_and_opens_door() {
        let mut harness = spawn_notifier(NotifierConfig::default());
        harness
            .outcomes
            .send(FingerprintOutcome::Match(TemplateId::from_wire(42)))
            .await
            .unwrap();

        assert_eq!(harness.door.recv().await.unwrap(), DoorCommand::Open);
        assert_eq!(harness.bus.frames(), vec![(0x123, vec![1, 0, 42])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_match_notifies_zero_payload_without_door_open() {
        let mut harness = spawn_notifier(NotifierConfig::default());
        harness
            .outcomes
            .send(FingerprintOutcome::NoMatch)
            .await
            .unwrap();
        // A second outcome proves the first dispatch has completed.
        harness
            .outcomes
            .send(FingerprintOutcome::Match(TemplateId::from_wire(1)))
            .await
            .unwrap();

        assert_eq!(harness.door.recv().await.unwrap(), DoorCommand::Open);
        let frames = harness.bus.frames();
        assert_eq!(frames[0], (0x123, vec![0, 0, 0]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enroll_ok_never_opens_the_door() {
        let mut harness = spawn_notifier(NotifierConfig::default());
        harness
            .outcomes
            .send(FingerprintOutcome::EnrollOk(TemplateId::from_wire(5)))
            .await
            .unwrap();
        harness
            .outcomes
            .send(FingerprintOutcome::Match(TemplateId::from_wire(1)))
            .await
            .unwrap();

        // The only door command is the one for the Match.
        assert_eq!(harness.door.recv().await.unwrap(), DoorCommand::Open);
        assert!(harness.door.try_recv().is_err());
        assert_eq!(harness.bus.frames()[0], (0x123, vec![1, 0, 5]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_disables_door_forwarding() {
        let mut harness = spawn_notifier(NotifierConfig {
            forward_door_open: false,
            ..NotifierConfig::default()
        });
        harness
            .outcomes
            .send(FingerprintOutcome::Match(TemplateId::from_wire(7)))
            .await
            .unwrap();
        drop(harness.outcomes);

        assert!(harness.door.recv().await.is_none());
        assert_eq!(harness.bus.frames(), vec![(0x123, vec![1, 0, 7])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_door_mailbox_never_stalls_notifications() {
        let bus = MockBus::new();
        let (outcomes, outcomes_rx) = mpsc::channel(4);
        // Zero-consumer door channel with capacity 1, pre-filled.
        let (door_tx, _door_rx) = mpsc::channel(1);
        door_tx.send(DoorCommand::Close).await.unwrap();
        tokio::spawn(
            Notifier::new(bus.clone(), NotifierConfig::default(), outcomes_rx, door_tx).run(),
        );

        outcomes
            .send(FingerprintOutcome::Match(TemplateId::from_wire(1)))
            .await
            .unwrap();
        outcomes
            .send(FingerprintOutcome::Match(TemplateId::from_wire(2)))
            .await
            .unwrap();
        drop(outcomes);

        // Both notifications still reach the bus; the open requests timed
        // out against the full mailbox on virtual time.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(
            bus.frames(),
            vec![(0x123, vec![1, 0, 1]), (0x123, vec![1, 0, 2])]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_bus_failure_is_not_fatal() {
        let mut harness = spawn_notifier(NotifierConfig::default());
        harness.bus.fail_next(1);

        harness
            .outcomes
            .send(FingerprintOutcome::Match(TemplateId::from_wire(1)))
            .await
            .unwrap();
        harness
            .outcomes
            .send(FingerprintOutcome::Match(TemplateId::from_wire(2)))
            .await
            .unwrap();

        // First frame lost to the scripted failure, second delivered.
        assert_eq!(harness.door.recv().await.unwrap(), DoorCommand::Open);
        assert_eq!(harness.door.recv().await.unwrap(), DoorCommand::Open);
        assert_eq!(harness.bus.frames(), vec![(0x123, vec![1, 0, 2])]);
    }
}
