//! The fingerprint acquisition task.
//!
//! One task owns the sensor codec for the life of the process. Each loop
//! iteration is a complete pass: service a pending enrollment request, or
//! poll for a finger and run capture, conversion, and library search. The
//! pass publishes at most one outcome and then paces itself (poll backoff
//! with no finger, settle delay after an outcome, cooldown after a sensor
//! fault) so the serial link is never hammered.

use fingate_core::{
    Confirmation, DisplayEvent, FingerprintOutcome, SessionConfig, constants::OUTCOME_TOPIC,
};
use fingate_sensor::{AckOutcome, CharBuffer, SearchResult, SensorCodec, SensorTransport};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::enroll::{EnrollMachine, EnrollProgress};

/// How one verification pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassEnd {
    /// Nothing on the sensor window; poll again after the backoff.
    NoFinger,

    /// A terminal outcome to publish.
    Outcome(FingerprintOutcome),

    /// The sensor rejected the capture or conversion; cool down and retry.
    /// No outcome is published for an abandoned pass.
    Abandoned,
}

/// Request to enroll a new fingerprint at the lowest free slot.
///
/// Carries no slot: slot selection is the sensor index scan's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrollRequest;

/// Mailbox endpoints wired into the session task.
#[derive(Debug)]
pub struct SessionChannels {
    /// Bounded outcome mailbox toward the orchestration layer. Publishing
    /// is best-effort: a full mailbox drops the outcome with a warning.
    pub outcomes: mpsc::Sender<FingerprintOutcome>,

    /// Bounded mailbox toward the status renderer. Also best-effort.
    pub display: mpsc::Sender<DisplayEvent>,

    /// Enrollment requests, checked with priority before each poll.
    pub enroll_requests: mpsc::Receiver<EnrollRequest>,

    /// Latest confirmation from the notification peer. Single-slot by
    /// construction: a late confirmation overwrites, never queues.
    pub confirmations: watch::Receiver<Option<Confirmation>>,
}

/// The acquisition task.
pub struct FingerprintSession<T> {
    codec: SensorCodec<T>,
    config: SessionConfig,
    channels: SessionChannels,
}

impl<T: SensorTransport> FingerprintSession<T> {
    pub fn new(codec: SensorCodec<T>, config: SessionConfig, channels: SessionChannels) -> Self {
        Self {
            codec,
            config,
            channels,
        }
    }

    /// Run until the outcome mailbox is closed by its consumer.
    pub async fn run(mut self) {
        info!(
            max_template_id = self.config.max_template_id,
            "fingerprint session started"
        );
        loop {
            if self.channels.outcomes.is_closed() {
                info!("outcome mailbox closed, fingerprint session stopping");
                return;
            }

            // Enrollment preempts verification between passes, never
            // mid-pass.
            match self.channels.enroll_requests.try_recv() {
                Ok(EnrollRequest) => {
                    self.run_enrollment().await;
                    continue;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
            }

            match self.verify_pass().await {
                Ok(PassEnd::Outcome(outcome)) => {
                    self.publish(outcome).await;
                    sleep(self.config.settle_delay).await;
                }
                Ok(PassEnd::NoFinger) => sleep(self.config.poll_backoff).await,
                Ok(PassEnd::Abandoned) => sleep(self.config.error_cooldown).await,
                Err(err) => {
                    warn!(error = %err, "sensor pass failed");
                    self.publish(FingerprintOutcome::SensorError).await;
                    sleep(self.config.error_cooldown).await;
                }
            }
        }
    }

    /// One verification pass: capture, convert, search.
    ///
    /// Transport and frame-level failures propagate as errors; a capture or
    /// conversion the sensor itself rejects ends the pass without one.
    async fn verify_pass(&mut self) -> fingate_core::Result<PassEnd> {
        match self.codec.get_image().await? {
            AckOutcome::Ok => {}
            AckOutcome::NoFinger => return Ok(PassEnd::NoFinger),
            ack => {
                debug!(%ack, "capture rejected");
                return Ok(PassEnd::Abandoned);
            }
        }

        match self.codec.image_to_template(CharBuffer::First).await? {
            AckOutcome::Ok => {}
            ack => {
                // Smudged or partial placement; let the user try again.
                debug!(%ack, "conversion rejected, pass abandoned");
                return Ok(PassEnd::Abandoned);
            }
        }

        match self.codec.search(self.config.search_page_count).await? {
            SearchResult::Match(id) => Ok(PassEnd::Outcome(FingerprintOutcome::Match(id))),
            SearchResult::NoMatch => Ok(PassEnd::Outcome(FingerprintOutcome::NoMatch)),
        }
    }

    /// Drive one enrollment to completion and publish its outcome.
    async fn run_enrollment(&mut self) {
        info!("enrollment started");
        let mut machine = EnrollMachine::new(self.config.max_template_id);
        let outcome = loop {
            if self.channels.outcomes.is_closed() {
                return;
            }
            match machine.step(&mut self.codec).await {
                EnrollProgress::Advanced => {}
                EnrollProgress::Waiting => sleep(self.config.poll_backoff).await,
                EnrollProgress::Complete(outcome) => break outcome,
            }
        };
        self.publish(outcome).await;
        sleep(self.config.settle_delay).await;
    }

    /// Publish an outcome and its display event, then optionally wait for
    /// the remote confirmation.
    async fn publish(&mut self, outcome: FingerprintOutcome) {
        info!(%outcome, "session outcome");
        match self.channels.outcomes.try_send(outcome) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(outcome = %dropped, "outcome mailbox full, outcome dropped");
            }
            Err(TrySendError::Closed(_)) => return,
        }

        let event = match outcome {
            FingerprintOutcome::Match(_) | FingerprintOutcome::EnrollOk(_) => {
                DisplayEvent::FingerOk
            }
            FingerprintOutcome::NoMatch | FingerprintOutcome::EnrollFail => {
                DisplayEvent::FingerFail
            }
            FingerprintOutcome::SensorError => DisplayEvent::Error,
        };
        let _ = self.channels.display.try_send(event);

        if self.config.require_confirmation
            && !matches!(outcome, FingerprintOutcome::SensorError)
        {
            self.await_confirmation().await;
        }
    }

    /// Bounded wait for a fresh confirmation on the outcome topic.
    ///
    /// A silent or slow peer only costs the timeout; the session always
    /// returns to polling.
    async fn await_confirmation(&mut self) {
        // A fast peer can acknowledge between the outcome publish and this
        // wait; an unseen matching value satisfies it immediately.
        if self.channels.confirmations.has_changed().unwrap_or(false) {
            let latest = *self.channels.confirmations.borrow_and_update();
            if let Some(c) = latest {
                if c.topic == OUTCOME_TOPIC {
                    debug!(code = c.code, "outcome confirmed by peer");
                    return;
                }
            }
        }

        let wait = async {
            loop {
                if self.channels.confirmations.changed().await.is_err() {
                    return None;
                }
                let latest = *self.channels.confirmations.borrow_and_update();
                match latest {
                    Some(c) if c.topic == OUTCOME_TOPIC => return Some(c),
                    _ => {}
                }
            }
        };

        match timeout(self.config.confirmation_timeout, wait).await {
            Ok(Some(c)) => debug!(code = c.code, "outcome confirmed by peer"),
            Ok(None) => {}
            Err(_) => warn!(
                timeout_ms = self.config.confirmation_timeout.as_millis() as u64,
                "peer confirmation timed out"
            ),
        }
    }
}
