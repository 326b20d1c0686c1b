//! Two-capture enrollment state machine.
//!
//! Enrollment captures the same finger twice, with an enforced lift of the
//! finger between captures, combines the two character files into one
//! model, and stores it at the lowest free library slot. The machine is an
//! explicit stage value advanced by [`EnrollMachine::step`]; every stage
//! transition is observable, and a machine can be driven one sensor
//! interaction at a time in tests.

use fingate_core::{FingerprintOutcome, TemplateId};
use fingate_sensor::{AckOutcome, CharBuffer, SensorCodec, SensorTransport};
use tracing::{debug, info, warn};

/// Position of an in-flight enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollStage {
    /// Waiting for the first placement of the finger.
    CaptureFirst,

    /// Converting the first capture into character buffer one.
    ConvertFirst,

    /// Waiting for the finger to be lifted off the window.
    ///
    /// Without this gate a single continuous placement would satisfy both
    /// captures and the stored model would be built from one impression.
    WaitFingerRelease,

    /// Waiting for the second placement.
    CaptureSecond,

    /// Converting the second capture into character buffer two.
    ConvertSecond,

    /// Combining both character buffers into a storable model.
    CreateModel,

    /// Scanning the index table for the lowest free slot.
    FindSlot,

    /// Storing the model at this slot.
    Store(TemplateId),
}

/// Result of one [`EnrollMachine::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollProgress {
    /// The stage advanced; step again immediately.
    Advanced,

    /// The machine is waiting on the user (finger placement or lift); step
    /// again after the poll backoff.
    Waiting,

    /// Enrollment finished with this terminal outcome.
    Complete(FingerprintOutcome),
}

/// The enrollment machine.
///
/// Stage is plain data so an aborted enrollment leaves nothing behind: the
/// machine is dropped and the next request starts a fresh one.
#[derive(Debug)]
pub struct EnrollMachine {
    stage: EnrollStage,
    max_template_id: u16,
}

impl EnrollMachine {
    #[must_use]
    pub fn new(max_template_id: u16) -> Self {
        Self {
            stage: EnrollStage::CaptureFirst,
            max_template_id,
        }
    }

    /// Current stage, for observation and tests.
    #[must_use]
    pub fn stage(&self) -> EnrollStage {
        self.stage
    }

    /// Perform at most one sensor interaction and advance the stage.
    ///
    /// Sensor acks that do not fit the current stage, transport failures,
    /// a full library, and a rejected store all terminate the enrollment
    /// with [`FingerprintOutcome::EnrollFail`]; the machine never retries
    /// internally.
    pub async fn step<T: SensorTransport>(
        &mut self,
        codec: &mut SensorCodec<T>,
    ) -> EnrollProgress {
        match self.stage {
            EnrollStage::CaptureFirst => {
                match codec.get_image().await {
                    Ok(AckOutcome::Ok) => self.advance(EnrollStage::ConvertFirst),
                    Ok(AckOutcome::NoFinger) => EnrollProgress::Waiting,
                    other => self.fail("first capture", &other),
                }
            }
            EnrollStage::ConvertFirst => {
                match codec.image_to_template(CharBuffer::First).await {
                    Ok(AckOutcome::Ok) => self.advance(EnrollStage::WaitFingerRelease),
                    other => self.fail("first conversion", &other),
                }
            }
            EnrollStage::WaitFingerRelease => {
                match codec.get_image().await {
                    Ok(AckOutcome::NoFinger) => self.advance(EnrollStage::CaptureSecond),
                    Ok(AckOutcome::Ok) => EnrollProgress::Waiting,
                    other => self.fail("release wait", &other),
                }
            }
            EnrollStage::CaptureSecond => {
                match codec.get_image().await {
                    Ok(AckOutcome::Ok) => self.advance(EnrollStage::ConvertSecond),
                    Ok(AckOutcome::NoFinger) => EnrollProgress::Waiting,
                    other => self.fail("second capture", &other),
                }
            }
            EnrollStage::ConvertSecond => {
                match codec.image_to_template(CharBuffer::Second).await {
                    Ok(AckOutcome::Ok) => self.advance(EnrollStage::CreateModel),
                    other => self.fail("second conversion", &other),
                }
            }
            EnrollStage::CreateModel => {
                match codec.create_model().await {
                    Ok(AckOutcome::Ok) => self.advance(EnrollStage::FindSlot),
                    // The sensor rejects models whose two captures do not
                    // agree, which reads as an ack error here.
                    other => self.fail("model creation", &other),
                }
            }
            EnrollStage::FindSlot => match codec.find_free_id(self.max_template_id).await {
                Some(id) => {
                    debug!(slot = %id, "free slot selected");
                    self.advance(EnrollStage::Store(id))
                }
                None => {
                    let err = fingate_core::Error::ResourceExhausted {
                        max_id: self.max_template_id,
                    };
                    warn!(error = %err, "enrollment aborted");
                    EnrollProgress::Complete(FingerprintOutcome::EnrollFail)
                }
            },
            EnrollStage::Store(id) => {
                match codec.store_template(CharBuffer::First, id).await {
                    Ok(AckOutcome::Ok) => {
                        info!(slot = %id, "template stored");
                        EnrollProgress::Complete(FingerprintOutcome::EnrollOk(id))
                    }
                    other => self.fail("store", &other),
                }
            }
        }
    }

    fn advance(&mut self, next: EnrollStage) -> EnrollProgress {
        debug!(from = ?self.stage, to = ?next, "enroll stage");
        self.stage = next;
        EnrollProgress::Advanced
    }

    fn fail(
        &self,
        what: &str,
        result: &fingate_core::Result<AckOutcome>,
    ) -> EnrollProgress {
        match result {
            Ok(ack) => warn!(stage = ?self.stage, %ack, "enrollment failed at {what}"),
            Err(err) => warn!(stage = ?self.stage, error = %err, "enrollment failed at {what}"),
        }
        EnrollProgress::Complete(FingerprintOutcome::EnrollFail)
    }
}
