use crate::{
    Result,
    constants::{
        DEFAULT_MAX_TEMPLATE_ID, DEFAULT_OPEN_DWELL_MS, DEFAULT_STEP_INTERVAL_MS, MIN_TEMPLATE_ID,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot number of a fingerprint template inside the sensor's flash library.
///
/// The sensor enforces uniqueness of the stored template per slot; this
/// system only discovers free slots and addresses existing ones. Validation
/// is against the deployment's configured ceiling (see
/// [`crate::SessionConfig::max_template_id`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(u16);

impl TemplateId {
    /// Create a template id validated against the configured ceiling.
    ///
    /// # Errors
    /// Returns `Error::InvalidTemplateId` if the id is outside
    /// `MIN_TEMPLATE_ID..=max_id`.
    pub fn new(id: u16, max_id: u16) -> Result<Self> {
        if !(MIN_TEMPLATE_ID..=max_id).contains(&id) {
            return Err(Error::InvalidTemplateId { id, max_id });
        }
        Ok(TemplateId(id))
    }

    /// Wrap an id reported by the sensor itself (match results, index scan).
    ///
    /// The sensor is the authority on its own slot numbering, so no range
    /// check is applied here.
    #[must_use]
    pub fn from_wire(id: u16) -> Self {
        TemplateId(id)
    }

    /// Get the raw slot number.
    #[must_use]
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Big-endian encoding used in command parameters.
    #[must_use]
    pub fn to_be_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal result of one fingerprint session pass.
///
/// Produced exactly once per terminal sub-state of the session machine,
/// consumed exactly once by the orchestration layer, and not retained after
/// delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintOutcome {
    /// A captured print matched the stored template at this slot.
    Match(TemplateId),

    /// A print was captured and converted, but no stored template matched.
    NoMatch,

    /// A two-capture enrollment completed and was stored at this slot.
    EnrollOk(TemplateId),

    /// Enrollment aborted: capture/conversion failure, full library, or a
    /// rejected store.
    EnrollFail,

    /// The sensor or its link failed mid-session.
    SensorError,
}

impl FingerprintOutcome {
    /// Whether this outcome represents a successful authentication.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, FingerprintOutcome::Match(_))
    }

    /// The template id carried by the outcome, if any.
    #[must_use]
    pub fn template_id(&self) -> Option<TemplateId> {
        match self {
            FingerprintOutcome::Match(id) | FingerprintOutcome::EnrollOk(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for FingerprintOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FingerprintOutcome::Match(id) => write!(f, "Match({id})"),
            FingerprintOutcome::NoMatch => write!(f, "NoMatch"),
            FingerprintOutcome::EnrollOk(id) => write!(f, "EnrollOk({id})"),
            FingerprintOutcome::EnrollFail => write!(f, "EnrollFail"),
            FingerprintOutcome::SensorError => write!(f, "SensorError"),
        }
    }
}

/// Command accepted by the door session machine's mailbox.
///
/// Enqueued by callers, consumed exactly once, serviced run-to-completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorCommand {
    /// Open the door; honored only from `Closed`.
    Open,

    /// Close the door; honored from `Open`, and from `Error` as the
    /// explicit recovery re-attempt.
    Close,

    /// Halt actuation immediately and force `Error`, from any state.
    EmergencyStop,

    /// Update the open dwell (ms). Ignored if zero.
    SetOpenDwellMs(u32),

    /// Update the actuator step interval (ms). Ignored if zero.
    SetSpeedMs(u32),

    /// Release actuator holding torque without a state change.
    ReleaseCoils,
}

impl fmt::Display for DoorCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DoorCommand::Open => write!(f, "Open"),
            DoorCommand::Close => write!(f, "Close"),
            DoorCommand::EmergencyStop => write!(f, "EmergencyStop"),
            DoorCommand::SetOpenDwellMs(ms) => write!(f, "SetOpenDwellMs({ms})"),
            DoorCommand::SetSpeedMs(ms) => write!(f, "SetSpeedMs({ms})"),
            DoorCommand::ReleaseCoils => write!(f, "ReleaseCoils"),
        }
    }
}

/// Position of the door session machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    /// At rest, fully closed. Initial state.
    Closed,

    /// Actuator driving toward open.
    Opening,

    /// Fully open, dwell timer running.
    Open,

    /// Actuator driving toward closed.
    Closing,

    /// Actuation failed or was emergency-stopped; an explicit successful
    /// command is required to leave.
    Error,
}

impl DoorState {
    /// Check whether a transition to `target` is legal.
    ///
    /// `Error` is reachable from anywhere (fault / emergency stop).
    /// `Error → Closing` is the recovery path: a `Close` command driving
    /// the door to its known-closed position.
    #[must_use]
    pub fn can_transition_to(&self, target: DoorState) -> bool {
        if target == DoorState::Error {
            return true;
        }
        matches!(
            (self, target),
            (DoorState::Closed, DoorState::Opening)
                | (DoorState::Opening, DoorState::Open)
                | (DoorState::Open, DoorState::Closing)
                | (DoorState::Closing, DoorState::Closed)
                | (DoorState::Error, DoorState::Closing)
        )
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            DoorState::Closed => "Closed",
            DoorState::Opening => "Opening",
            DoorState::Open => "Open",
            DoorState::Closing => "Closing",
            DoorState::Error => "Error",
        };
        write!(f, "{s}")
    }
}

/// Snapshot of the door machine's externally visible state.
///
/// Mutated only by the door task; observers receive copies by value so a
/// reader can never see a torn update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorStatus {
    pub state: DoorState,
    pub open_dwell_ms: u32,
    pub speed_ms: u32,
    pub is_moving: bool,
    pub operation_count: u32,
}

impl Default for DoorStatus {
    fn default() -> Self {
        Self {
            state: DoorState::Closed,
            open_dwell_ms: DEFAULT_OPEN_DWELL_MS,
            speed_ms: DEFAULT_STEP_INTERVAL_MS,
            is_moving: false,
            operation_count: 0,
        }
    }
}

/// Event emitted toward the external status renderer.
///
/// This core only emits these; drawing is someone else's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayEvent {
    FingerOk,
    FingerFail,
    DoorOpen,
    DoorClosed,
    Error,
    Idle,
}

/// Acknowledgment delivered asynchronously by the notification peer.
///
/// Correlated by topic only; the confirmation path keeps the latest value,
/// never a backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub topic: u16,
    pub code: u8,
}
