use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Transport errors (serial link to the sensor, bus egress)
    #[error("Transport fault: {0}")]
    Transport(String),

    #[error("Transport timeout after {duration_ms}ms")]
    TransportTimeout { duration_ms: u64 },

    // Protocol errors
    #[error("Malformed sensor response: {0}")]
    Protocol(String),

    #[error("Response checksum mismatch: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    // Actuator errors
    #[error("Actuator fault: {0}")]
    ActuatorFault(String),

    // Template store errors
    #[error("No free template slot below id {max_id}")]
    ResourceExhausted { max_id: u16 },

    #[error("Template id {id} outside valid range 1-{max_id}")]
    InvalidTemplateId { id: u16, max_id: u16 },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Transport and protocol failures are recoverable: the owning state
    /// machine backs off and retries; they never escalate out of a task.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::TransportTimeout { .. }
                | Error::Protocol(_)
                | Error::ChecksumMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
