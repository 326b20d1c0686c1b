//! Tunable parameters for the session machines.
//!
//! Defaults mirror the deployed hardware's timing (see
//! [`crate::constants`]); deployments override individual fields rather
//! than scattering magic numbers through the state machines.

use crate::{
    Result,
    constants::{
        DEFAULT_CONFIRMATION_TIMEOUT_MS, DEFAULT_ERROR_COOLDOWN_MS, DEFAULT_MAX_TEMPLATE_ID,
        DEFAULT_OPEN_DWELL_MS, DEFAULT_POLL_BACKOFF_MS, DEFAULT_SEARCH_PAGE_COUNT,
        DEFAULT_SETTLE_DELAY_MS, DEFAULT_STEP_INTERVAL_MS, DOOR_SWING_DEGREES, MIN_TEMPLATE_ID,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of the fingerprint session machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Pause between `GetImage` polls while no finger is present.
    pub poll_backoff: Duration,

    /// Pause after publishing an outcome before the sensor is re-polled.
    pub settle_delay: Duration,

    /// Pause in the generic error state before returning to idle.
    pub error_cooldown: Duration,

    /// Ceiling of the valid template-id range. The same value bounds
    /// enrollment validation and the free-slot index scan; the two must
    /// never diverge.
    pub max_template_id: u16,

    /// Page count passed to the 1:N search command.
    pub search_page_count: u16,

    /// Whether an outcome must be acknowledged by the remote peer before
    /// the session settles back to idle.
    pub require_confirmation: bool,

    /// Upper bound on the confirmation wait. Expiry is logged, never fatal.
    pub confirmation_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_backoff: Duration::from_millis(DEFAULT_POLL_BACKOFF_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            error_cooldown: Duration::from_millis(DEFAULT_ERROR_COOLDOWN_MS),
            max_template_id: DEFAULT_MAX_TEMPLATE_ID,
            search_page_count: DEFAULT_SEARCH_PAGE_COUNT,
            require_confirmation: false,
            confirmation_timeout: Duration::from_millis(DEFAULT_CONFIRMATION_TIMEOUT_MS),
        }
    }
}

impl SessionConfig {
    /// Validate cross-field consistency.
    ///
    /// # Errors
    /// Returns `Error::Config` if the template ceiling is below the minimum
    /// slot or any delay is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_template_id < MIN_TEMPLATE_ID {
            return Err(Error::Config(format!(
                "max_template_id must be >= {MIN_TEMPLATE_ID}, got {}",
                self.max_template_id
            )));
        }
        if self.poll_backoff.is_zero() {
            return Err(Error::Config(
                "poll_backoff must be non-zero (the wait state must not busy-spin)".to_string(),
            ));
        }
        if self.search_page_count == 0 {
            return Err(Error::Config("search_page_count must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Configuration of the door session machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorConfig {
    /// Time the door stays open before the unconditional auto-close (ms).
    pub open_dwell_ms: u32,

    /// Actuator step interval (ms per step).
    pub step_interval_ms: u32,

    /// Degrees of rotation for a full open (mirrored on close).
    pub swing_degrees: f32,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            open_dwell_ms: DEFAULT_OPEN_DWELL_MS,
            step_interval_ms: DEFAULT_STEP_INTERVAL_MS,
            swing_degrees: DOOR_SWING_DEGREES,
        }
    }
}

impl DoorConfig {
    /// Validate field ranges.
    ///
    /// # Errors
    /// Returns `Error::Config` for a zero dwell or non-positive swing.
    pub fn validate(&self) -> Result<()> {
        if self.open_dwell_ms == 0 {
            return Err(Error::Config("open_dwell_ms must be non-zero".to_string()));
        }
        if self.swing_degrees <= 0.0 {
            return Err(Error::Config(format!(
                "swing_degrees must be positive, got {}",
                self.swing_degrees
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_template_id, DEFAULT_MAX_TEMPLATE_ID);
        assert_eq!(config.poll_backoff, Duration::from_millis(100));
    }

    #[test]
    fn test_session_rejects_zero_backoff() {
        let config = SessionConfig {
            poll_backoff: Duration::ZERO,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_rejects_zero_ceiling() {
        let config = SessionConfig {
            max_template_id: 0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_door_defaults_are_valid() {
        let config = DoorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.open_dwell_ms, 3000);
    }

    #[test]
    fn test_door_rejects_zero_dwell() {
        let config = DoorConfig {
            open_dwell_ms: 0,
            ..DoorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
