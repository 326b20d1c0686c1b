//! Actuator seam between the door controller and the physical drive.
//!
//! The deployed drive is a geared stepper on the door hinge; the trait
//! models exactly what the controller needs from it: a relative swing, a
//! coil release, and an immediate halt.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fingate_core::Result;
use tokio::time::sleep;

/// Drive hardware behind the door controller.
pub trait Actuator: Send {
    /// Rotate the door by `degrees` at one step per `step_interval`.
    /// Positive degrees open, negative close. Runs to completion unless
    /// cancelled or the drive faults.
    async fn swing(&mut self, degrees: f32, step_interval: Duration) -> Result<()>;

    /// Drop holding torque so the coils do not heat while the door rests.
    async fn release(&mut self) -> Result<()>;

    /// Stop stepping immediately, leaving the coils de-energized.
    async fn halt(&mut self);
}

#[derive(Debug, Default)]
struct MockState {
    swings: Vec<f32>,
    releases: usize,
    halts: usize,
    swing_failures: VecDeque<String>,
}

/// Scriptable in-memory actuator.
///
/// Swings take virtual time (one millisecond of sleep per degree per
/// step-interval unit), so paused-clock tests can observe the door
/// mid-motion. The handle clones cheaply for inspection after the
/// controller takes ownership.
#[derive(Debug, Clone, Default)]
pub struct MockActuator {
    state: Arc<Mutex<MockState>>,
}

impl MockActuator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next swing fail with an actuator fault.
    pub fn fail_next_swing(&self, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .swing_failures
            .push_back(reason.to_string());
    }

    /// Degrees of every swing attempted so far, in order.
    #[must_use]
    pub fn swings(&self) -> Vec<f32> {
        self.state.lock().unwrap().swings.clone()
    }

    #[must_use]
    pub fn release_count(&self) -> usize {
        self.state.lock().unwrap().releases
    }

    #[must_use]
    pub fn halt_count(&self) -> usize {
        self.state.lock().unwrap().halts
    }
}

impl Actuator for MockActuator {
    async fn swing(&mut self, degrees: f32, step_interval: Duration) -> Result<()> {
        let failure = {
            let mut state = self.state.lock().unwrap();
            state.swings.push(degrees);
            state.swing_failures.pop_front()
        };
        if let Some(reason) = failure {
            return Err(fingate_core::Error::ActuatorFault(reason));
        }
        // One step per degree keeps motion timing proportional to the
        // configured speed without modeling the real gear train.
        sleep(step_interval * degrees.abs().ceil() as u32).await;
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        self.state.lock().unwrap().releases += 1;
        Ok(())
    }

    async fn halt(&mut self) {
        self.state.lock().unwrap().halts += 1;
    }
}
