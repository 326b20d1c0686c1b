//! The door session task.
//!
//! State lives in one place: this task's `DoorState` plus the status watch
//! it publishes. Every transition goes through
//! [`fingate_core::DoorState::can_transition_to`]; a command whose
//! transition is illegal in the current state is logged and dropped, it
//! never faults the door.

use std::pin::pin;
use std::time::Duration;

use fingate_core::{DisplayEvent, DoorCommand, DoorConfig, DoorState, DoorStatus};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::actuator::Actuator;

/// How a guarded motion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionEnd {
    Completed,
    EmergencyStopped,
}

/// Why the open dwell ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DwellEnd {
    Expired,
    EarlyClose,
    EmergencyStopped,
}

/// The door session task.
///
/// Consumes commands from a bounded mailbox and publishes
/// [`DoorStatus`] snapshots after every externally visible change.
pub struct DoorController<A> {
    actuator: A,
    config: DoorConfig,
    commands: mpsc::Receiver<DoorCommand>,
    status: watch::Sender<DoorStatus>,
    display: mpsc::Sender<DisplayEvent>,
    state: DoorState,
    is_moving: bool,
    operation_count: u32,
    commands_open: bool,
}

impl<A: Actuator> DoorController<A> {
    pub fn new(
        actuator: A,
        config: DoorConfig,
        commands: mpsc::Receiver<DoorCommand>,
        status: watch::Sender<DoorStatus>,
        display: mpsc::Sender<DisplayEvent>,
    ) -> Self {
        Self {
            actuator,
            config,
            commands,
            status,
            display,
            state: DoorState::Closed,
            is_moving: false,
            operation_count: 0,
            commands_open: true,
        }
    }

    /// Run until the command mailbox is closed.
    pub async fn run(mut self) {
        info!(
            open_dwell_ms = self.config.open_dwell_ms,
            step_interval_ms = self.config.step_interval_ms,
            "door controller started"
        );
        self.publish_status();
        while let Some(cmd) = self.commands.recv().await {
            debug!(%cmd, state = %self.state, "door command");
            self.handle(cmd).await;
        }
        info!("door command mailbox closed, controller stopping");
    }

    async fn handle(&mut self, cmd: DoorCommand) {
        match cmd {
            DoorCommand::Open => self.open_cycle().await,
            DoorCommand::Close => self.close_cycle().await,
            DoorCommand::EmergencyStop => {
                self.actuator.halt().await;
                self.enter_error("emergency stop");
            }
            DoorCommand::SetOpenDwellMs(ms) => self.set_dwell(ms),
            DoorCommand::SetSpeedMs(ms) => self.set_speed(ms),
            DoorCommand::ReleaseCoils => {
                if let Err(err) = self.actuator.release().await {
                    warn!(error = %err, "coil release failed");
                }
            }
        }
    }

    /// Full open cycle: swing open, dwell, swing closed.
    ///
    /// A completed open always reaches the auto-close; only an emergency
    /// stop or an actuator fault leaves the cycle early, and both end in
    /// `Error` with the coils halted.
    async fn open_cycle(&mut self) {
        if !self.transition(DoorState::Opening) {
            return;
        }
        self.set_moving(true);
        match self.drive(self.config.swing_degrees).await {
            Ok(MotionEnd::Completed) => {}
            Ok(MotionEnd::EmergencyStopped) => {
                self.set_moving(false);
                self.enter_error("emergency stop while opening");
                return;
            }
            Err(err) => {
                self.set_moving(false);
                self.fault("open swing failed", &err);
                return;
            }
        }
        self.set_moving(false);
        if !self.transition(DoorState::Open) {
            return;
        }
        self.operation_count += 1;
        self.publish_status();
        let _ = self.display.try_send(DisplayEvent::DoorOpen);
        info!(operation = self.operation_count, "door open");

        match self.dwell().await {
            DwellEnd::Expired | DwellEnd::EarlyClose => self.close_cycle().await,
            DwellEnd::EmergencyStopped => {
                self.actuator.halt().await;
                self.enter_error("emergency stop while open");
            }
        }
    }

    /// Hold the door open until the dwell expires or a command ends it.
    ///
    /// The mailbox stays live during the dwell: an early `Close` is
    /// honored, an `EmergencyStop` aborts, configuration updates apply,
    /// and everything else is dropped. Nothing can extend the dwell past
    /// its deadline.
    async fn dwell(&mut self) -> DwellEnd {
        let deadline = Instant::now() + Duration::from_millis(u64::from(self.config.open_dwell_ms));
        let Self {
            commands,
            commands_open,
            config,
            actuator,
            status,
            state,
            is_moving,
            operation_count,
            ..
        } = self;
        loop {
            tokio::select! {
                () = sleep_until(deadline) => return DwellEnd::Expired,
                cmd = commands.recv(), if *commands_open => match cmd {
                    Some(DoorCommand::Close) => return DwellEnd::EarlyClose,
                    Some(DoorCommand::EmergencyStop) => return DwellEnd::EmergencyStopped,
                    Some(DoorCommand::SetOpenDwellMs(ms)) if ms > 0 => {
                        // Takes effect from the next open; the running
                        // deadline is already armed.
                        config.open_dwell_ms = ms;
                        status.send_replace(Self::snapshot(
                            *state, config, *is_moving, *operation_count,
                        ));
                    }
                    Some(DoorCommand::SetSpeedMs(ms)) if ms > 0 => {
                        config.step_interval_ms = ms;
                        status.send_replace(Self::snapshot(
                            *state, config, *is_moving, *operation_count,
                        ));
                    }
                    Some(DoorCommand::ReleaseCoils) => {
                        if let Err(err) = actuator.release().await {
                            warn!(error = %err, "coil release failed");
                        }
                    }
                    Some(cmd) => debug!(%cmd, "command dropped while door open"),
                    None => *commands_open = false,
                },
            }
        }
    }

    /// Swing closed and come to rest.
    async fn close_cycle(&mut self) {
        if !self.transition(DoorState::Closing) {
            return;
        }
        self.set_moving(true);
        match self.drive(-self.config.swing_degrees).await {
            Ok(MotionEnd::Completed) => {
                self.set_moving(false);
                self.transition(DoorState::Closed);
                // At rest the stepper must not hold torque.
                if let Err(err) = self.actuator.release().await {
                    warn!(error = %err, "coil release failed");
                }
                let _ = self.display.try_send(DisplayEvent::DoorClosed);
                info!("door closed");
            }
            Ok(MotionEnd::EmergencyStopped) => {
                self.set_moving(false);
                self.enter_error("emergency stop while closing");
            }
            Err(err) => {
                self.set_moving(false);
                self.fault("close swing failed", &err);
            }
        }
    }

    /// Run one swing while keeping the mailbox drained for an emergency
    /// stop. Any other command arriving mid-motion is dropped.
    async fn drive(&mut self, degrees: f32) -> fingate_core::Result<MotionEnd> {
        let interval = Duration::from_millis(u64::from(self.config.step_interval_ms));
        let Self {
            actuator,
            commands,
            commands_open,
            ..
        } = self;
        let result = {
            let mut motion = pin!(actuator.swing(degrees, interval));
            loop {
                tokio::select! {
                    result = motion.as_mut() => break result.map(|()| MotionEnd::Completed),
                    cmd = commands.recv(), if *commands_open => match cmd {
                        Some(DoorCommand::EmergencyStop) => break Ok(MotionEnd::EmergencyStopped),
                        Some(cmd) => debug!(%cmd, "command dropped while door in motion"),
                        None => *commands_open = false,
                    },
                }
            }
        };
        if matches!(result, Ok(MotionEnd::EmergencyStopped)) {
            self.actuator.halt().await;
        }
        result
    }

    /// Apply a transition if it is legal in the current state.
    fn transition(&mut self, to: DoorState) -> bool {
        if !self.state.can_transition_to(to) {
            debug!(from = %self.state, to = %to, "transition rejected");
            return false;
        }
        debug!(from = %self.state, to = %to, "door state");
        self.state = to;
        self.publish_status();
        true
    }

    fn enter_error(&mut self, reason: &str) {
        warn!(from = %self.state, reason, "door entering error state");
        self.state = DoorState::Error;
        self.is_moving = false;
        self.publish_status();
        let _ = self.display.try_send(DisplayEvent::Error);
    }

    fn fault(&mut self, what: &str, err: &fingate_core::Error) {
        warn!(error = %err, "{what}");
        self.enter_error(what);
    }

    fn set_dwell(&mut self, ms: u32) {
        if ms == 0 {
            debug!("zero dwell update ignored");
            return;
        }
        self.config.open_dwell_ms = ms;
        self.publish_status();
    }

    fn set_speed(&mut self, ms: u32) {
        if ms == 0 {
            debug!("zero speed update ignored");
            return;
        }
        self.config.step_interval_ms = ms;
        self.publish_status();
    }

    fn set_moving(&mut self, moving: bool) {
        self.is_moving = moving;
        self.publish_status();
    }

    fn snapshot(
        state: DoorState,
        config: &DoorConfig,
        is_moving: bool,
        operation_count: u32,
    ) -> DoorStatus {
        DoorStatus {
            state,
            open_dwell_ms: config.open_dwell_ms,
            speed_ms: config.step_interval_ms,
            is_moving,
            operation_count,
        }
    }

    fn publish_status(&self) {
        self.status.send_replace(Self::snapshot(
            self.state,
            &self.config,
            self.is_moving,
            self.operation_count,
        ));
    }
}
