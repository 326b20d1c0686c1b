//! Hardware-free demo of the full controller.
//!
//! Wires every task over the in-memory mocks, scripts one fingerprint
//! match, and lets the door run a complete open/dwell/auto-close cycle.
//! Useful for watching the log output of the whole pipeline without a
//! sensor or a stepper attached:
//!
//! ```text
//! RUST_LOG=debug cargo run -p fingate-orchestrator --bin demo
//! ```

use anyhow::Result;
use fingate_biometric::FingerprintSession;
use fingate_core::{DoorConfig, DoorState, SessionConfig};
use fingate_door::{DoorController, MockActuator};
use fingate_orchestrator::{LogDisplay, Mailboxes, MockBus, Notifier, NotifierConfig, run_display};
use fingate_sensor::command::{ACK_NO_FINGER, ACK_OK};
use fingate_sensor::testing::build_ack;
use fingate_sensor::{MockTransport, SensorCodec};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mailboxes = Mailboxes::new();

    // One finger placement matching slot 42, then an idle sensor.
    let transport = MockTransport::new();
    transport.push_response(build_ack(ACK_OK, &[]));
    transport.push_response(build_ack(ACK_OK, &[]));
    transport.push_response(build_ack(ACK_OK, &[0x00, 0x2A, 0x00, 0x64]));
    transport.set_default_response(build_ack(ACK_NO_FINGER, &[]));

    let actuator = MockActuator::new();
    let bus = MockBus::new();

    tokio::spawn(
        FingerprintSession::new(
            SensorCodec::new(transport.clone()),
            SessionConfig::default(),
            mailboxes.session,
        )
        .run(),
    );
    tokio::spawn(
        DoorController::new(
            actuator,
            DoorConfig::default(),
            mailboxes.door_mailbox,
            mailboxes.door_status_tx,
            mailboxes.display_events.clone(),
        )
        .run(),
    );
    tokio::spawn(
        Notifier::new(
            bus.clone(),
            NotifierConfig::default(),
            mailboxes.outcomes,
            mailboxes.door_commands.clone(),
        )
        .run(),
    );
    tokio::spawn(run_display(LogDisplay, mailboxes.display_mailbox));

    let mut status = mailboxes.door_status;
    status.wait_for(|s| s.state == DoorState::Open).await?;
    status
        .wait_for(|s| s.state == DoorState::Closed && s.operation_count == 1)
        .await?;

    info!(frames = ?bus.frames(), "cycle complete");
    Ok(())
}
