//! Whole-controller flows over mock hardware.

use fingate_biometric::{EnrollRequest, FingerprintSession};
use fingate_core::{DisplayEvent, DoorState, SessionConfig};
use fingate_door::{DoorController, MockActuator};
use fingate_orchestrator::{Mailboxes, MockBus, MockDisplay, Notifier, NotifierConfig, run_display};
use fingate_sensor::command::{ACK_NO_FINGER, ACK_OK};
use fingate_sensor::testing::{build_ack, build_index_page};
use fingate_sensor::{MockTransport, SensorCodec};

struct System {
    transport: MockTransport,
    actuator: MockActuator,
    bus: MockBus,
    display: MockDisplay,
    door_status: tokio::sync::watch::Receiver<fingate_core::DoorStatus>,
    enroll: tokio::sync::mpsc::Sender<EnrollRequest>,
}

fn spawn_system() -> System {
    let mailboxes = Mailboxes::new();
    let transport = MockTransport::new();
    let actuator = MockActuator::new();
    let bus = MockBus::new();
    let display = MockDisplay::new();

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
            actuator.clone(),
            fingate_core::DoorConfig::default(),
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
    tokio::spawn(run_display(display.clone(), mailboxes.display_mailbox));

    System {
        transport,
        actuator,
        bus,
        display,
        door_status: mailboxes.door_status,
        enroll: mailboxes.enroll_requests,
    }
}

#[tokio::test(start_paused = true)]
async fn granted_fingerprint_opens_and_recloses_the_door() {
    let mut system = spawn_system();
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system
        .transport
        .push_response(build_ack(ACK_OK, &[0x00, 0x2A, 0x00, 0x64]));
    system
        .transport
        .set_default_response(build_ack(ACK_NO_FINGER, &[]));

    system
        .door_status
        .wait_for(|s| s.state == DoorState::Open)
        .await
        .unwrap();
    system
        .door_status
        .wait_for(|s| s.state == DoorState::Closed && s.operation_count == 1)
        .await
        .unwrap();

    assert_eq!(system.bus.frames(), vec![(0x123, vec![1, 0, 42])]);
    assert_eq!(system.actuator.swings(), vec![90.0, -90.0]);

    let events = system.display.events();
    assert_eq!(events[0], DisplayEvent::Idle);
    assert!(events.contains(&DisplayEvent::FingerOk));
    assert!(events.contains(&DisplayEvent::DoorOpen));
    assert!(events.contains(&DisplayEvent::DoorClosed));
}

#[tokio::test(start_paused = true)]
async fn rejected_fingerprint_notifies_without_opening() {
    let system = spawn_system();
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system
        .transport
        .push_response(build_ack(0x09, &[0x00, 0x00, 0x00, 0x00])); // no match
    system
        .transport
        .set_default_response(build_ack(ACK_NO_FINGER, &[]));

    // The denial reaches the bus on virtual time.
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    assert_eq!(system.bus.frames(), vec![(0x123, vec![0, 0, 0])]);
    assert!(system.actuator.swings().is_empty());
    assert_eq!(
        system.door_status.borrow().state,
        DoorState::Closed
    );
    assert!(system.display.events().contains(&DisplayEvent::FingerFail));
}

#[tokio::test(start_paused = true)]
async fn enrollment_notifies_but_never_opens() {
    let system = spawn_system();
    // Two captures with a lift in between, then model, slot scan, store.
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system.transport.push_response(build_ack(ACK_NO_FINGER, &[]));
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system.transport.push_response(build_index_page(&[0u8; 32]));
    system.transport.push_response(build_ack(ACK_OK, &[]));
    system
        .transport
        .set_default_response(build_ack(ACK_NO_FINGER, &[]));

    // Queued before the session's first poll, so the request is seen
    // with priority and no verification pass consumes the script.
    system.enroll.try_send(EnrollRequest).unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    assert_eq!(system.bus.frames(), vec![(0x123, vec![1, 0, 1])]);
    assert!(system.actuator.swings().is_empty());
    assert_eq!(
        system.door_status.borrow().state,
        DoorState::Closed
    );
}
