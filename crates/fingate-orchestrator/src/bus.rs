//! Notification egress seam.
//!
//! The deployed link is a CAN-style bus to a companion device; this core
//! only needs fire-and-forget topic frames with small payloads.

use std::sync::{Arc, Mutex};

use fingate_core::{Error, Result, constants::MAX_NOTIFY_PAYLOAD};

/// Outbound notification link.
pub trait NotificationEgress: Send {
    /// Send one frame. `payload` must fit [`MAX_NOTIFY_PAYLOAD`].
    async fn send(&mut self, topic: u16, payload: &[u8]) -> Result<()>;
}

#[derive(Debug, Default)]
struct MockBusState {
    frames: Vec<(u16, Vec<u8>)>,
    failures_pending: usize,
}

/// Recording in-memory bus.
///
/// The handle clones cheaply so a test can inspect sent frames after the
/// notifier takes ownership.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<MockBusState>>,
}

impl MockBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` sends fail with a transport error.
    pub fn fail_next(&self, count: usize) {
        self.state.lock().unwrap().failures_pending = count;
    }

    /// Frames sent so far, in order.
    #[must_use]
    pub fn frames(&self) -> Vec<(u16, Vec<u8>)> {
        self.state.lock().unwrap().frames.clone()
    }
}

impl NotificationEgress for MockBus {
    async fn send(&mut self, topic: u16, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_NOTIFY_PAYLOAD {
            return Err(Error::Protocol(format!(
                "notification payload too long: {} > {MAX_NOTIFY_PAYLOAD}",
                payload.len()
            )));
        }
        let mut state = self.state.lock().unwrap();
        if state.failures_pending > 0 {
            state.failures_pending -= 1;
            return Err(Error::Transport("mock bus down".to_string()));
        }
        state.frames.push((topic, payload.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_bus_records_frames() {
        let mock = MockBus::new();
        let mut bus = mock.clone();
        bus.send(0x123, &[1, 0, 42]).await.unwrap();
        assert_eq!(mock.frames(), vec![(0x123, vec![1, 0, 42])]);
    }

    #[tokio::test]
    async fn test_mock_bus_rejects_oversized_payload() {
        let mut bus = MockBus::new();
        assert!(bus.send(0x123, &[0u8; 9]).await.is_err());
    }

    #[tokio::test]
    async fn test_scripted_failures_are_consumed() {
        let mock = MockBus::new();
        mock.fail_next(1);
        let mut bus = mock.clone();
        assert!(bus.send(0x123, &[0]).await.is_err());
        assert!(bus.send(0x123, &[0]).await.is_ok());
    }
}
