//! Transport seam between the codec and the physical serial link.
//!
//! The codec only ever writes one frame and reads one fixed-size window,
//! so the seam is two operations with explicit deadlines. Writes complete
//! quickly or the link is wedged; reads wait out the sensor's processing
//! time, so the two deadlines differ by orders of magnitude.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fingate_core::{Error, Result};

/// Byte-level access to the sensor's serial link.
pub trait SensorTransport: Send {
    /// Write one command frame, completing within `timeout`.
    async fn send(&mut self, frame: &[u8], timeout: Duration) -> Result<()>;

    /// Read exactly `len` bytes of response window within `timeout`.
    async fn receive(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>>;
}

/// One scripted reaction of the mock link.
#[derive(Debug, Clone)]
enum ScriptEntry {
    Respond(Vec<u8>),
    FailSend,
    TimeoutReceive,
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<ScriptEntry>,
    default_response: Option<Vec<u8>>,
    sent: Vec<Vec<u8>>,
}

/// Scriptable in-memory transport for tests and hardware-free development.
///
/// Responses are consumed in FIFO order; when the script runs dry the
/// optional default response repeats indefinitely, which models a sensor
/// idling in its "no finger" answer. The handle is cheaply cloneable so a
/// test can keep scripting and inspecting after the codec takes ownership.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one raw response window.
    pub fn push_response(&self, raw: Vec<u8>) {
        self.state.lock().unwrap().script.push_back(ScriptEntry::Respond(raw));
    }

    /// Queue a send failure (broken link).
    pub fn push_send_failure(&self) {
        self.state.lock().unwrap().script.push_back(ScriptEntry::FailSend);
    }

    /// Queue a receive timeout (sensor silent).
    pub fn push_receive_timeout(&self) {
        self.state.lock().unwrap().script.push_back(ScriptEntry::TimeoutReceive);
    }

    /// Set the response repeated once the script is exhausted.
    pub fn set_default_response(&self, raw: Vec<u8>) {
        self.state.lock().unwrap().default_response = Some(raw);
    }

    /// Frames written so far, in order.
    #[must_use]
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Number of frames written so far.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.state.lock().unwrap().sent.len()
    }
}

impl SensorTransport for MockTransport {
    async fn send(&mut self, frame: &[u8], _timeout: Duration) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(ScriptEntry::FailSend) = state.script.front() {
            state.script.pop_front();
            return Err(Error::Transport("mock link down".to_string()));
        }
        state.sent.push(frame.to_vec());
        Ok(())
    }

    async fn receive(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>> {
        let entry = {
            let mut state = self.state.lock().unwrap();
            match state.script.pop_front() {
                Some(entry) => entry,
                None => match &state.default_response {
                    Some(raw) => ScriptEntry::Respond(raw.clone()),
                    None => ScriptEntry::TimeoutReceive,
                },
            }
        };
        match entry {
            ScriptEntry::Respond(raw) => {
                if raw.len() != len {
                    return Err(Error::Protocol(format!(
                        "mock response is {} bytes, codec expected {len}",
                        raw.len()
                    )));
                }
                Ok(raw)
            }
            ScriptEntry::FailSend | ScriptEntry::TimeoutReceive => {
                Err(Error::TransportTimeout {
                    duration_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_script_in_order() {
        let mock = MockTransport::new();
        mock.push_response(vec![1, 2, 3]);
        mock.push_response(vec![4, 5, 6]);

        let mut transport = mock.clone();
        let timeout = Duration::from_millis(10);
        transport.send(&[0xAA], timeout).await.unwrap();
        assert_eq!(transport.receive(3, timeout).await.unwrap(), vec![1, 2, 3]);
        assert_eq!(transport.receive(3, timeout).await.unwrap(), vec![4, 5, 6]);
        assert_eq!(mock.sent_frames(), vec![vec![0xAA]]);
    }

    #[tokio::test]
    async fn test_mock_repeats_default_when_script_dry() {
        let mock = MockTransport::new();
        mock.set_default_response(vec![9, 9]);

        let mut transport = mock.clone();
        let timeout = Duration::from_millis(10);
        for _ in 0..3 {
            assert_eq!(transport.receive(2, timeout).await.unwrap(), vec![9, 9]);
        }
    }

    #[tokio::test]
    async fn test_mock_times_out_without_default() {
        let mock = MockTransport::new();
        let mut transport = mock.clone();
        let err = transport
            .receive(12, Duration::from_millis(3000))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransportTimeout { duration_ms: 3000 }));
    }

    #[tokio::test]
    async fn test_mock_send_failure() {
        let mock = MockTransport::new();
        mock.push_send_failure();
        let mut transport = mock.clone();
        let err = transport
            .send(&[1], Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(mock.sent_count(), 0);
    }
}
