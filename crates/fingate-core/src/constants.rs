//! Timing and sizing constants for the door controller.
//!
//! Most of these values encode latency assumptions of the deployed hardware
//! (sensor processing time, stepper travel, operator dwell expectations) and
//! are surfaced through [`crate::config`] rather than hard-coded at call
//! sites, so a deployment can tune them without touching the state machines.

// ============================================================================
// Sensor link timeouts
// ============================================================================

/// Serial transmit timeout for a request packet (milliseconds).
///
/// A request is at most 32 bytes; at 57600 baud it leaves the wire in well
/// under 10 ms. Transmit failures indicate a wiring fault, not load.
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 10;

/// Serial receive timeout for a response window (milliseconds).
///
/// Deliberately much larger than the transmit timeout: the sensor's own
/// processing dominates; a 1:N search across the full template table can
/// take seconds. Expiry is a recoverable [`crate::Error::TransportTimeout`].
pub const DEFAULT_RECV_TIMEOUT_MS: u64 = 3000;

// ============================================================================
// Fingerprint session timing
// ============================================================================

/// Interval between `GetImage` polls while no finger is present (ms).
///
/// The wait state never busy-spins; this backoff paces the poll loop.
pub const DEFAULT_POLL_BACKOFF_MS: u64 = 100;

/// Delay after publishing an outcome before re-polling the sensor (ms).
///
/// Gives the user time to lift the finger so a single placement is not
/// reported twice.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Cooldown after a sensor/conversion error before returning to idle (ms).
pub const DEFAULT_ERROR_COOLDOWN_MS: u64 = 300;

/// Upper bound on the wait for a remote confirmation after an outcome (ms).
///
/// A silent peer must never wedge the acquisition loop; expiry is logged
/// and the session settles back to idle.
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 3000;

// ============================================================================
// Template store
// ============================================================================

/// Lowest valid template slot.
pub const MIN_TEMPLATE_ID: u16 = 1;

/// Default template slot ceiling (exclusive upper bound is `max + 1`).
///
/// The sensor variant in this deployment exposes 127 slots. This single
/// value bounds both enrollment validation and the free-id index scan.
pub const DEFAULT_MAX_TEMPLATE_ID: u16 = 127;

/// Number of template slots covered by one index-table page.
pub const INDEX_PAGE_SLOTS: u16 = 256;

/// Page count parameter for the 1:N search command.
pub const DEFAULT_SEARCH_PAGE_COUNT: u16 = 163;

// ============================================================================
// Door actuation
// ============================================================================

/// Default time the door stays open before auto-closing (ms).
pub const DEFAULT_OPEN_DWELL_MS: u32 = 3000;

/// Default actuator step interval (ms per step; smaller is faster).
pub const DEFAULT_STEP_INTERVAL_MS: u32 = 2;

/// Rotation applied for a full open (and, mirrored, a full close), degrees.
pub const DOOR_SWING_DEGREES: f32 = 90.0;

// ============================================================================
// Mailboxes
// ============================================================================

/// Depth of the fingerprint-outcome mailbox.
pub const OUTCOME_QUEUE_DEPTH: usize = 4;

/// Depth of the door-command mailbox.
pub const DOOR_QUEUE_DEPTH: usize = 5;

/// Depth of the display-event mailbox.
pub const DISPLAY_QUEUE_DEPTH: usize = 5;

/// Depth of the enroll-request mailbox.
///
/// One pending enrollment at a time; a second request while one is queued
/// is rejected at the sender.
pub const ENROLL_QUEUE_DEPTH: usize = 1;

/// Enqueue timeout for producers on the door-command mailbox (ms).
///
/// Producers never block indefinitely on a stalled consumer.
pub const DEFAULT_ENQUEUE_TIMEOUT_MS: u64 = 100;

// ============================================================================
// Bus topics
// ============================================================================

/// Topic id for outbound authentication-outcome notifications.
pub const OUTCOME_TOPIC: u16 = 0x123;

/// Topic id on which the remote peer acknowledges a notification.
pub const CONFIRMATION_TOPIC: u16 = 0x200;

/// Maximum payload size of a bus notification (bytes).
pub const MAX_NOTIFY_PAYLOAD: usize = 8;
