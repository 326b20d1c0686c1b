//! Fingerprint acquisition and enrollment for the Fingate door controller.
//!
//! The [`FingerprintSession`] task owns the sensor exclusively and runs the
//! acquisition loop: poll for a finger, convert, search the template
//! library, publish one [`fingate_core::FingerprintOutcome`] per pass.
//! Enrollment requests preempt verification at the top of the poll loop and
//! run the two-capture [`enroll::EnrollMachine`] to completion before
//! polling resumes.
//!
//! Outcomes are published best-effort into a bounded mailbox; a slow or
//! absent consumer can drop an outcome but can never stall acquisition.

#![allow(async_fn_in_trait)]

pub mod enroll;
pub mod session;

pub use enroll::{EnrollMachine, EnrollProgress, EnrollStage};
pub use session::{EnrollRequest, FingerprintSession, SessionChannels};
