//! Unrepost Session - Sequential scan-and-remove orchestration.
//!
//! A [`RemovalSession`] drives one account's cleanup: scan the repost list,
//! persist the result, then walk the batch deleting one item at a time with
//! human-ish pacing between removals. Progress is reported through a
//! [`SessionObserver`] and a batch can be cancelled between items at any
//! point.
//!
//! The session talks to the engines through the [`RepostClient`] trait, so
//! it runs identically over in-process engines ([`EngineClient`]) or over
//! the relay boundary ([`unrepost_relay::RelayClient`]).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use client::{EngineClient, RepostClient};
pub use error::{Result, SessionError};
pub use session::{BatchTally, RemovalSession, SessionObserver, SessionPhase};
