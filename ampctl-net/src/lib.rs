//! Wire codec and sync session for the amp's settings protocol.
//!
//! The amp is an access point on the local network that accepts one
//! single-line request per TCP connection and answers with one
//! fixed-position record. This crate owns both directions of that
//! translation and the blocking exchange around them.

pub mod session;
pub mod wire;

pub use session::{SyncError, SyncOutcome, SyncSession, DEFAULT_TIMEOUT};
pub use wire::{ProtocolError, FETCH_REQUEST, RESPONSE_TOKENS};
