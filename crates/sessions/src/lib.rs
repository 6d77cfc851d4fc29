//! Link sessions for handshake-based channels.
//!
//! The chat channel cannot be pushed to until the recipient has started the
//! bot. Submitting a delivery for an unlinked chat handle issues a
//! short-lived session instead of sending; the recipient completes the
//! handshake out of band, the stored request is dispatched, and the UI polls
//! the session until it is sent or expired.

pub mod error;
pub mod store;

pub use {
    error::{Error, Result},
    store::{DEFAULT_SESSION_TTL, HandshakeOutcome, LinkSessionStore, SessionStatus},
};
