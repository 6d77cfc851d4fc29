//! Intake validation and ordered-fallback dispatch.
//!
//! Attempt order is always `[preferred] ++ (canonical \ preferred)` with the
//! canonical order email → sms → chat, so results are reproducible across
//! retries of the same request. The first success short-circuits; a full
//! pass of failures is the terminal failure state.

pub mod dispatch;
pub mod intake;

pub use {
    dispatch::{DispatchOutcome, Dispatcher, HandshakeStart, attempt_order, needs_handshake},
    intake::{ValidationError, normalize_phone, validate},
};
