//! HTTP boundary for the dispatch engine.
//!
//! One submission endpoint, a polling endpoint for chat link sessions, the
//! handshake side channel, and the task registry that makes attempt logs
//! observable after a background dispatch finishes.

pub mod delivery_routes;
pub mod server;
pub mod session_routes;
pub mod state;
pub mod subscriber_routes;
pub mod tasks;

pub use {
    server::{AppState, build_app, start_gateway},
    state::GatewayState,
};
