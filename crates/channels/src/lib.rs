//! Channel adapters: one `send` seam per outbound channel.
//!
//! Adapters are pure with respect to local state — a send is a function of
//! (recipient, payload) and nothing else. The stub adapters here simulate
//! provider latency and optional random outages; a production deployment
//! swaps them for real provider calls behind the same trait.

pub mod adapter;
pub mod error;
pub mod stub;

pub use {
    adapter::{AdapterRegistry, ChannelAdapter},
    error::{Error, Result},
    stub::{ChatStub, EmailStub, SmsStub, stub_registry},
};
