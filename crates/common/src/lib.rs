//! Shared types and error definitions used across all snapsend crates.

pub mod error;
pub mod types;

pub use {
    error::{Error, Result},
    types::{AttemptResult, Channel, DeliveryRequest},
};
