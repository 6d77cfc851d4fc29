use snapsend_common::Channel;

/// Crate-wide result type for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed adapter errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The provider (real or simulated) refused the send.
    #[error("{channel} provider unavailable")]
    Unavailable { channel: Channel },

    /// The adapter does not implement this operation.
    #[error("{channel} adapter does not support {operation}")]
    Unsupported {
        channel: Channel,
        operation: &'static str,
    },
}

impl Error {
    #[must_use]
    pub fn unavailable(channel: Channel) -> Self {
        Self::Unavailable { channel }
    }
}
