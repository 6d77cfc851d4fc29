use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The token was never issued, or its session has been evicted.
    #[error("session not found")]
    NotFound,

    /// The session's TTL elapsed before the transition was attempted.
    #[error("session expired")]
    Expired,

    /// `mark_sent` was called before the handshake completed.
    #[error("session is not linked yet")]
    NotLinked,
}

pub type Result<T> = std::result::Result<T, Error>;
