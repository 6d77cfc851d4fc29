use thiserror::Error;

/// Baseline error for the shared types crate; leaf crates define their own
/// richer enums.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
