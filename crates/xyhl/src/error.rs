use std::{io, sync::mpsc};

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the store, the controller and the UI dispatcher.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// Reading or writing the geometry file failed.
    #[error("io: {0}")]
    Io(String),
    /// The geometry file could not be encoded or decoded.
    #[error("serde: {0}")]
    Serde(String),
    /// A value object was constructed from invalid input.
    #[error("invalid: {0}")]
    Invalid(String),
    /// A command could not be handed to the UI thread.
    #[error("dispatch: {0}")]
    Dispatch(String),
    /// An internal invariant did not hold.
    #[error("internal: {0}")]
    Internal(String),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

impl<T> From<mpsc::SendError<T>> for Error {
    fn from(e: mpsc::SendError<T>) -> Self {
        Self::Dispatch(e.to_string())
    }
}
