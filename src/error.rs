//! Error type shared by every engine operation.

use derive_more::{Display, Error};
use std::io;

/// Failure reported to the immediate caller of an engine operation.
///
/// A failed operation never leaves partial state behind: the game and the
/// word bank are either fully updated or untouched.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum HangmanError {
    /// Malformed payload: wrong frame length, non-alphabetic guess, bad word.
    #[display("invalid input: {_0}")]
    InvalidInput(#[error(not(source))] String),

    /// A guess was written after the game reached a terminal status.
    #[display("game is over, restart to play again")]
    GameOver,

    /// A read or seek offset outside the snapshot.
    #[display("offset {_0} is outside the snapshot")]
    InvalidOffset(#[error(not(source))] i64),

    /// Lock acquisition was cancelled before it succeeded.
    #[display("interrupted while waiting for a lock")]
    Interrupted,

    /// The word bank has no words to report.
    #[display("word bank is empty")]
    Empty,

    /// Allocation failed while rebuilding the snapshot.
    #[display("out of memory while rendering the game")]
    ResourceExhausted,
}

pub type Result<T> = std::result::Result<T, HangmanError>;

impl HangmanError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Negative errno-style code, for transports that report integer results.
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            Self::InvalidInput(_) | Self::GameOver => -14, // EFAULT
            Self::InvalidOffset(_) => -22,                 // EINVAL
            Self::Interrupted => -4,                       // EINTR
            Self::Empty => -61,                            // ENODATA
            Self::ResourceExhausted => -12,                // ENOMEM
        }
    }
}

impl From<HangmanError> for io::Error {
    fn from(err: HangmanError) -> Self {
        let kind = match err {
            HangmanError::InvalidInput(_) | HangmanError::InvalidOffset(_) => {
                io::ErrorKind::InvalidInput
            }
            HangmanError::GameOver => io::ErrorKind::Other,
            HangmanError::Interrupted => io::ErrorKind::Interrupted,
            HangmanError::Empty => io::ErrorKind::NotFound,
            HangmanError::ResourceExhausted => io::ErrorKind::OutOfMemory,
        };
        io::Error::new(kind, err)
    }
}
