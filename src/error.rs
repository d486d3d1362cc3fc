//! Error types

use thiserror::Error;

/// Key-value storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value for `{key}` is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Word fetch failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network request failed: {0}")]
    Network(String),
    #[error("unexpected response status {0}")]
    Status(u16),
    #[error("response body was not a word list")]
    BadBody,
    #[error("word source exhausted")]
    Exhausted,
}

/// Audio context failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio context unavailable: {0}")]
    Unavailable(String),
    #[error("could not schedule tone: {0}")]
    Schedule(String),
}

/// Card action attempted out of turn
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("cannot {action} while {phase}")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },
    #[error("that answer does not fit the current round")]
    WrongGuess,
    #[error("no cards left to draw")]
    DeckEmpty,
}

/// Top-level error
#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("unknown game `{0}`")]
    UnknownGame(String),
    #[error("render surface unavailable: {0}")]
    Surface(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Turn(#[from] TurnError),
}

pub type Result<T, E = ArcadeError> = std::result::Result<T, E>;
