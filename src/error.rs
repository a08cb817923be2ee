//! Crate-wide error types.
//!
//! Each fallible subsystem gets its own focused `thiserror` enum (see
//! [`EncodingError`]); [`BridgeError`] is the top-level type returned by the
//! session driver, wrapping the others plus transport/protocol failures.

use thiserror::Error;

use crate::tile::Label;

/// Failure to find a concrete server-index tile in a hand matching a requested label.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("no tile matching {label} found in hand {hand:?}")]
    NoMatchingTile { label: Label, hand: Vec<u8> },
}

/// Top-level error for the session driver and event router.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("AI connection rejected: room code {0:?} does not match the room-code grammar")]
    InvalidRoom(String),

    #[error("AI sent malformed JSON: {0}")]
    MalformedAiMessage(#[from] serde_json::Error),

    #[error("AI socket closed unexpectedly")]
    AiClosed,

    #[error("remote socket closed unexpectedly")]
    RemoteClosed,

    #[error("remote transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("server message missing required field {0:?}: {1:?}")]
    MissingField(&'static str, serde_json::Value),

    #[error("unrecognized server tag {0:?}")]
    UnrecognizedTag(String),
}
