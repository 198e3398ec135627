use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write to server: {0}")]
    Write(#[source] io::Error),
    #[error("Failed to read from server: {0}")]
    Read(#[source] io::Error),
    #[error("Console I/O failed: {0}")]
    Console(#[source] io::Error),
    #[error("connection closed by server")]
    ConnectionClosed,
    #[error("input closed")]
    InputClosed,
    #[error("no reply to ls within {0:?}")]
    ReplyTimeout(Duration),
    #[error("invalid username {0:?} (max 20 characters, no spaces)")]
    InvalidName(String),
    #[error("invalid config file: {0}")]
    Config(#[from] serde_json::Error),
}
