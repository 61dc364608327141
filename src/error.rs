//! Crate error type
//!
//! Every facade and client call returns `Result<T>`. Errors coming back from
//! the store are passed through as they are; nothing here retries.

use crate::protocol::RespError;
use std::fmt;

/// Errors raised by the facade, the clients and the value coercion layer
#[derive(Debug)]
pub enum Error {
    /// Socket or file error
    Io(std::io::Error),

    /// Malformed RESP data received from the store
    Protocol(RespError),

    /// The store answered with an error reply (e.g. WRONGTYPE)
    Server(String),

    /// The store answered with a reply of an unexpected shape
    UnexpectedReply(String),

    /// A value could not be read as a number
    NotANumber(String),

    /// Object (de)serialization failed
    Json(serde_json::Error),

    /// The connection was closed while a reply was pending
    ConnectionClosed,

    /// An earlier exchange failed part way, so the stream is out of step
    ConnectionBroken,

    /// Connecting to the store took too long
    Timeout,

    /// Invalid client configuration
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Protocol(e) => write!(f, "protocol error: {}", e),
            Error::Server(msg) => write!(f, "store error: {}", msg),
            Error::UnexpectedReply(msg) => write!(f, "unexpected reply: {}", msg),
            Error::NotANumber(raw) => write!(f, "value is not a number: {:?}", raw),
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::ConnectionClosed => write!(f, "connection closed by the store"),
            Error::ConnectionBroken => write!(f, "connection is out of step with the store"),
            Error::Timeout => write!(f, "timed out connecting to the store"),
            Error::Config(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Protocol(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<RespError> for Error {
    fn from(e: RespError) -> Self {
        Error::Protocol(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
