//! RESP2 value types

use bytes::Bytes;
use std::fmt;

/// A single RESP2 frame
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple strings: +OK\r\n
    SimpleString(String),

    /// Errors: -ERR message\r\n
    Error(String),

    /// Integers: :1000\r\n
    Integer(i64),

    /// Bulk strings: $6\r\nfoobar\r\n
    BulkString(Bytes),

    /// Null bulk string ($-1) or null array (*-1)
    Null,

    /// Arrays: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
    Array(Vec<RespValue>),
}

impl RespValue {
    pub fn simple_string(s: impl Into<String>) -> Self {
        RespValue::SimpleString(s.into())
    }

    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    pub fn integer(i: i64) -> Self {
        RespValue::Integer(i)
    }

    pub fn bulk_string(b: impl Into<Bytes>) -> Self {
        RespValue::BulkString(b.into())
    }

    /// Bulk string holding the decimal text of a float, as Redis replies
    /// to ZSCORE and friends
    pub fn bulk_float(f: f64) -> Self {
        RespValue::BulkString(Bytes::from(format_float(f)))
    }

    pub fn null() -> Self {
        RespValue::Null
    }

    pub fn array(v: Vec<RespValue>) -> Self {
        RespValue::Array(v)
    }

    /// The canonical +OK reply
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }

    /// Raw payload of a scalar reply
    ///
    /// Bulk and simple strings give their bytes, integers their decimal
    /// text. Null, errors and arrays have no scalar payload.
    pub fn into_payload(self) -> Option<Bytes> {
        match self {
            RespValue::BulkString(b) => Some(b),
            RespValue::SimpleString(s) => Some(Bytes::from(s)),
            RespValue::Integer(i) => Some(Bytes::from(i.to_string())),
            _ => None,
        }
    }

    /// Elements of an array reply; a null reply counts as empty
    pub fn into_elements(self) -> Option<Vec<RespValue>> {
        match self {
            RespValue::Array(items) => Some(items),
            RespValue::Null => Some(Vec::new()),
            _ => None,
        }
    }

    /// Short name of the frame kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            RespValue::SimpleString(_) => "simple string",
            RespValue::Error(_) => "error",
            RespValue::Integer(_) => "integer",
            RespValue::BulkString(_) => "bulk string",
            RespValue::Null => "null",
            RespValue::Array(_) => "array",
        }
    }
}

/// Render a float the way Redis prints scores
pub(crate) fn format_float(f: f64) -> String {
    if f.is_infinite() {
        if f > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        f.to_string()
    }
}

/// RESP parsing errors
#[derive(Debug, Clone, PartialEq)]
pub enum RespError {
    /// Unknown type prefix or malformed framing
    InvalidProtocol(String),

    /// Invalid UTF-8 in a simple string or error line
    InvalidUtf8,

    /// A length or integer line did not parse
    InvalidInteger(String),
}

impl fmt::Display for RespError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespError::InvalidProtocol(msg) => write!(f, "Invalid protocol: {}", msg),
            RespError::InvalidUtf8 => write!(f, "Invalid UTF-8"),
            RespError::InvalidInteger(line) => write!(f, "Invalid integer: {}", line),
        }
    }
}

impl std::error::Error for RespError {}
