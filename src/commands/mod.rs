//! Command execution
//!
//! Every command the in-memory client understands implements [`Command`].
//! Commands are grouped by the kind of value they touch, one file per group.

mod registry;

mod string;
mod key;
mod ttl;
mod counter;
mod list;
mod set;
mod zset;
mod hash;
mod admin;
mod search;

pub use registry::CommandRegistry;

use crate::protocol::RespValue;
use crate::store::{Entry, Keyspace};
use bytes::Bytes;
use std::fmt;
use std::time::{Duration, Instant};

/// What a command replies with; errors become error frames
pub type CommandResult = Result<RespValue, CommandError>;

/// Command execution trait
pub trait Command: Send + Sync {
    /// Execute against the keyspace
    ///
    /// `args` excludes the command name. Arity has already been checked
    /// against `min_args` / `max_args` by the dispatcher.
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult;

    /// Command name, upper case
    fn name(&self) -> &'static str;

    fn min_args(&self) -> usize {
        0
    }

    /// None = unlimited
    fn max_args(&self) -> Option<usize> {
        None
    }
}

/// Failures a command reports back as an error frame
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    WrongType,
    NotAnInteger,
    NotAFloat,
    Syntax,
    Other(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::WrongType => {
                write!(f, "WRONGTYPE Operation against a key holding the wrong kind of value")
            }
            CommandError::NotAnInteger => write!(f, "ERR value is not an integer or out of range"),
            CommandError::NotAFloat => write!(f, "ERR value is not a valid float"),
            CommandError::Syntax => write!(f, "ERR syntax error"),
            CommandError::Other(msg) => write!(f, "ERR {}", msg),
        }
    }
}

impl From<CommandError> for RespValue {
    fn from(e: CommandError) -> Self {
        RespValue::Error(e.to_string())
    }
}

/// Deadline `ttl` from now; a TTL past the end of the clock is rejected
pub(crate) fn deadline(ttl: Duration, command: &str) -> Result<Instant, CommandError> {
    Entry::deadline(ttl)
        .ok_or_else(|| CommandError::Other(format!("invalid expire time in '{}' command", command)))
}

/// Parse an integer argument
pub(crate) fn parse_int(arg: &[u8]) -> Result<i64, CommandError> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(CommandError::NotAnInteger)
}

/// Parse a float argument; `inf`, `+inf` and `-inf` are accepted, NaN is not
pub(crate) fn parse_float(arg: &[u8]) -> Result<f64, CommandError> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|f| !f.is_nan())
        .ok_or(CommandError::NotAFloat)
}

/// Array of bulk strings
pub(crate) fn bulk_array<I>(items: I) -> RespValue
where
    I: IntoIterator<Item = Bytes>,
{
    RespValue::Array(items.into_iter().map(RespValue::BulkString).collect())
}

pub(crate) fn count_reply(n: usize) -> RespValue {
    RespValue::Integer(n as i64)
}

/// Resolve a Redis-style inclusive index pair against a length
///
/// Negative indices count from the end. Returns None when the range selects
/// nothing.
pub(crate) fn resolve_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(0, -1, 5), Some((0, 4)));
        assert_eq!(resolve_range(1, 2, 5), Some((1, 2)));
        assert_eq!(resolve_range(-2, -1, 5), Some((3, 4)));
        assert_eq!(resolve_range(0, 100, 3), Some((0, 2)));
        assert_eq!(resolve_range(-100, 0, 3), Some((0, 0)));
        assert_eq!(resolve_range(3, 1, 5), None);
        assert_eq!(resolve_range(5, 10, 5), None);
        assert_eq!(resolve_range(0, -1, 0), None);
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_int(b"-12"), Ok(-12));
        assert_eq!(parse_int(b"1.5"), Err(CommandError::NotAnInteger));
        assert_eq!(parse_float(b"1.5"), Ok(1.5));
        assert_eq!(parse_float(b"-inf"), Ok(f64::NEG_INFINITY));
        assert_eq!(parse_float(b"nan"), Err(CommandError::NotAFloat));
    }

    #[test]
    fn test_error_frames() {
        assert_eq!(
            RespValue::from(CommandError::WrongType),
            RespValue::error("WRONGTYPE Operation against a key holding the wrong kind of value")
        );
        assert_eq!(
            RespValue::from(CommandError::Other("boom".to_string())),
            RespValue::error("ERR boom")
        );
    }
}
