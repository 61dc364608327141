//! TTL commands (EXPIRE, TTL)

use super::{Command, CommandResult, deadline, parse_int};
use crate::protocol::RespValue;
use crate::store::Keyspace;
use bytes::Bytes;
use std::time::{Duration, Instant};

/// EXPIRE command - Set a timeout on a key
///
/// Syntax: EXPIRE key seconds
///
/// Replies 1 when the timeout was set, 0 when the key does not exist. A
/// non-positive timeout deletes the key; one past the end of the clock is
/// an error.
pub struct ExpireCommand;

impl Command for ExpireCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let seconds = parse_int(&args[1])?;
        let expire_at = if seconds <= 0 {
            Instant::now()
        } else {
            deadline(Duration::from_secs(seconds as u64), "expire")?
        };
        let applied = ks.expire(&args[0], expire_at);
        Ok(RespValue::Integer(applied as i64))
    }

    fn name(&self) -> &'static str {
        "EXPIRE"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

/// TTL command - Remaining time to live of a key
///
/// Syntax: TTL key
///
/// Replies the seconds left, -1 when the key has no timeout, -2 when it
/// does not exist.
pub struct TtlCommand;

impl Command for TtlCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        Ok(RespValue::Integer(ks.ttl(&args[0])))
    }

    fn name(&self) -> &'static str {
        "TTL"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandError;
    use crate::store::Value;

    #[test]
    fn test_expire_then_ttl() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("k"), Value::string("v"));

        let args = vec![Bytes::from("k"), Bytes::from("100")];
        assert_eq!(ExpireCommand.execute(&mut ks, &args), Ok(RespValue::Integer(1)));

        let ttl = TtlCommand.execute(&mut ks, &[Bytes::from("k")]).unwrap();
        assert_eq!(ttl, RespValue::Integer(100));
    }

    #[test]
    fn test_ttl_missing_and_persistent() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("k"), Value::string("v"));

        assert_eq!(TtlCommand.execute(&mut ks, &[Bytes::from("k")]), Ok(RespValue::Integer(-1)));
        assert_eq!(TtlCommand.execute(&mut ks, &[Bytes::from("nope")]), Ok(RespValue::Integer(-2)));
    }

    #[test]
    fn test_expire_missing_and_invalid() {
        let mut ks = Keyspace::new();
        let args = vec![Bytes::from("nope"), Bytes::from("10")];
        assert_eq!(ExpireCommand.execute(&mut ks, &args), Ok(RespValue::Integer(0)));

        let args = vec![Bytes::from("nope"), Bytes::from("soon")];
        assert_eq!(ExpireCommand.execute(&mut ks, &args), Err(CommandError::NotAnInteger));
    }

    #[test]
    fn test_expire_past_the_clock() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("k"), Value::string("v"));

        let args = vec![Bytes::from("k"), Bytes::from(i64::MAX.to_string())];
        assert_eq!(
            ExpireCommand.execute(&mut ks, &args),
            Err(CommandError::Other("invalid expire time in 'expire' command".to_string()))
        );
        assert_eq!(ks.ttl(b"k"), -1);
    }
}
