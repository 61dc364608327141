//! Counter commands (INCR, INCRBY)
//!
//! Counters are plain strings holding decimal text, so GET and the numeric
//! getters see the same value INCR wrote.

use super::{Command, CommandError, CommandResult, parse_int};
use crate::protocol::RespValue;
use crate::store::{Keyspace, Value};
use bytes::Bytes;

/// Add `delta` to the integer at `key`, creating it at zero
fn increment(ks: &mut Keyspace, key: &Bytes, delta: i64) -> CommandResult {
    match ks.get_or_insert_with(key, || Value::string("0")) {
        Value::String(current) => {
            let value = parse_int(current)?;
            let value = value
                .checked_add(delta)
                .ok_or_else(|| CommandError::Other("increment or decrement would overflow".to_string()))?;
            *current = Bytes::from(value.to_string());
            Ok(RespValue::Integer(value))
        }
        _ => Err(CommandError::WrongType),
    }
}

/// INCR command - Increment the integer value of a key by 1
///
/// Syntax: INCR key
pub struct IncrCommand;

impl Command for IncrCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        increment(ks, &args[0], 1)
    }

    fn name(&self) -> &'static str {
        "INCR"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// INCRBY command - Increment the integer value of a key by the given amount
///
/// Syntax: INCRBY key increment
pub struct IncrByCommand;

impl Command for IncrByCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let delta = parse_int(&args[1])?;
        increment(ks, &args[0], delta)
    }

    fn name(&self) -> &'static str {
        "INCRBY"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incr_new_key() {
        let mut ks = Keyspace::new();
        assert_eq!(IncrCommand.execute(&mut ks, &[Bytes::from("c")]), Ok(RespValue::Integer(1)));
        assert_eq!(IncrCommand.execute(&mut ks, &[Bytes::from("c")]), Ok(RespValue::Integer(2)));
        assert_eq!(ks.get(b"c"), Some(&Value::string("2")));
    }

    #[test]
    fn test_incrby_negative() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("c"), Value::string("10"));
        let args = vec![Bytes::from("c"), Bytes::from("-15")];
        assert_eq!(IncrByCommand.execute(&mut ks, &args), Ok(RespValue::Integer(-5)));
    }

    #[test]
    fn test_incr_not_a_number() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("c"), Value::string("abc"));
        assert_eq!(IncrCommand.execute(&mut ks, &[Bytes::from("c")]), Err(CommandError::NotAnInteger));
        assert_eq!(ks.get(b"c"), Some(&Value::string("abc")));
    }

    #[test]
    fn test_incr_overflow() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("c"), Value::string(i64::MAX.to_string()));
        assert!(IncrCommand.execute(&mut ks, &[Bytes::from("c")]).is_err());
    }

    #[test]
    fn test_incr_wrong_type() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("c"), Value::empty_hash());
        assert_eq!(IncrCommand.execute(&mut ks, &[Bytes::from("c")]), Err(CommandError::WrongType));
    }
}
