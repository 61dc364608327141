//! String commands (GET, SET, MGET, MSET, APPEND)

use super::{Command, CommandError, CommandResult, deadline, parse_int};
use crate::protocol::RespValue;
use crate::store::{Keyspace, Value};
use bytes::{Bytes, BytesMut};
use std::time::Duration;

/// Read the string at `key`; None when missing
fn read_string(ks: &mut Keyspace, key: &[u8]) -> Result<Option<Bytes>, CommandError> {
    match ks.get(key) {
        Some(Value::String(bytes)) => Ok(Some(bytes.clone())),
        Some(_) => Err(CommandError::WrongType),
        None => Ok(None),
    }
}

/// SET command - Set a key to a value
///
/// Syntax: SET key value [EX seconds | PX milliseconds] [NX | XX]
pub struct SetCommand;

impl Command for SetCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let key = &args[0];
        let value = &args[1];

        let mut ttl = None;
        let mut only_if_missing = false;
        let mut only_if_present = false;

        let mut options = args[2..].iter();
        while let Some(option) = options.next() {
            match option.to_ascii_uppercase().as_slice() {
                b"EX" | b"PX" => {
                    let amount = options.next().ok_or(CommandError::Syntax)?;
                    let amount = parse_int(amount)?;
                    if amount <= 0 {
                        return Err(CommandError::Other("invalid expire time in 'set' command".to_string()));
                    }
                    let amount = if option.eq_ignore_ascii_case(b"EX") {
                        Duration::from_secs(amount as u64)
                    } else {
                        Duration::from_millis(amount as u64)
                    };
                    ttl = Some(deadline(amount, "set")?);
                }
                b"NX" => only_if_missing = true,
                b"XX" => only_if_present = true,
                _ => return Err(CommandError::Syntax),
            }
        }
        if only_if_missing && only_if_present {
            return Err(CommandError::Syntax);
        }

        let exists = ks.exists(key);
        if (only_if_missing && exists) || (only_if_present && !exists) {
            return Ok(RespValue::Null);
        }

        match ttl {
            Some(expire_at) => ks.set_until(key.clone(), Value::String(value.clone()), expire_at),
            None => ks.set(key.clone(), Value::String(value.clone())),
        }
        Ok(RespValue::ok())
    }

    fn name(&self) -> &'static str {
        "SET"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// GET command - Get the value of a key
///
/// Syntax: GET key
pub struct GetCommand;

impl Command for GetCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        Ok(match read_string(ks, &args[0])? {
            Some(bytes) => RespValue::BulkString(bytes),
            None => RespValue::Null,
        })
    }

    fn name(&self) -> &'static str {
        "GET"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// MGET command - Get the values of several keys
///
/// Syntax: MGET key [key ...]
///
/// Keys that are missing or hold another type reply null.
pub struct MGetCommand;

impl Command for MGetCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let values = args
            .iter()
            .map(|key| match ks.get(key) {
                Some(Value::String(bytes)) => RespValue::BulkString(bytes.clone()),
                _ => RespValue::Null,
            })
            .collect();
        Ok(RespValue::Array(values))
    }

    fn name(&self) -> &'static str {
        "MGET"
    }

    fn min_args(&self) -> usize {
        1
    }
}

/// MSET command - Set several keys at once
///
/// Syntax: MSET key value [key value ...]
pub struct MSetCommand;

impl Command for MSetCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        if args.len() % 2 != 0 {
            return Err(CommandError::Other("wrong number of arguments for 'MSET' command".to_string()));
        }
        for pair in args.chunks_exact(2) {
            ks.set(pair[0].clone(), Value::String(pair[1].clone()));
        }
        Ok(RespValue::ok())
    }

    fn name(&self) -> &'static str {
        "MSET"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// APPEND command - Append to the string at a key
///
/// Syntax: APPEND key value
pub struct AppendCommand;

impl Command for AppendCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        match ks.get_or_insert_with(&args[0], || Value::String(Bytes::new())) {
            Value::String(current) => {
                let mut joined = BytesMut::with_capacity(current.len() + args[1].len());
                joined.extend_from_slice(current);
                joined.extend_from_slice(&args[1]);
                *current = joined.freeze();
                Ok(RespValue::Integer(current.len() as i64))
            }
            _ => Err(CommandError::WrongType),
        }
    }

    fn name(&self) -> &'static str {
        "APPEND"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}
