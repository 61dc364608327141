//! Hash commands
//!
//! HSET, HGET, HMGET, HGETALL, HKEYS, HVALS, HEXISTS, HDEL, HLEN, HINCRBY,
//! HINCRBYFLOAT.

use super::{Command, CommandError, CommandResult, bulk_array, count_reply, parse_float, parse_int};
use crate::protocol::{format_float, RespValue};
use crate::store::{Keyspace, Value};
use bytes::Bytes;
use std::collections::HashMap;

fn hash_mut<'a>(ks: &'a mut Keyspace, key: &[u8]) -> Result<Option<&'a mut HashMap<Bytes, Bytes>>, CommandError> {
    match ks.get_mut(key) {
        Some(Value::Hash(hash)) => Ok(Some(hash)),
        Some(_) => Err(CommandError::WrongType),
        None => Ok(None),
    }
}

fn hash_or_create<'a>(ks: &'a mut Keyspace, key: &Bytes) -> Result<&'a mut HashMap<Bytes, Bytes>, CommandError> {
    match ks.get_or_insert_with(key, Value::empty_hash) {
        Value::Hash(hash) => Ok(hash),
        _ => Err(CommandError::WrongType),
    }
}

/// HSET command - Set fields in the hash stored at key
///
/// Syntax: HSET key field value [field value ...]
///
/// Replies the number of fields that were added (not updated).
pub struct HSetCommand;

impl Command for HSetCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        if (args.len() - 1) % 2 != 0 {
            return Err(CommandError::Other("wrong number of arguments for 'HSET' command".to_string()));
        }

        let hash = hash_or_create(ks, &args[0])?;
        let added = args[1..]
            .chunks_exact(2)
            .filter(|pair| hash.insert(pair[0].clone(), pair[1].clone()).is_none())
            .count();
        Ok(count_reply(added))
    }

    fn name(&self) -> &'static str {
        "HSET"
    }

    fn min_args(&self) -> usize {
        3
    }
}

/// HGET command - Value of a field
///
/// Syntax: HGET key field
pub struct HGetCommand;

impl Command for HGetCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let value = hash_mut(ks, &args[0])?.and_then(|hash| hash.get(&args[1]).cloned());
        Ok(value.map_or(RespValue::Null, RespValue::BulkString))
    }

    fn name(&self) -> &'static str {
        "HGET"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

/// HMGET command - Values of several fields, null for missing ones
///
/// Syntax: HMGET key field [field ...]
pub struct HMGetCommand;

impl Command for HMGetCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let hash = hash_mut(ks, &args[0])?;
        let values = args[1..]
            .iter()
            .map(|field| {
                hash.as_ref()
                    .and_then(|hash| hash.get(field).cloned())
                    .map_or(RespValue::Null, RespValue::BulkString)
            })
            .collect();
        Ok(RespValue::Array(values))
    }

    fn name(&self) -> &'static str {
        "HMGET"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// HGETALL command - Every field and value, flattened
///
/// Syntax: HGETALL key
pub struct HGetAllCommand;

impl Command for HGetAllCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let pairs = match hash_mut(ks, &args[0])? {
            Some(hash) => hash
                .iter()
                .flat_map(|(field, value)| [field.clone(), value.clone()])
                .collect::<Vec<_>>(),
            None => Vec::new(),
        };
        Ok(bulk_array(pairs))
    }

    fn name(&self) -> &'static str {
        "HGETALL"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// HKEYS command - Every field name
///
/// Syntax: HKEYS key
pub struct HKeysCommand;

impl Command for HKeysCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let fields = hash_mut(ks, &args[0])?
            .map(|hash| hash.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(bulk_array(fields))
    }

    fn name(&self) -> &'static str {
        "HKEYS"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// HVALS command - Every value
///
/// Syntax: HVALS key
pub struct HValsCommand;

impl Command for HValsCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let values = hash_mut(ks, &args[0])?
            .map(|hash| hash.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(bulk_array(values))
    }

    fn name(&self) -> &'static str {
        "HVALS"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// HEXISTS command - Does a field exist
///
/// Syntax: HEXISTS key field
pub struct HExistsCommand;

impl Command for HExistsCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let found = hash_mut(ks, &args[0])?.is_some_and(|hash| hash.contains_key(&args[1]));
        Ok(RespValue::Integer(found as i64))
    }

    fn name(&self) -> &'static str {
        "HEXISTS"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

/// HDEL command - Delete fields
///
/// Syntax: HDEL key field [field ...]
///
/// Replies the number of fields removed.
pub struct HDelCommand;

impl Command for HDelCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let removed = match hash_mut(ks, &args[0])? {
            Some(hash) => args[1..].iter().filter(|field| hash.remove(*field).is_some()).count(),
            None => 0,
        };
        ks.remove_if_empty(&args[0]);
        Ok(count_reply(removed))
    }

    fn name(&self) -> &'static str {
        "HDEL"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// HLEN command - Number of fields
///
/// Syntax: HLEN key
pub struct HLenCommand;

impl Command for HLenCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let len = hash_mut(ks, &args[0])?.map_or(0, |hash| hash.len());
        Ok(count_reply(len))
    }

    fn name(&self) -> &'static str {
        "HLEN"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// HINCRBY command - Increment the integer value of a field
///
/// Syntax: HINCRBY key field increment
pub struct HIncrByCommand;

impl Command for HIncrByCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let delta = parse_int(&args[2])?;
        let hash = hash_or_create(ks, &args[0])?;

        let current = match hash.get(&args[1]) {
            Some(raw) => parse_int(raw).map_err(|_| CommandError::Other("hash value is not an integer".to_string()))?,
            None => 0,
        };
        let value = current
            .checked_add(delta)
            .ok_or_else(|| CommandError::Other("increment or decrement would overflow".to_string()))?;

        hash.insert(args[1].clone(), Bytes::from(value.to_string()));
        Ok(RespValue::Integer(value))
    }

    fn name(&self) -> &'static str {
        "HINCRBY"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
}

/// HINCRBYFLOAT command - Increment the float value of a field
///
/// Syntax: HINCRBYFLOAT key field increment
pub struct HIncrByFloatCommand;

impl Command for HIncrByFloatCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let delta = parse_float(&args[2])?;
        let hash = hash_or_create(ks, &args[0])?;

        let current = match hash.get(&args[1]) {
            Some(raw) => parse_float(raw).map_err(|_| CommandError::Other("hash value is not a float".to_string()))?,
            None => 0.0,
        };
        let value = current + delta;
        if !value.is_finite() {
            return Err(CommandError::Other("increment would produce NaN or Infinity".to_string()));
        }

        let text = Bytes::from(format_float(value));
        hash.insert(args[1].clone(), text.clone());
        Ok(RespValue::BulkString(text))
    }

    fn name(&self) -> &'static str {
        "HINCRBYFLOAT"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
}
