//! List commands (LPUSH, RPUSH, LPOP, RPOP, LRANGE, LINDEX, LLEN, LREM)

use super::{Command, CommandError, CommandResult, bulk_array, count_reply, parse_int, resolve_range};
use crate::protocol::RespValue;
use crate::store::{Keyspace, Value};
use bytes::Bytes;
use std::collections::VecDeque;

/// The list at `key`, if there is one
fn list_mut<'a>(ks: &'a mut Keyspace, key: &[u8]) -> Result<Option<&'a mut VecDeque<Bytes>>, CommandError> {
    match ks.get_mut(key) {
        Some(Value::List(list)) => Ok(Some(list)),
        Some(_) => Err(CommandError::WrongType),
        None => Ok(None),
    }
}

/// The list at `key`, created empty when missing
fn list_or_create<'a>(ks: &'a mut Keyspace, key: &Bytes) -> Result<&'a mut VecDeque<Bytes>, CommandError> {
    match ks.get_or_insert_with(key, Value::empty_list) {
        Value::List(list) => Ok(list),
        _ => Err(CommandError::WrongType),
    }
}

#[derive(Clone, Copy)]
enum End {
    Head,
    Tail,
}

fn push(ks: &mut Keyspace, args: &[Bytes], end: End) -> CommandResult {
    let list = list_or_create(ks, &args[0])?;
    for value in &args[1..] {
        match end {
            End::Head => list.push_front(value.clone()),
            End::Tail => list.push_back(value.clone()),
        }
    }
    Ok(count_reply(list.len()))
}

fn pop(ks: &mut Keyspace, args: &[Bytes], end: End) -> CommandResult {
    let count = match args.get(1) {
        Some(arg) => {
            let n = parse_int(arg)?;
            if n < 0 {
                return Err(CommandError::Other("value is out of range, must be positive".to_string()));
            }
            Some(n as usize)
        }
        None => None,
    };

    let list = match list_mut(ks, &args[0])? {
        Some(list) => list,
        None => return Ok(RespValue::Null),
    };

    let mut take = || match end {
        End::Head => list.pop_front(),
        End::Tail => list.pop_back(),
    };
    let reply = match count {
        None => take().map_or(RespValue::Null, RespValue::BulkString),
        Some(n) => bulk_array(std::iter::from_fn(take).take(n)),
    };

    ks.remove_if_empty(&args[0]);
    Ok(reply)
}

/// LPUSH command - Prepend one or multiple values to a list
///
/// Syntax: LPUSH key value [value ...]
pub struct LPushCommand;

impl Command for LPushCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        push(ks, args, End::Head)
    }

    fn name(&self) -> &'static str {
        "LPUSH"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// RPUSH command - Append one or multiple values to a list
///
/// Syntax: RPUSH key value [value ...]
pub struct RPushCommand;

impl Command for RPushCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        push(ks, args, End::Tail)
    }

    fn name(&self) -> &'static str {
        "RPUSH"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// LPOP command - Remove and return the first element(s) of a list
///
/// Syntax: LPOP key [count]
pub struct LPopCommand;

impl Command for LPopCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        pop(ks, args, End::Head)
    }

    fn name(&self) -> &'static str {
        "LPOP"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

/// RPOP command - Remove and return the last element(s) of a list
///
/// Syntax: RPOP key [count]
pub struct RPopCommand;

impl Command for RPopCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        pop(ks, args, End::Tail)
    }

    fn name(&self) -> &'static str {
        "RPOP"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

/// LRANGE command - Get a range of elements from a list
///
/// Syntax: LRANGE key start stop
pub struct LRangeCommand;

impl Command for LRangeCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let start = parse_int(&args[1])?;
        let stop = parse_int(&args[2])?;

        let list = match list_mut(ks, &args[0])? {
            Some(list) => list,
            None => return Ok(RespValue::Array(Vec::new())),
        };

        Ok(match resolve_range(start, stop, list.len()) {
            Some((from, to)) => bulk_array(list.range(from..=to).cloned()),
            None => RespValue::Array(Vec::new()),
        })
    }

    fn name(&self) -> &'static str {
        "LRANGE"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
}

/// LINDEX command - Get an element by its index
///
/// Syntax: LINDEX key index
pub struct LIndexCommand;

impl Command for LIndexCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let index = parse_int(&args[1])?;

        let list = match list_mut(ks, &args[0])? {
            Some(list) => list,
            None => return Ok(RespValue::Null),
        };

        let len = list.len() as i64;
        let index = if index < 0 { len + index } else { index };
        if index < 0 || index >= len {
            return Ok(RespValue::Null);
        }
        Ok(list
            .get(index as usize)
            .cloned()
            .map_or(RespValue::Null, RespValue::BulkString))
    }

    fn name(&self) -> &'static str {
        "LINDEX"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

/// LLEN command - Get the length of a list
///
/// Syntax: LLEN key
pub struct LLenCommand;

impl Command for LLenCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let len = list_mut(ks, &args[0])?.map_or(0, |list| list.len());
        Ok(count_reply(len))
    }

    fn name(&self) -> &'static str {
        "LLEN"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// LREM command - Remove elements equal to a value
///
/// Syntax: LREM key count value
///
/// count > 0 removes from head to tail, count < 0 from tail to head, 0
/// removes every match. Replies the number removed.
pub struct LRemCommand;

impl Command for LRemCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let count = parse_int(&args[1])?;
        let target = &args[2];

        let list = match list_mut(ks, &args[0])? {
            Some(list) => list,
            None => return Ok(RespValue::Integer(0)),
        };

        let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() as usize };
        let mut removed = 0;
        if count >= 0 {
            let mut i = 0;
            while i < list.len() && removed < limit {
                if list[i] == *target {
                    list.remove(i);
                    removed += 1;
                } else {
                    i += 1;
                }
            }
        } else {
            let mut i = list.len();
            while i > 0 && removed < limit {
                i -= 1;
                if list[i] == *target {
                    list.remove(i);
                    removed += 1;
                }
            }
        }

        ks.remove_if_empty(&args[0]);
        Ok(count_reply(removed))
    }

    fn name(&self) -> &'static str {
        "LREM"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
}
