//! Set commands
//!
//! SADD, SREM, SMEMBERS, SISMEMBER, SCARD, SRANDMEMBER, SPOP, and the
//! SDIFF / SINTER / SUNION family with their *STORE variants.

use super::{Command, CommandError, CommandResult, bulk_array, count_reply, parse_int};
use crate::protocol::RespValue;
use crate::store::{Keyspace, Value};
use bytes::Bytes;
use rand::seq::IteratorRandom;
use std::collections::HashSet;

fn set_mut<'a>(ks: &'a mut Keyspace, key: &[u8]) -> Result<Option<&'a mut HashSet<Bytes>>, CommandError> {
    match ks.get_mut(key) {
        Some(Value::Set(set)) => Ok(Some(set)),
        Some(_) => Err(CommandError::WrongType),
        None => Ok(None),
    }
}

fn set_or_create<'a>(ks: &'a mut Keyspace, key: &Bytes) -> Result<&'a mut HashSet<Bytes>, CommandError> {
    match ks.get_or_insert_with(key, Value::empty_set) {
        Value::Set(set) => Ok(set),
        _ => Err(CommandError::WrongType),
    }
}

/// Copy of the set at `key`; a missing key reads as the empty set
fn read_set(ks: &mut Keyspace, key: &[u8]) -> Result<HashSet<Bytes>, CommandError> {
    Ok(set_mut(ks, key)?.map(|set| set.clone()).unwrap_or_default())
}

/// SADD command - Add one or more members to a set
///
/// Syntax: SADD key member [member ...]
pub struct SAddCommand;

impl Command for SAddCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let set = set_or_create(ks, &args[0])?;
        let added = args[1..]
            .iter()
            .filter(|member| set.insert((*member).clone()))
            .count();
        Ok(count_reply(added))
    }

    fn name(&self) -> &'static str {
        "SADD"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// SREM command - Remove one or more members from a set
///
/// Syntax: SREM key member [member ...]
pub struct SRemCommand;

impl Command for SRemCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let removed = match set_mut(ks, &args[0])? {
            Some(set) => args[1..].iter().filter(|member| set.remove(*member)).count(),
            None => 0,
        };
        ks.remove_if_empty(&args[0]);
        Ok(count_reply(removed))
    }

    fn name(&self) -> &'static str {
        "SREM"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// SMEMBERS command - Get all members of a set
///
/// Syntax: SMEMBERS key
pub struct SMembersCommand;

impl Command for SMembersCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        Ok(bulk_array(read_set(ks, &args[0])?))
    }

    fn name(&self) -> &'static str {
        "SMEMBERS"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// SISMEMBER command - Is a value a member of a set
///
/// Syntax: SISMEMBER key member
pub struct SIsMemberCommand;

impl Command for SIsMemberCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let found = set_mut(ks, &args[0])?.is_some_and(|set| set.contains(&args[1]));
        Ok(RespValue::Integer(found as i64))
    }

    fn name(&self) -> &'static str {
        "SISMEMBER"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

/// SCARD command - Number of members in a set
///
/// Syntax: SCARD key
pub struct SCardCommand;

impl Command for SCardCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let len = set_mut(ks, &args[0])?.map_or(0, |set| set.len());
        Ok(count_reply(len))
    }

    fn name(&self) -> &'static str {
        "SCARD"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// SRANDMEMBER command - Random members of a set, without removing them
///
/// Syntax: SRANDMEMBER key [count]
///
/// A positive count returns distinct members, a negative count returns
/// exactly |count| members that may repeat.
pub struct SRandMemberCommand;

impl Command for SRandMemberCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let count = args.get(1).map(|arg| parse_int(arg)).transpose()?;
        let set = match set_mut(ks, &args[0])? {
            Some(set) => set,
            None => {
                return Ok(match count {
                    Some(_) => RespValue::Array(Vec::new()),
                    None => RespValue::Null,
                })
            }
        };

        let mut rng = rand::rng();
        Ok(match count {
            None => set
                .iter()
                .choose(&mut rng)
                .cloned()
                .map_or(RespValue::Null, RespValue::BulkString),
            Some(n) if n >= 0 => bulk_array(
                set.iter()
                    .choose_multiple(&mut rng, n as usize)
                    .into_iter()
                    .cloned(),
            ),
            Some(n) => {
                let picks = (0..n.unsigned_abs())
                    .filter_map(|_| set.iter().choose(&mut rng).cloned())
                    .collect::<Vec<_>>();
                bulk_array(picks)
            }
        })
    }

    fn name(&self) -> &'static str {
        "SRANDMEMBER"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

/// SPOP command - Remove and return random members of a set
///
/// Syntax: SPOP key [count]
pub struct SPopCommand;

impl Command for SPopCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
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

        let set = match set_mut(ks, &args[0])? {
            Some(set) => set,
            None => {
                return Ok(match count {
                    Some(_) => RespValue::Array(Vec::new()),
                    None => RespValue::Null,
                })
            }
        };

        let mut rng = rand::rng();
        let picked: Vec<Bytes> = set
            .iter()
            .cloned()
            .choose_multiple(&mut rng, count.unwrap_or(1));
        for member in &picked {
            set.remove(member);
        }
        ks.remove_if_empty(&args[0]);

        Ok(match count {
            Some(_) => bulk_array(picked),
            None => picked
                .into_iter()
                .next()
                .map_or(RespValue::Null, RespValue::BulkString),
        })
    }

    fn name(&self) -> &'static str {
        "SPOP"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

#[derive(Clone, Copy)]
enum SetOp {
    Diff,
    Inter,
    Union,
}

/// Combine the sets at `keys` left to right
fn combine(ks: &mut Keyspace, keys: &[Bytes], op: SetOp) -> Result<HashSet<Bytes>, CommandError> {
    let mut result = read_set(ks, &keys[0])?;
    for key in &keys[1..] {
        let other = read_set(ks, key)?;
        match op {
            SetOp::Diff => result.retain(|member| !other.contains(member)),
            SetOp::Inter => result.retain(|member| other.contains(member)),
            SetOp::Union => result.extend(other),
        }
    }
    Ok(result)
}

/// Store `members` at `dest` as a set, replacing what was there
fn store(ks: &mut Keyspace, dest: &Bytes, members: HashSet<Bytes>) -> RespValue {
    let len = members.len();
    if members.is_empty() {
        ks.delete(dest);
    } else {
        ks.set(dest.clone(), Value::Set(members));
    }
    count_reply(len)
}

/// SDIFF command - Members of the first set missing from all the others
///
/// Syntax: SDIFF key [key ...]
pub struct SDiffCommand;

impl Command for SDiffCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        Ok(bulk_array(combine(ks, args, SetOp::Diff)?))
    }

    fn name(&self) -> &'static str {
        "SDIFF"
    }

    fn min_args(&self) -> usize {
        1
    }
}

/// SINTER command - Members present in every set
///
/// Syntax: SINTER key [key ...]
pub struct SInterCommand;

impl Command for SInterCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        Ok(bulk_array(combine(ks, args, SetOp::Inter)?))
    }

    fn name(&self) -> &'static str {
        "SINTER"
    }

    fn min_args(&self) -> usize {
        1
    }
}

/// SUNION command - Members present in any set
///
/// Syntax: SUNION key [key ...]
pub struct SUnionCommand;

impl Command for SUnionCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        Ok(bulk_array(combine(ks, args, SetOp::Union)?))
    }

    fn name(&self) -> &'static str {
        "SUNION"
    }

    fn min_args(&self) -> usize {
        1
    }
}

/// SDIFFSTORE command - SDIFF into a destination key
///
/// Syntax: SDIFFSTORE destination key [key ...]
pub struct SDiffStoreCommand;

impl Command for SDiffStoreCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let members = combine(ks, &args[1..], SetOp::Diff)?;
        Ok(store(ks, &args[0], members))
    }

    fn name(&self) -> &'static str {
        "SDIFFSTORE"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// SINTERSTORE command - SINTER into a destination key
///
/// Syntax: SINTERSTORE destination key [key ...]
pub struct SInterStoreCommand;

impl Command for SInterStoreCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let members = combine(ks, &args[1..], SetOp::Inter)?;
        Ok(store(ks, &args[0], members))
    }

    fn name(&self) -> &'static str {
        "SINTERSTORE"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// SUNIONSTORE command - SUNION into a destination key
///
/// Syntax: SUNIONSTORE destination key [key ...]
pub struct SUnionStoreCommand;

impl Command for SUnionStoreCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let members = combine(ks, &args[1..], SetOp::Union)?;
        Ok(store(ks, &args[0], members))
    }

    fn name(&self) -> &'static str {
        "SUNIONSTORE"
    }

    fn min_args(&self) -> usize {
        2
    }
}
