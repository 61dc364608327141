//! Sorted set commands
//!
//! ZADD, ZREM, ZRANGE, ZREVRANGE, ZRANGEBYSCORE, ZREVRANGEBYSCORE, ZINCRBY,
//! ZCARD, ZCOUNT, ZRANK, ZSCORE.

use super::{Command, CommandError, CommandResult, count_reply, parse_float, parse_int, resolve_range};
use crate::protocol::RespValue;
use crate::store::{Keyspace, SortedSet, Value};
use bytes::Bytes;
use std::ops::Bound;

fn zset_mut<'a>(ks: &'a mut Keyspace, key: &[u8]) -> Result<Option<&'a mut SortedSet>, CommandError> {
    match ks.get_mut(key) {
        Some(Value::ZSet(zset)) => Ok(Some(zset)),
        Some(_) => Err(CommandError::WrongType),
        None => Ok(None),
    }
}

fn zset_or_create<'a>(ks: &'a mut Keyspace, key: &Bytes) -> Result<&'a mut SortedSet, CommandError> {
    match ks.get_or_insert_with(key, Value::empty_zset) {
        Value::ZSet(zset) => Ok(zset),
        _ => Err(CommandError::WrongType),
    }
}

/// Parse a score bound: `1.5`, `(1.5` (exclusive), `-inf`, `+inf`
fn parse_bound(arg: &[u8]) -> Result<Bound<f64>, CommandError> {
    let bad = || CommandError::Other("min or max is not a float".to_string());
    match arg {
        [b'(', rest @ ..] => parse_float(rest).map(Bound::Excluded).map_err(|_| bad()),
        _ => parse_float(arg).map(Bound::Included).map_err(|_| bad()),
    }
}

/// Members, optionally interleaved with their scores
fn scored_reply<'a, I>(items: I, with_scores: bool) -> RespValue
where
    I: Iterator<Item = (&'a Bytes, f64)>,
{
    let mut out = Vec::new();
    for (member, score) in items {
        out.push(RespValue::BulkString(member.clone()));
        if with_scores {
            out.push(RespValue::bulk_float(score));
        }
    }
    RespValue::Array(out)
}

/// ZADD command - Add members with scores, or update their scores
///
/// Syntax: ZADD key [NX | XX] score member [score member ...]
///
/// Replies the number of members added.
pub struct ZAddCommand;

impl Command for ZAddCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let mut only_new = false;
        let mut only_existing = false;
        let mut rest = &args[1..];
        while let Some(flag) = rest.first() {
            if flag.eq_ignore_ascii_case(b"NX") {
                only_new = true;
            } else if flag.eq_ignore_ascii_case(b"XX") {
                only_existing = true;
            } else {
                break;
            }
            rest = &rest[1..];
        }
        if rest.is_empty() || rest.len() % 2 != 0 || (only_new && only_existing) {
            return Err(CommandError::Syntax);
        }

        let pairs = rest
            .chunks_exact(2)
            .map(|pair| Ok((parse_float(&pair[0])?, pair[1].clone())))
            .collect::<Result<Vec<_>, CommandError>>()?;

        if only_existing && zset_mut(ks, &args[0])?.is_none() {
            return Ok(RespValue::Integer(0));
        }

        let zset = zset_or_create(ks, &args[0])?;
        let mut added = 0;
        for (score, member) in pairs {
            let present = zset.score(&member).is_some();
            if (only_new && present) || (only_existing && !present) {
                continue;
            }
            if zset.insert(member, score) {
                added += 1;
            }
        }
        ks.remove_if_empty(&args[0]);
        Ok(count_reply(added))
    }

    fn name(&self) -> &'static str {
        "ZADD"
    }

    fn min_args(&self) -> usize {
        3
    }
}

/// ZREM command - Remove members
///
/// Syntax: ZREM key member [member ...]
pub struct ZRemCommand;

impl Command for ZRemCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let removed = match zset_mut(ks, &args[0])? {
            Some(zset) => args[1..].iter().filter(|member| zset.remove(member)).count(),
            None => 0,
        };
        ks.remove_if_empty(&args[0]);
        Ok(count_reply(removed))
    }

    fn name(&self) -> &'static str {
        "ZREM"
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// Shared body of ZRANGE / ZREVRANGE
fn range_by_rank(ks: &mut Keyspace, args: &[Bytes], reverse: bool) -> CommandResult {
    let start = parse_int(&args[1])?;
    let stop = parse_int(&args[2])?;
    let with_scores = match args.get(3) {
        Some(opt) if opt.eq_ignore_ascii_case(b"WITHSCORES") => true,
        Some(_) => return Err(CommandError::Syntax),
        None => false,
    };

    let zset = match zset_mut(ks, &args[0])? {
        Some(zset) => zset,
        None => return Ok(RespValue::Array(Vec::new())),
    };

    let (from, to) = match resolve_range(start, stop, zset.len()) {
        Some(range) => range,
        None => return Ok(RespValue::Array(Vec::new())),
    };
    let count = to - from + 1;

    Ok(if reverse {
        scored_reply(zset.iter().rev().skip(from).take(count), with_scores)
    } else {
        scored_reply(zset.iter().skip(from).take(count), with_scores)
    })
}

/// ZRANGE command - Members by rank, lowest score first
///
/// Syntax: ZRANGE key start stop [WITHSCORES]
pub struct ZRangeCommand;

impl Command for ZRangeCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        range_by_rank(ks, args, false)
    }

    fn name(&self) -> &'static str {
        "ZRANGE"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(4)
    }
}

/// ZREVRANGE command - Members by rank, highest score first
///
/// Syntax: ZREVRANGE key start stop [WITHSCORES]
pub struct ZRevRangeCommand;

impl Command for ZRevRangeCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        range_by_rank(ks, args, true)
    }

    fn name(&self) -> &'static str {
        "ZREVRANGE"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(4)
    }
}

/// Shared body of ZRANGEBYSCORE / ZREVRANGEBYSCORE
///
/// `args[1]` is the low bound for the forward form and the high bound for
/// the reverse form, as in Redis.
fn range_by_score(ks: &mut Keyspace, args: &[Bytes], reverse: bool) -> CommandResult {
    let first = parse_bound(&args[1])?;
    let second = parse_bound(&args[2])?;
    let (min, max) = if reverse { (second, first) } else { (first, second) };

    let mut with_scores = false;
    let mut offset = 0usize;
    let mut limit: Option<usize> = None;
    let mut options = args[3..].iter();
    while let Some(opt) = options.next() {
        if opt.eq_ignore_ascii_case(b"WITHSCORES") {
            with_scores = true;
        } else if opt.eq_ignore_ascii_case(b"LIMIT") {
            let off = parse_int(options.next().ok_or(CommandError::Syntax)?)?;
            let cnt = parse_int(options.next().ok_or(CommandError::Syntax)?)?;
            if off < 0 {
                return Ok(RespValue::Array(Vec::new()));
            }
            offset = off as usize;
            limit = if cnt < 0 { None } else { Some(cnt as usize) };
        } else {
            return Err(CommandError::Syntax);
        }
    }

    let zset = match zset_mut(ks, &args[0])? {
        Some(zset) => zset,
        None => return Ok(RespValue::Array(Vec::new())),
    };

    let take = limit.unwrap_or(usize::MAX);
    Ok(if reverse {
        scored_reply(zset.range_by_score(min, max).rev().skip(offset).take(take), with_scores)
    } else {
        scored_reply(zset.range_by_score(min, max).skip(offset).take(take), with_scores)
    })
}

/// ZRANGEBYSCORE command - Members with scores within a range, ascending
///
/// Syntax: ZRANGEBYSCORE key min max [WITHSCORES] [LIMIT offset count]
pub struct ZRangeByScoreCommand;

impl Command for ZRangeByScoreCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        range_by_score(ks, args, false)
    }

    fn name(&self) -> &'static str {
        "ZRANGEBYSCORE"
    }

    fn min_args(&self) -> usize {
        3
    }
}

/// ZREVRANGEBYSCORE command - Members with scores within a range, descending
///
/// Syntax: ZREVRANGEBYSCORE key max min [WITHSCORES] [LIMIT offset count]
pub struct ZRevRangeByScoreCommand;

impl Command for ZRevRangeByScoreCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        range_by_score(ks, args, true)
    }

    fn name(&self) -> &'static str {
        "ZREVRANGEBYSCORE"
    }

    fn min_args(&self) -> usize {
        3
    }
}

/// ZINCRBY command - Increment the score of a member
///
/// Syntax: ZINCRBY key increment member
pub struct ZIncrByCommand;

impl Command for ZIncrByCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let delta = parse_float(&args[1])?;
        let nan = || CommandError::Other("resulting score is not a number (NaN)".to_string());
        let current = zset_mut(ks, &args[0])?.and_then(|zset| zset.score(&args[2])).unwrap_or(0.0);
        if (current + delta).is_nan() {
            return Err(nan());
        }
        let score = zset_or_create(ks, &args[0])?.incr(args[2].clone(), delta).ok_or_else(nan)?;
        Ok(RespValue::bulk_float(score))
    }

    fn name(&self) -> &'static str {
        "ZINCRBY"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
}

/// ZCARD command - Number of members
///
/// Syntax: ZCARD key
pub struct ZCardCommand;

impl Command for ZCardCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let len = zset_mut(ks, &args[0])?.map_or(0, |zset| zset.len());
        Ok(count_reply(len))
    }

    fn name(&self) -> &'static str {
        "ZCARD"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// ZCOUNT command - Number of members with scores within a range
///
/// Syntax: ZCOUNT key min max
pub struct ZCountCommand;

impl Command for ZCountCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let min = parse_bound(&args[1])?;
        let max = parse_bound(&args[2])?;
        let count = zset_mut(ks, &args[0])?.map_or(0, |zset| zset.count(min, max));
        Ok(count_reply(count))
    }

    fn name(&self) -> &'static str {
        "ZCOUNT"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
}

/// ZRANK command - Rank of a member, lowest score first
///
/// Syntax: ZRANK key member
pub struct ZRankCommand;

impl Command for ZRankCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let rank = zset_mut(ks, &args[0])?.and_then(|zset| zset.rank(&args[1]));
        Ok(rank.map_or(RespValue::Null, count_reply))
    }

    fn name(&self) -> &'static str {
        "ZRANK"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

/// ZSCORE command - Score of a member
///
/// Syntax: ZSCORE key member
pub struct ZScoreCommand;

impl Command for ZScoreCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let score = zset_mut(ks, &args[0])?.and_then(|zset| zset.score(&args[1]));
        Ok(score.map_or(RespValue::Null, RespValue::bulk_float))
    }

    fn name(&self) -> &'static str {
        "ZSCORE"
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

    fn args(items: &[&str]) -> Vec<Bytes> {
        items.iter().map(|s| Bytes::copy_from_slice(s.as_bytes())).collect()
    }

    fn bulk(items: &[&str]) -> RespValue {
        RespValue::Array(items.iter().map(|s| RespValue::bulk_string(s.to_string())).collect())
    }

    fn board() -> Keyspace {
        let mut ks = Keyspace::new();
        ZAddCommand
            .execute(&mut ks, &args(&["z", "1", "a", "2", "b", "3", "c", "4", "d"]))
            .unwrap();
        ks
    }

    #[test]
    fn test_zadd_counts_new_members() {
        let mut ks = board();
        assert_eq!(ZAddCommand.execute(&mut ks, &args(&["z", "9", "a", "5", "e"])), Ok(RespValue::Integer(1)));
        assert_eq!(ZScoreCommand.execute(&mut ks, &args(&["z", "a"])), Ok(RespValue::bulk_string("9")));
        assert_eq!(ZCardCommand.execute(&mut ks, &args(&["z"])), Ok(RespValue::Integer(5)));
    }

    #[test]
    fn test_zadd_flags_and_errors() {
        let mut ks = board();
        assert_eq!(ZAddCommand.execute(&mut ks, &args(&["z", "NX", "100", "a"])), Ok(RespValue::Integer(0)));
        assert_eq!(ZScoreCommand.execute(&mut ks, &args(&["z", "a"])), Ok(RespValue::bulk_string("1")));
        assert_eq!(ZAddCommand.execute(&mut ks, &args(&["z", "XX", "1", "new"])), Ok(RespValue::Integer(0)));
        assert_eq!(ZAddCommand.execute(&mut ks, &args(&["z", "1"])), Err(CommandError::Syntax));
        assert_eq!(ZAddCommand.execute(&mut ks, &args(&["z", "x", "m"])), Err(CommandError::NotAFloat));
        assert_eq!(ZAddCommand.execute(&mut ks, &args(&["other", "XX", "1", "m"])), Ok(RespValue::Integer(0)));
        assert!(!ks.exists(b"other"));
    }

    #[test]
    fn test_zrange_and_zrevrange() {
        let mut ks = board();
        assert_eq!(ZRangeCommand.execute(&mut ks, &args(&["z", "0", "1"])), Ok(bulk(&["a", "b"])));
        assert_eq!(ZRangeCommand.execute(&mut ks, &args(&["z", "-2", "-1"])), Ok(bulk(&["c", "d"])));
        assert_eq!(ZRevRangeCommand.execute(&mut ks, &args(&["z", "0", "1"])), Ok(bulk(&["d", "c"])));
        assert_eq!(
            ZRangeCommand.execute(&mut ks, &args(&["z", "0", "0", "WITHSCORES"])),
            Ok(bulk(&["a", "1"]))
        );
        assert_eq!(ZRangeCommand.execute(&mut ks, &args(&["none", "0", "-1"])), Ok(bulk(&[])));
    }

    #[test]
    fn test_zrangebyscore() {
        let mut ks = board();
        assert_eq!(ZRangeByScoreCommand.execute(&mut ks, &args(&["z", "2", "3"])), Ok(bulk(&["b", "c"])));
        assert_eq!(ZRangeByScoreCommand.execute(&mut ks, &args(&["z", "(2", "+inf"])), Ok(bulk(&["c", "d"])));
        assert_eq!(
            ZRangeByScoreCommand.execute(&mut ks, &args(&["z", "-inf", "+inf", "LIMIT", "1", "2"])),
            Ok(bulk(&["b", "c"]))
        );
        assert_eq!(
            ZRevRangeByScoreCommand.execute(&mut ks, &args(&["z", "3", "1", "WITHSCORES", "LIMIT", "0", "1"])),
            Ok(bulk(&["c", "3"]))
        );
        assert!(ZRangeByScoreCommand.execute(&mut ks, &args(&["z", "low", "3"])).is_err());
    }

    #[test]
    fn test_zincrby() {
        let mut ks = board();
        assert_eq!(ZIncrByCommand.execute(&mut ks, &args(&["z", "1.5", "a"])), Ok(RespValue::bulk_string("2.5")));
        assert_eq!(ZIncrByCommand.execute(&mut ks, &args(&["z", "2", "new"])), Ok(RespValue::bulk_string("2")));
    }

    #[test]
    fn test_zincrby_nan_leaves_set_untouched() {
        let mut ks = board();
        ZIncrByCommand.execute(&mut ks, &args(&["z", "+inf", "a"])).unwrap();
        assert!(ZIncrByCommand.execute(&mut ks, &args(&["z", "-inf", "a"])).is_err());
        assert_eq!(ZScoreCommand.execute(&mut ks, &args(&["z", "a"])), Ok(RespValue::bulk_string("inf")));

        assert!(ZIncrByCommand.execute(&mut ks, &args(&["fresh", "nan", "m"])).is_err());
        assert_eq!(ks.get(b"fresh"), None);
    }

    #[test]
    fn test_zcount_zrank_zscore() {
        let mut ks = board();
        assert_eq!(ZCountCommand.execute(&mut ks, &args(&["z", "2", "4"])), Ok(RespValue::Integer(3)));
        assert_eq!(ZCountCommand.execute(&mut ks, &args(&["z", "(2", "(4"])), Ok(RespValue::Integer(1)));
        assert_eq!(ZRankCommand.execute(&mut ks, &args(&["z", "c"])), Ok(RespValue::Integer(2)));
        assert_eq!(ZRankCommand.execute(&mut ks, &args(&["z", "zz"])), Ok(RespValue::Null));
        assert_eq!(ZScoreCommand.execute(&mut ks, &args(&["none", "a"])), Ok(RespValue::Null));
    }

    #[test]
    fn test_zrem_drops_empty_key() {
        let mut ks = board();
        assert_eq!(ZRemCommand.execute(&mut ks, &args(&["z", "a", "b", "x"])), Ok(RespValue::Integer(2)));
        ZRemCommand.execute(&mut ks, &args(&["z", "c", "d"])).unwrap();
        assert!(!ks.exists(b"z"));
    }
}
