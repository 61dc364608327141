//! Sorted sets

use super::list::encode_all;
use super::{expire_cmd, non_empty, Facade};
use crate::client::{Cmd, StoreClient};
use crate::convert::{integer, optional, scored, status, values, Decode, Encode};
use crate::error::{Error, Result};
use crate::expiry::Expiry;
use crate::protocol::{format_float, RespValue};
use bytes::Bytes;

/// Which way a range walks the set
#[derive(Clone, Copy)]
enum Order {
    Asc,
    Desc,
}

impl<C: StoreClient> Facade<C> {
    /// Add or update one member; true when it was new
    pub async fn z_add<V: Encode>(&self, key: &str, value: V, score: f64, expiry: Option<Expiry>) -> Result<bool> {
        let value = value.encode()?;
        if key.is_empty() || value.is_empty() {
            return Ok(false);
        }
        status(self.run_with_expiry(zadd_cmd(key, &[(value, score)]), key, expiry).await?)
    }

    /// Add or update members, returning how many were new
    pub async fn z_add_all<V: Encode>(&self, key: &str, members: &[(V, f64)], expiry: Option<Expiry>) -> Result<i64> {
        let members = encode_scored(members)?;
        if key.is_empty() || members.is_empty() {
            return Ok(0);
        }
        integer(self.run_with_expiry(zadd_cmd(key, &members), key, expiry).await?)
    }

    /// Add the same member to every set in `keys`, in one pipeline
    pub async fn add_to_zsets<K, V>(&self, keys: &[K], value: V, score: f64, expiry: Option<Expiry>) -> Result<()>
    where
        K: AsRef<str>,
        V: Encode,
    {
        let value = value.encode()?;
        if value.is_empty() {
            return Ok(());
        }
        self.add_to_each(keys, &[(value, score)], expiry).await
    }

    /// Add the same members to every set in `keys`, in one pipeline
    pub async fn add_all_to_zsets<K, V>(&self, keys: &[K], members: &[(V, f64)], expiry: Option<Expiry>) -> Result<()>
    where
        K: AsRef<str>,
        V: Encode,
    {
        let members = encode_scored(members)?;
        if members.is_empty() {
            return Ok(());
        }
        self.add_to_each(keys, &members, expiry).await
    }

    async fn add_to_each<K: AsRef<str>>(&self, keys: &[K], members: &[(Bytes, f64)], expiry: Option<Expiry>) -> Result<()> {
        let mut cmds = Vec::new();
        for key in non_empty(keys) {
            cmds.push(zadd_cmd(key, members));
            if let Some(expiry) = expiry {
                cmds.push(expire_cmd(key, expiry));
            }
        }
        self.batch(cmds).await?;
        Ok(())
    }

    /// Remove members, returning how many were there
    pub async fn z_remove<V: Encode>(&self, key: &str, values: &[V]) -> Result<i64> {
        let values = encode_all(values)?;
        if key.is_empty() || values.is_empty() {
            return Ok(0);
        }
        integer(self.run(zrem_cmd(key, &values)).await?)
    }

    /// Remove one member from every set in `keys`
    pub async fn del_from_zsets<K: AsRef<str>, V: Encode>(&self, keys: &[K], value: V) -> Result<()> {
        let value = value.encode()?;
        self.remove_from_each(keys, &[value]).await
    }

    /// Remove members from every set in `keys`
    pub async fn del_all_from_zsets<K: AsRef<str>, V: Encode>(&self, keys: &[K], values: &[V]) -> Result<()> {
        let values = encode_all(values)?;
        self.remove_from_each(keys, &values).await
    }

    async fn remove_from_each<K: AsRef<str>>(&self, keys: &[K], values: &[Bytes]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let cmds = non_empty(keys).map(|key| zrem_cmd(key, values)).collect();
        self.batch(cmds).await?;
        Ok(())
    }

    /// Members ranked `start` to `end` inclusive, lowest score first
    pub async fn z_range<T: Decode>(&self, key: &str, start: i64, end: i64) -> Result<Vec<T>> {
        match self.rank_range(key, start, end, Order::Asc, false).await? {
            Some(reply) => values(reply),
            None => Ok(Vec::new()),
        }
    }

    /// Members ranked `start` to `end` inclusive, highest score first
    pub async fn z_rev_range<T: Decode>(&self, key: &str, start: i64, end: i64) -> Result<Vec<T>> {
        match self.rank_range(key, start, end, Order::Desc, false).await? {
            Some(reply) => values(reply),
            None => Ok(Vec::new()),
        }
    }

    pub async fn z_range_with_scores<T: Decode>(&self, key: &str, start: i64, end: i64) -> Result<Vec<(T, f64)>> {
        match self.rank_range(key, start, end, Order::Asc, true).await? {
            Some(reply) => scored(reply),
            None => Ok(Vec::new()),
        }
    }

    pub async fn z_rev_range_with_scores<T: Decode>(&self, key: &str, start: i64, end: i64) -> Result<Vec<(T, f64)>> {
        match self.rank_range(key, start, end, Order::Desc, true).await? {
            Some(reply) => scored(reply),
            None => Ok(Vec::new()),
        }
    }

    /// None when the range is empty without asking the store
    async fn rank_range(
        &self,
        key: &str,
        start: i64,
        end: i64,
        order: Order,
        with_scores: bool,
    ) -> Result<Option<RespValue>> {
        if key.is_empty() || (start >= 0 && end >= 0 && start > end) {
            return Ok(None);
        }

        let name = match order {
            Order::Asc => "ZRANGE",
            Order::Desc => "ZREVRANGE",
        };
        let mut cmd = Cmd::new(name).arg(key).arg(start.to_string()).arg(end.to_string());
        if with_scores {
            cmd = cmd.arg("WITHSCORES");
        }
        self.run(cmd).await.map(Some)
    }

    /// Members with `min <= score <= max`, lowest first, skipping `offset`
    /// and returning at most `limit` (all of them when `limit` is negative)
    pub async fn z_range_by_score<T: Decode>(&self, key: &str, min: f64, max: f64, offset: i64, limit: i64) -> Result<Vec<T>> {
        match self.score_range(key, min, max, offset, limit, Order::Asc, false).await? {
            Some(reply) => values(reply),
            None => Ok(Vec::new()),
        }
    }

    /// Members with `min <= score <= max`, highest first
    pub async fn z_rev_range_by_score<T: Decode>(&self, key: &str, min: f64, max: f64, offset: i64, limit: i64) -> Result<Vec<T>> {
        match self.score_range(key, min, max, offset, limit, Order::Desc, false).await? {
            Some(reply) => values(reply),
            None => Ok(Vec::new()),
        }
    }

    pub async fn z_range_by_score_with_scores<T: Decode>(
        &self,
        key: &str,
        min: f64,
        max: f64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<(T, f64)>> {
        match self.score_range(key, min, max, offset, limit, Order::Asc, true).await? {
            Some(reply) => scored(reply),
            None => Ok(Vec::new()),
        }
    }

    pub async fn z_rev_range_by_score_with_scores<T: Decode>(
        &self,
        key: &str,
        min: f64,
        max: f64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<(T, f64)>> {
        match self.score_range(key, min, max, offset, limit, Order::Desc, true).await? {
            Some(reply) => scored(reply),
            None => Ok(Vec::new()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn score_range(
        &self,
        key: &str,
        min: f64,
        max: f64,
        offset: i64,
        limit: i64,
        order: Order,
        with_scores: bool,
    ) -> Result<Option<RespValue>> {
        if key.is_empty() || min > max {
            return Ok(None);
        }

        let (name, first, second) = match order {
            Order::Asc => ("ZRANGEBYSCORE", min, max),
            Order::Desc => ("ZREVRANGEBYSCORE", max, min),
        };
        let mut cmd = Cmd::new(name)
            .arg(key)
            .arg(format_float(first))
            .arg(format_float(second));
        if with_scores {
            cmd = cmd.arg("WITHSCORES");
        }
        cmd = cmd
            .arg("LIMIT")
            .arg(offset.max(0).to_string())
            .arg(limit.to_string());
        self.run(cmd).await.map(Some)
    }

    /// Add `delta` to a member's score (creating it at `delta`), returning
    /// the new score
    pub async fn z_incr_by<V: Encode>(&self, key: &str, value: V, delta: f64) -> Result<f64> {
        let value = value.encode()?;
        if key.is_empty() {
            return Ok(0.0);
        }
        let cmd = Cmd::new("ZINCRBY").arg(key).arg(format_float(delta)).arg_bytes(value);
        optional(self.run(cmd).await?)?
            .ok_or_else(|| Error::UnexpectedReply("ZINCRBY returned null".to_string()))
    }

    /// Number of members
    pub async fn z_card(&self, key: &str) -> Result<i64> {
        if key.is_empty() {
            return Ok(0);
        }
        integer(self.run(Cmd::new("ZCARD").arg(key)).await?)
    }

    /// Members with `min <= score <= max`
    pub async fn z_count(&self, key: &str, min: f64, max: f64) -> Result<i64> {
        self.count_between(key, format_float(min), format_float(max)).await
    }

    /// Members with a score strictly greater than `min`
    pub async fn z_count_larger_than(&self, key: &str, min: f64) -> Result<i64> {
        self.count_between(key, format!("({}", format_float(min)), "+inf".to_string()).await
    }

    /// Members with a score strictly less than `max`
    pub async fn z_count_smaller_than(&self, key: &str, max: f64) -> Result<i64> {
        self.count_between(key, "-inf".to_string(), format!("({}", format_float(max))).await
    }

    async fn count_between(&self, key: &str, min: String, max: String) -> Result<i64> {
        if key.is_empty() {
            return Ok(0);
        }
        integer(self.run(Cmd::new("ZCOUNT").arg(key).arg(min).arg(max)).await?)
    }

    /// Zero-based rank by ascending score; None when not a member
    pub async fn z_rank<V: Encode>(&self, key: &str, value: V) -> Result<Option<i64>> {
        let value = value.encode()?;
        if key.is_empty() {
            return Ok(None);
        }
        optional(self.run(Cmd::new("ZRANK").arg(key).arg_bytes(value)).await?)
    }

    /// Score of a member; None when not a member
    pub async fn z_score<V: Encode>(&self, key: &str, value: V) -> Result<Option<f64>> {
        let value = value.encode()?;
        if key.is_empty() {
            return Ok(None);
        }
        optional(self.run(Cmd::new("ZSCORE").arg(key).arg_bytes(value)).await?)
    }

    pub async fn z_contains<V: Encode>(&self, key: &str, value: V) -> Result<bool> {
        Ok(self.z_score(key, value).await?.is_some())
    }
}

fn encode_scored<V: Encode>(members: &[(V, f64)]) -> Result<Vec<(Bytes, f64)>> {
    members
        .iter()
        .map(|(value, score)| Ok((value.encode()?, *score)))
        .collect()
}

fn zadd_cmd(key: &str, members: &[(Bytes, f64)]) -> Cmd {
    let mut cmd = Cmd::new("ZADD").arg(key);
    for (value, score) in members {
        cmd = cmd.arg(format_float(*score)).arg_bytes(value.clone());
    }
    cmd
}

fn zrem_cmd(key: &str, values: &[Bytes]) -> Cmd {
    let mut cmd = Cmd::new("ZREM").arg(key);
    for value in values {
        cmd = cmd.arg_bytes(value.clone());
    }
    cmd
}
