//! Lists

use super::Facade;
use crate::client::{Cmd, StoreClient};
use crate::convert::{integer, optional, values, Decode, Encode};
use crate::error::Result;
use crate::expiry::Expiry;
use bytes::Bytes;

impl<C: StoreClient> Facade<C> {
    /// Prepend one value, returning the new length
    pub async fn left_push<V: Encode>(&self, key: &str, value: V, expiry: Option<Expiry>) -> Result<i64> {
        let value = value.encode()?;
        if value.is_empty() {
            return Ok(0);
        }
        self.push("LPUSH", key, vec![value], expiry).await
    }

    /// Append one value, returning the new length
    pub async fn right_push<V: Encode>(&self, key: &str, value: V, expiry: Option<Expiry>) -> Result<i64> {
        let value = value.encode()?;
        if value.is_empty() {
            return Ok(0);
        }
        self.push("RPUSH", key, vec![value], expiry).await
    }

    /// Prepend values one after the other, so the last one ends up first
    pub async fn left_push_all<V: Encode>(&self, key: &str, values: &[V], expiry: Option<Expiry>) -> Result<i64> {
        self.push("LPUSH", key, encode_all(values)?, expiry).await
    }

    pub async fn right_push_all<V: Encode>(&self, key: &str, values: &[V], expiry: Option<Expiry>) -> Result<i64> {
        self.push("RPUSH", key, encode_all(values)?, expiry).await
    }

    async fn push(&self, name: &str, key: &str, values: Vec<Bytes>, expiry: Option<Expiry>) -> Result<i64> {
        if key.is_empty() || values.is_empty() {
            return Ok(0);
        }

        let mut cmd = Cmd::new(name).arg(key);
        for value in values {
            cmd = cmd.arg_bytes(value);
        }
        integer(self.run_with_expiry(cmd, key, expiry).await?)
    }

    pub async fn left_pop<T: Decode>(&self, key: &str) -> Result<Option<T>> {
        if key.is_empty() {
            return Ok(None);
        }
        optional(self.run(Cmd::new("LPOP").arg(key)).await?)
    }

    pub async fn right_pop<T: Decode>(&self, key: &str) -> Result<Option<T>> {
        if key.is_empty() {
            return Ok(None);
        }
        optional(self.run(Cmd::new("RPOP").arg(key)).await?)
    }

    /// Pop up to `n` values from the head; fewer when the list runs out
    pub async fn left_pop_n<T: Decode>(&self, key: &str, n: i64) -> Result<Vec<T>> {
        self.pop_n("LPOP", key, n).await
    }

    /// Pop up to `n` values from the tail; fewer when the list runs out
    pub async fn right_pop_n<T: Decode>(&self, key: &str, n: i64) -> Result<Vec<T>> {
        self.pop_n("RPOP", key, n).await
    }

    async fn pop_n<T: Decode>(&self, name: &str, key: &str, n: i64) -> Result<Vec<T>> {
        if key.is_empty() || n <= 0 {
            return Ok(Vec::new());
        }
        values(self.run(Cmd::new(name).arg(key).arg(n.to_string())).await?)
    }

    /// Elements from `start` to `end` inclusive; negative indexes count
    /// from the tail
    pub async fn range<T: Decode>(&self, key: &str, start: i64, end: i64) -> Result<Vec<T>> {
        if key.is_empty() {
            return Ok(Vec::new());
        }
        let cmd = Cmd::new("LRANGE")
            .arg(key)
            .arg(start.to_string())
            .arg(end.to_string());
        values(self.run(cmd).await?)
    }

    /// Element at `index` counted from the head; None for a negative index
    pub async fn element_at<T: Decode>(&self, key: &str, index: i64) -> Result<Option<T>> {
        if key.is_empty() || index < 0 {
            return Ok(None);
        }
        optional(self.run(Cmd::new("LINDEX").arg(key).arg(index.to_string())).await?)
    }

    pub async fn list_len(&self, key: &str) -> Result<i64> {
        if key.is_empty() {
            return Ok(0);
        }
        integer(self.run(Cmd::new("LLEN").arg(key)).await?)
    }

    /// LREM: remove occurrences of `value`, returning how many went
    ///
    /// `count > 0` walks from the head, `count < 0` from the tail, `0`
    /// removes them all.
    pub async fn remove_from_list<V: Encode>(&self, key: &str, count: i64, value: V) -> Result<i64> {
        let value = value.encode()?;
        if key.is_empty() {
            return Ok(0);
        }
        let cmd = Cmd::new("LREM").arg(key).arg(count.to_string()).arg_bytes(value);
        integer(self.run(cmd).await?)
    }

    /// Remove the first `count` occurrences of `value` from the head
    pub async fn left_remove<V: Encode>(&self, key: &str, count: i64, value: V) -> Result<i64> {
        self.remove_from_list(key, count.saturating_abs(), value).await
    }

    /// Remove the first `count` occurrences of `value` from the tail
    pub async fn right_remove<V: Encode>(&self, key: &str, count: i64, value: V) -> Result<i64> {
        self.remove_from_list(key, -count.saturating_abs(), value).await
    }
}

pub(super) fn encode_all<V: Encode>(values: &[V]) -> Result<Vec<Bytes>> {
    values.iter().map(Encode::encode).collect()
}
