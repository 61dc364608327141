//! Hashes

use super::{non_empty, Facade};
use crate::client::{Cmd, StoreClient};
use crate::convert::{integer, optional, optional_values, pairs, status, values, Decode, Encode};
use crate::error::{Error, Result};
use crate::expiry::Expiry;
use crate::protocol::format_float;
use rust_decimal::Decimal;
use std::collections::HashMap;

impl<C: StoreClient> Facade<C> {
    /// Set one field; true when the field was new
    pub async fn h_put<V: Encode>(&self, key: &str, field: &str, value: V, expiry: Option<Expiry>) -> Result<bool> {
        let value = value.encode()?;
        if key.is_empty() || field.is_empty() {
            return Ok(false);
        }
        let cmd = Cmd::new("HSET").arg(key).arg(field).arg_bytes(value);
        status(self.run_with_expiry(cmd, key, expiry).await?)
    }

    /// Set several fields at once, returning the number of pairs written
    pub async fn h_put_all<F, V>(&self, key: &str, fields: &[(F, V)], expiry: Option<Expiry>) -> Result<i64>
    where
        F: AsRef<str>,
        V: Encode,
    {
        if key.is_empty() || fields.is_empty() {
            return Ok(0);
        }

        let mut cmd = Cmd::new("HSET").arg(key);
        for (field, value) in fields {
            cmd = cmd.arg(field.as_ref()).arg_bytes(value.encode()?);
        }
        self.run_with_expiry(cmd, key, expiry).await?;
        Ok(fields.len() as i64)
    }

    pub async fn h_get<T: Decode>(&self, key: &str, field: &str) -> Result<Option<T>> {
        if key.is_empty() || field.is_empty() {
            return Ok(None);
        }
        optional(self.run(Cmd::new("HGET").arg(key).arg(field)).await?)
    }

    pub async fn h_get_long(&self, key: &str, field: &str) -> Result<Option<i64>> {
        self.h_get(key, field).await
    }

    pub async fn h_get_double(&self, key: &str, field: &str) -> Result<Option<f64>> {
        self.h_get(key, field).await
    }

    pub async fn h_get_decimal(&self, key: &str, field: &str) -> Result<Option<Decimal>> {
        self.h_get(key, field).await
    }

    /// One entry per requested field, None where the field is missing
    pub async fn h_multi_get<T: Decode, F: AsRef<str>>(&self, key: &str, fields: &[F]) -> Result<Vec<Option<T>>> {
        if key.is_empty() || fields.is_empty() {
            return Ok(Vec::new());
        }
        let cmd = Cmd::new("HMGET").arg(key).args(fields.iter().map(AsRef::as_ref));
        optional_values(self.run(cmd).await?)
    }

    pub async fn h_get_all<T: Decode>(&self, key: &str) -> Result<HashMap<String, T>> {
        if key.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(pairs(self.run(Cmd::new("HGETALL").arg(key)).await?)?
            .into_iter()
            .collect())
    }

    pub async fn h_keys(&self, key: &str) -> Result<Vec<String>> {
        if key.is_empty() {
            return Ok(Vec::new());
        }
        values(self.run(Cmd::new("HKEYS").arg(key)).await?)
    }

    pub async fn h_values<T: Decode>(&self, key: &str) -> Result<Vec<T>> {
        if key.is_empty() {
            return Ok(Vec::new());
        }
        values(self.run(Cmd::new("HVALS").arg(key)).await?)
    }

    pub async fn h_contains(&self, key: &str, field: &str) -> Result<bool> {
        if key.is_empty() || field.is_empty() {
            return Ok(false);
        }
        status(self.run(Cmd::new("HEXISTS").arg(key).arg(field)).await?)
    }

    /// Delete fields; returns how many fields were asked for, not how many
    /// existed
    pub async fn h_del<F: AsRef<str>>(&self, key: &str, fields: &[F]) -> Result<i64> {
        let fields: Vec<&str> = non_empty(fields).collect();
        if key.is_empty() || fields.is_empty() {
            return Ok(0);
        }
        self.run(Cmd::new("HDEL").arg(key).args(&fields)).await?;
        Ok(fields.len() as i64)
    }

    /// Number of fields
    pub async fn h_len(&self, key: &str) -> Result<i64> {
        if key.is_empty() {
            return Ok(0);
        }
        integer(self.run(Cmd::new("HLEN").arg(key)).await?)
    }

    /// Add `delta` to a numeric field, returning the new value
    pub async fn h_incr_by(&self, key: &str, field: &str, delta: f64) -> Result<f64> {
        if key.is_empty() || field.is_empty() {
            return Ok(0.0);
        }
        let cmd = Cmd::new("HINCRBYFLOAT").arg(key).arg(field).arg(format_float(delta));
        optional(self.run(cmd).await?)?
            .ok_or_else(|| Error::UnexpectedReply("HINCRBYFLOAT returned null".to_string()))
    }
}
