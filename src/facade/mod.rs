//! Typed facade
//!
//! Every method turns a typed request into one command (or one pipelined
//! batch) for the injected [`StoreClient`], then coerces the reply into the
//! type the caller asked for. Empty keys and empty inputs short-circuit to
//! the null or zero default without touching the store.
//!
//! Writes that take an `Option<Expiry>` are sent together with an
//! `EXPIRE key seconds` in a single pipeline when the expiry is given.

mod hash;
mod list;
mod set;
mod value;
mod zset;

use crate::client::{Cmd, StoreClient};
use crate::convert::{checked, integer, status, values};
use crate::error::Result;
use crate::expiry::Expiry;
use crate::protocol::RespValue;
use tracing::debug;

/// Lease taken by [`Facade::lock`], in seconds
pub const LOCK_LEASE_SECS: u64 = 60;

/// Typed access to a key-value store
pub struct Facade<C> {
    client: C,
}

impl<C: StoreClient> Facade<C> {
    pub fn new(client: C) -> Self {
        Facade { client }
    }

    /// The wrapped store client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Execute one command; error replies become `Err`
    async fn run(&self, cmd: Cmd) -> Result<RespValue> {
        debug!("Running {}", cmd.name());
        checked(self.client.execute(cmd).await?)
    }

    /// Execute a batch; fails on the first error reply
    async fn batch(&self, cmds: Vec<Cmd>) -> Result<Vec<RespValue>> {
        if cmds.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Running a pipeline of {} command(s)", cmds.len());
        self.client
            .pipeline(cmds)
            .await?
            .into_iter()
            .map(checked)
            .collect()
    }

    /// Execute `cmd`, followed by `EXPIRE key` in the same pipeline when an
    /// expiry is given. Returns the reply to `cmd`.
    async fn run_with_expiry(&self, cmd: Cmd, key: &str, expiry: Option<Expiry>) -> Result<RespValue> {
        let expiry = match expiry {
            Some(expiry) => expiry,
            None => return self.run(cmd).await,
        };

        let replies = self.batch(vec![cmd, expire_cmd(key, expiry)]).await?;
        Ok(replies.into_iter().next().unwrap_or(RespValue::Null))
    }

    /// Delete a key; true when it existed
    pub async fn del(&self, key: &str) -> Result<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        status(self.run(Cmd::new("DEL").arg(key)).await?)
    }

    /// Delete keys, returning how many existed
    pub async fn del_all<K: AsRef<str>>(&self, keys: &[K]) -> Result<i64> {
        let keys: Vec<&str> = non_empty(keys).collect();
        if keys.is_empty() {
            return Ok(0);
        }
        integer(self.run(Cmd::new("DEL").args(keys)).await?)
    }

    pub async fn has_key(&self, key: &str) -> Result<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        status(self.run(Cmd::new("EXISTS").arg(key)).await?)
    }

    /// Set a key's time to live; false when the key does not exist
    pub async fn expire(&self, key: &str, expiry: Expiry) -> Result<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        status(self.run(expire_cmd(key, expiry)).await?)
    }

    /// Remaining time to live in seconds
    ///
    /// -2 when the key does not exist, -1 when it has no expiry or the key
    /// is empty.
    pub async fn ttl(&self, key: &str) -> Result<i64> {
        if key.is_empty() {
            return Ok(-1);
        }
        integer(self.run(Cmd::new("TTL").arg(key)).await?)
    }

    /// Keys matching a glob-style pattern
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        if pattern.is_empty() {
            return Ok(Vec::new());
        }
        values(self.run(Cmd::new("KEYS").arg(pattern)).await?)
    }

    pub async fn incr(&self, key: &str) -> Result<i64> {
        self.incr_by(key, 1).await
    }

    /// Add `delta` to the integer at `key`, returning the new value
    pub async fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        if key.is_empty() {
            return Ok(0);
        }
        integer(self.run(incr_by_cmd(key, delta)).await?)
    }

    /// Like [`incr_by`](Self::incr_by), but a key created by this call also
    /// gets `expiry`. An existing key keeps its time to live.
    pub async fn incr_by_with_expiry(&self, key: &str, delta: i64, expiry: Expiry) -> Result<i64> {
        if key.is_empty() {
            return Ok(0);
        }

        let replies = self
            .batch(vec![Cmd::new("EXISTS").arg(key), incr_by_cmd(key, delta)])
            .await?;
        let mut replies = replies.into_iter();
        let existed = status(replies.next().unwrap_or(RespValue::Null))?;
        let value = integer(replies.next().unwrap_or(RespValue::Null))?;

        if !existed {
            self.run(expire_cmd(key, expiry)).await?;
        }
        Ok(value)
    }

    /// Try to take the lease `{key}:lock` for one minute
    ///
    /// Returns true when this caller now holds it. The lease is a single
    /// `SET NX EX`, so two callers can never both succeed.
    pub async fn lock(&self, key: &str) -> Result<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        let cmd = Cmd::new("SET")
            .arg(lock_key(key))
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(LOCK_LEASE_SECS.to_string());
        status(self.run(cmd).await?)
    }

    /// Release the lease taken by [`lock`](Self::lock)
    pub async fn unlock(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        self.run(Cmd::new("DEL").arg(lock_key(key))).await?;
        Ok(())
    }
}

fn lock_key(key: &str) -> String {
    format!("{}:lock", key)
}

fn expire_cmd(key: &str, expiry: Expiry) -> Cmd {
    Cmd::new("EXPIRE").arg(key).arg(expiry.as_seconds().to_string())
}

fn incr_by_cmd(key: &str, delta: i64) -> Cmd {
    Cmd::new("INCRBY").arg(key).arg(delta.to_string())
}

/// Keys with the empty ones left out
fn non_empty<K: AsRef<str>>(keys: &[K]) -> impl Iterator<Item = &str> {
    keys.iter().map(AsRef::as_ref).filter(|key| !key.is_empty())
}
