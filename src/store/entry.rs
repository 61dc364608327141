//! A stored value plus its expiry

use super::value::Value;
use std::time::{Duration, Instant};

/// One slot of the keyspace
#[derive(Debug, Clone)]
pub struct Entry {
    pub value: Value,

    /// Absolute expiry, if any
    pub expire_at: Option<Instant>,
}

impl Entry {
    pub fn new(value: Value) -> Self {
        Entry {
            value,
            expire_at: None,
        }
    }

    pub fn with_expiration(value: Value, expire_at: Instant) -> Self {
        Entry {
            value,
            expire_at: Some(expire_at),
        }
    }

    /// `ttl` from now, None when the clock cannot represent it
    pub fn deadline(ttl: Duration) -> Option<Instant> {
        Instant::now().checked_add(ttl)
    }

    pub fn is_expired(&self) -> bool {
        match self.expire_at {
            Some(expire_at) => Instant::now() >= expire_at,
            None => false,
        }
    }

    pub fn set_expiration(&mut self, expire_at: Instant) {
        self.expire_at = Some(expire_at);
    }

    /// Remaining TTL rounded to the nearest second, -1 when the entry never
    /// expires
    pub fn ttl_seconds(&self) -> i64 {
        match self.expire_at {
            Some(expire_at) => {
                let now = Instant::now();
                if expire_at > now {
                    let millis = expire_at.duration_since(now).as_millis();
                    i64::try_from((millis + 500) / 1000).unwrap_or(i64::MAX)
                } else {
                    -2
                }
            }
            None => -1,
        }
    }
}
