//! String values

use super::{expire_cmd, non_empty, Facade};
use crate::client::{Cmd, StoreClient};
use crate::convert::{integer, optional, optional_values, Decode, Encode, Json};
use crate::error::Result;
use crate::expiry::Expiry;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

impl<C: StoreClient> Facade<C> {
    /// Store `value` at `key`, replacing whatever was there
    ///
    /// Nothing is written when the key or the encoded value is empty.
    pub async fn set<V: Encode>(&self, key: &str, value: V, expiry: Option<Expiry>) -> Result<()> {
        let value = value.encode()?;
        if key.is_empty() || value.is_empty() {
            return Ok(());
        }

        let mut cmd = Cmd::new("SET").arg(key).arg_bytes(value);
        if let Some(expiry) = expiry {
            cmd = cmd.arg("EX").arg(expiry.as_seconds().to_string());
        }
        self.run(cmd).await?;
        Ok(())
    }

    /// Store `value` as JSON
    pub async fn set_obj<T: Serialize>(&self, key: &str, value: &T, expiry: Option<Expiry>) -> Result<()> {
        self.set(key, Json(value), expiry).await
    }

    /// Store several values at once
    ///
    /// Without an expiry this is one MSET. With one, every pair becomes a
    /// SET followed by an EXPIRE, all in a single pipeline. Pairs with an
    /// empty key or value are skipped.
    pub async fn multi_set<K, V>(&self, pairs: &[(K, V)], expiry: Option<Expiry>) -> Result<()>
    where
        K: AsRef<str>,
        V: Encode,
    {
        let mut encoded = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.encode()?;
            if !key.is_empty() && !value.is_empty() {
                encoded.push((key, value));
            }
        }
        if encoded.is_empty() {
            return Ok(());
        }

        match expiry {
            None => {
                let mut cmd = Cmd::new("MSET");
                for (key, value) in encoded {
                    cmd = cmd.arg(key).arg_bytes(value);
                }
                self.run(cmd).await?;
            }
            Some(expiry) => {
                let mut cmds = Vec::with_capacity(encoded.len() * 2);
                for (key, value) in encoded {
                    cmds.push(Cmd::new("SET").arg(key).arg_bytes(value));
                    cmds.push(expire_cmd(key, expiry));
                }
                self.batch(cmds).await?;
            }
        }
        Ok(())
    }

    /// The value at `key`, decoded as `T`; None when missing
    pub async fn get<T: Decode>(&self, key: &str) -> Result<Option<T>> {
        if key.is_empty() {
            return Ok(None);
        }
        optional(self.run(Cmd::new("GET").arg(key)).await?)
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get(key).await
    }

    /// The JSON object at `key`
    pub async fn get_obj<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Ok(self.get::<Json<T>>(key).await?.map(Json::into_inner))
    }

    pub async fn get_byte(&self, key: &str) -> Result<Option<i8>> {
        self.get(key).await
    }

    pub async fn get_int(&self, key: &str) -> Result<Option<i32>> {
        self.get(key).await
    }

    pub async fn get_long(&self, key: &str) -> Result<Option<i64>> {
        self.get(key).await
    }

    pub async fn get_double(&self, key: &str) -> Result<Option<f64>> {
        self.get(key).await
    }

    pub async fn get_decimal(&self, key: &str) -> Result<Option<Decimal>> {
        self.get(key).await
    }

    /// The value at `key`, or `T::default()` (zero for numbers) when missing
    pub async fn get_or_zero<T: Decode + Default>(&self, key: &str) -> Result<T> {
        Ok(self.get(key).await?.unwrap_or_default())
    }

    pub async fn get_byte_value(&self, key: &str) -> Result<i8> {
        self.get_or_zero(key).await
    }

    pub async fn get_int_value(&self, key: &str) -> Result<i32> {
        self.get_or_zero(key).await
    }

    pub async fn get_long_value(&self, key: &str) -> Result<i64> {
        self.get_or_zero(key).await
    }

    pub async fn get_double_value(&self, key: &str) -> Result<f64> {
        self.get_or_zero(key).await
    }

    pub async fn get_decimal_value(&self, key: &str) -> Result<Decimal> {
        self.get_or_zero(key).await
    }

    /// Values of several keys, in the order the keys were given
    ///
    /// Keys that are missing (or empty) are left out of the result.
    pub async fn multi_get<T: Decode, K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<(String, T)>> {
        let keys: Vec<&str> = non_empty(keys).collect();
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<Option<T>> = optional_values(self.run(Cmd::new("MGET").args(&keys)).await?)?;
        Ok(keys
            .into_iter()
            .zip(found)
            .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
            .collect())
    }

    pub async fn multi_get_string<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<(String, String)>> {
        self.multi_get(keys).await
    }

    /// Append to the string at `key`, returning its new length
    pub async fn append<V: Encode>(&self, key: &str, value: V) -> Result<i64> {
        let value = value.encode()?;
        if key.is_empty() {
            return Ok(0);
        }
        integer(self.run(Cmd::new("APPEND").arg(key).arg_bytes(value)).await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::MemoryClient;
    use crate::error::Error;
    use crate::expiry::Expiry;
    use crate::facade::Facade;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};
    use std::str::FromStr;

    fn facade() -> Facade<MemoryClient> {
        Facade::new(MemoryClient::new())
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        level: u32,
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let facade = facade();
        facade.set("greeting", "hello", None).await.unwrap();
        assert_eq!(facade.get_string("greeting").await.unwrap().as_deref(), Some("hello"));
        assert_eq!(facade.get_string("missing").await.unwrap(), None);

        facade.set("n", 42i64, Some(Expiry::seconds(30))).await.unwrap();
        assert_eq!(facade.get_long("n").await.unwrap(), Some(42));
        assert_eq!(facade.ttl("n").await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_empty_writes_are_skipped() {
        let facade = facade();
        facade.set("", "v", None).await.unwrap();
        facade.set("k", "", None).await.unwrap();
        assert!(!facade.has_key("k").await.unwrap());
        assert_eq!(facade.get_string("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_numeric_narrowing() {
        let facade = facade();
        facade.set("big", 300, None).await.unwrap();
        assert_eq!(facade.get_byte("big").await.unwrap(), Some(44));
        assert_eq!(facade.get_int("big").await.unwrap(), Some(300));

        facade.set("f", "2.75", None).await.unwrap();
        assert_eq!(facade.get_long("f").await.unwrap(), Some(2));
        assert_eq!(facade.get_double("f").await.unwrap(), Some(2.75));

        facade.set("d", "0.1", None).await.unwrap();
        assert_eq!(facade.get_decimal("d").await.unwrap(), Some(Decimal::from_str("0.1").unwrap()));

        facade.set("word", "abc", None).await.unwrap();
        assert!(matches!(facade.get_long("word").await, Err(Error::NotANumber(_))));
    }

    #[tokio::test]
    async fn test_zero_defaults() {
        let facade = facade();
        assert_eq!(facade.get_byte_value("none").await.unwrap(), 0);
        assert_eq!(facade.get_int_value("none").await.unwrap(), 0);
        assert_eq!(facade.get_long_value("none").await.unwrap(), 0);
        assert_eq!(facade.get_double_value("none").await.unwrap(), 0.0);
        assert_eq!(facade.get_decimal_value("none").await.unwrap(), Decimal::ZERO);

        facade.set("n", -5, None).await.unwrap();
        assert_eq!(facade.get_or_zero::<i64>("n").await.unwrap(), -5);
    }

    #[tokio::test]
    async fn test_objects() {
        let facade = facade();
        let profile = Profile {
            name: "ann".to_string(),
            level: 7,
        };
        facade.set_obj("p", &profile, None).await.unwrap();
        assert_eq!(facade.get_obj::<Profile>("p").await.unwrap(), Some(profile));
        assert_eq!(facade.get_obj::<Profile>("q").await.unwrap(), None);

        facade.set("bad", "{", None).await.unwrap();
        assert!(matches!(facade.get_obj::<Profile>("bad").await, Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_multi_set_and_get() {
        let facade = facade();
        facade
            .multi_set(&[("a", "1"), ("", "x"), ("b", ""), ("c", "3")], None)
            .await
            .unwrap();
        assert!(!facade.has_key("b").await.unwrap());

        let found = facade.multi_get::<i64, _>(&["c", "b", "a", ""]).await.unwrap();
        assert_eq!(found, vec![("c".to_string(), 3), ("a".to_string(), 1)]);

        facade
            .multi_set(&[("x", "1"), ("y", "2")], Some(Expiry::minutes(1)))
            .await
            .unwrap();
        assert_eq!(facade.ttl("x").await.unwrap(), 60);
        assert_eq!(facade.ttl("y").await.unwrap(), 60);
        assert_eq!(facade.ttl("a").await.unwrap(), -1);

        let strings = facade.multi_get_string(&["y", "x"]).await.unwrap();
        assert_eq!(strings, vec![("y".to_string(), "2".to_string()), ("x".to_string(), "1".to_string())]);
    }

    #[tokio::test]
    async fn test_append() {
        let facade = facade();
        assert_eq!(facade.append("s", "ab").await.unwrap(), 2);
        assert_eq!(facade.append("s", 12).await.unwrap(), 4);
        assert_eq!(facade.get_string("s").await.unwrap().as_deref(), Some("ab12"));
    }
}
