//! Sets

use super::list::encode_all;
use super::{non_empty, Facade};
use crate::client::{Cmd, StoreClient};
use crate::convert::{integer, optional, status, values, Decode, Encode};
use crate::error::Result;
use crate::expiry::Expiry;

impl<C: StoreClient> Facade<C> {
    /// Add one member, returning 1 if it was new
    pub async fn s_add<V: Encode>(&self, key: &str, value: V, expiry: Option<Expiry>) -> Result<i64> {
        let value = value.encode()?;
        if key.is_empty() || value.is_empty() {
            return Ok(0);
        }
        integer(self.run_with_expiry(Cmd::new("SADD").arg(key).arg_bytes(value), key, expiry).await?)
    }

    /// Add members, returning how many were new
    pub async fn s_add_all<V: Encode>(&self, key: &str, values: &[V], expiry: Option<Expiry>) -> Result<i64> {
        let values = encode_all(values)?;
        if key.is_empty() || values.is_empty() {
            return Ok(0);
        }

        let mut cmd = Cmd::new("SADD").arg(key);
        for value in values {
            cmd = cmd.arg_bytes(value);
        }
        integer(self.run_with_expiry(cmd, key, expiry).await?)
    }

    /// Remove members, returning how many were there
    pub async fn s_remove<V: Encode>(&self, key: &str, values: &[V]) -> Result<i64> {
        let values = encode_all(values)?;
        if key.is_empty() || values.is_empty() {
            return Ok(0);
        }

        let mut cmd = Cmd::new("SREM").arg(key);
        for value in values {
            cmd = cmd.arg_bytes(value);
        }
        integer(self.run(cmd).await?)
    }

    pub async fn s_is_member<V: Encode>(&self, key: &str, value: V) -> Result<bool> {
        let value = value.encode()?;
        if key.is_empty() {
            return Ok(false);
        }
        status(self.run(Cmd::new("SISMEMBER").arg(key).arg_bytes(value)).await?)
    }

    pub async fn s_members<T: Decode>(&self, key: &str) -> Result<Vec<T>> {
        if key.is_empty() {
            return Ok(Vec::new());
        }
        values(self.run(Cmd::new("SMEMBERS").arg(key)).await?)
    }

    /// Number of members
    pub async fn s_card(&self, key: &str) -> Result<i64> {
        if key.is_empty() {
            return Ok(0);
        }
        integer(self.run(Cmd::new("SCARD").arg(key)).await?)
    }

    /// One random member, left in the set
    pub async fn random_member<T: Decode>(&self, key: &str) -> Result<Option<T>> {
        if key.is_empty() {
            return Ok(None);
        }
        optional(self.run(Cmd::new("SRANDMEMBER").arg(key)).await?)
    }

    /// `count` random members, possibly repeated
    pub async fn random_members<T: Decode>(&self, key: &str, count: i64) -> Result<Vec<T>> {
        self.random(key, count, true).await
    }

    /// Up to `count` distinct random members
    pub async fn random_distinct_members<T: Decode>(&self, key: &str, count: i64) -> Result<Vec<T>> {
        self.random(key, count, false).await
    }

    async fn random<T: Decode>(&self, key: &str, count: i64, repeat: bool) -> Result<Vec<T>> {
        if key.is_empty() || count <= 0 {
            return Ok(Vec::new());
        }
        if count == 1 {
            return Ok(self.random_member(key).await?.into_iter().collect());
        }

        let count = if repeat { -count } else { count };
        values(self.run(Cmd::new("SRANDMEMBER").arg(key).arg(count.to_string())).await?)
    }

    /// Remove and return one random member
    pub async fn random_pop<T: Decode>(&self, key: &str) -> Result<Option<T>> {
        if key.is_empty() {
            return Ok(None);
        }
        optional(self.run(Cmd::new("SPOP").arg(key)).await?)
    }

    /// Remove and return up to `count` random members
    pub async fn random_pop_n<T: Decode>(&self, key: &str, count: i64) -> Result<Vec<T>> {
        if key.is_empty() || count <= 0 {
            return Ok(Vec::new());
        }
        values(self.run(Cmd::new("SPOP").arg(key).arg(count.to_string())).await?)
    }

    /// Members of `key` that are in none of `others`
    pub async fn s_diff<T: Decode, K: AsRef<str>>(&self, key: &str, others: &[K]) -> Result<Vec<T>> {
        self.combine("SDIFF", key, others).await
    }

    /// Members of `key` that are in every one of `others`
    pub async fn s_inter<T: Decode, K: AsRef<str>>(&self, key: &str, others: &[K]) -> Result<Vec<T>> {
        self.combine("SINTER", key, others).await
    }

    /// Members of `key` or any of `others`
    pub async fn s_union<T: Decode, K: AsRef<str>>(&self, key: &str, others: &[K]) -> Result<Vec<T>> {
        self.combine("SUNION", key, others).await
    }

    /// Store the difference in `dest`, returning its size
    pub async fn s_diff_and_store<K: AsRef<str>>(&self, key: &str, others: &[K], dest: &str) -> Result<i64> {
        self.combine_and_store("SDIFFSTORE", key, others, dest).await
    }

    /// Store the intersection in `dest`, returning its size
    pub async fn s_inter_and_store<K: AsRef<str>>(&self, key: &str, others: &[K], dest: &str) -> Result<i64> {
        self.combine_and_store("SINTERSTORE", key, others, dest).await
    }

    /// Store the union in `dest`, returning its size
    pub async fn s_union_and_store<K: AsRef<str>>(&self, key: &str, others: &[K], dest: &str) -> Result<i64> {
        self.combine_and_store("SUNIONSTORE", key, others, dest).await
    }

    async fn combine<T: Decode, K: AsRef<str>>(&self, name: &str, key: &str, others: &[K]) -> Result<Vec<T>> {
        if key.is_empty() {
            return Ok(Vec::new());
        }
        values(self.run(Cmd::new(name).arg(key).args(non_empty(others))).await?)
    }

    async fn combine_and_store<K: AsRef<str>>(&self, name: &str, key: &str, others: &[K], dest: &str) -> Result<i64> {
        if key.is_empty() || dest.is_empty() {
            return Ok(0);
        }
        let cmd = Cmd::new(name).arg(dest).arg(key).args(non_empty(others));
        integer(self.run(cmd).await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::MemoryClient;
    use crate::expiry::Expiry;
    use crate::facade::Facade;

    fn facade() -> Facade<MemoryClient> {
        Facade::new(MemoryClient::new())
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[tokio::test]
    async fn test_add_remove_members() {
        let facade = facade();
        assert_eq!(facade.s_add("s", "a", None).await.unwrap(), 1);
        assert_eq!(facade.s_add("s", "a", None).await.unwrap(), 0);
        assert_eq!(facade.s_add_all("s", &["b", "c", "a"], Some(Expiry::hours(1))).await.unwrap(), 2);
        assert_eq!(facade.ttl("s").await.unwrap(), 3600);

        assert_eq!(facade.s_card("s").await.unwrap(), 3);
        assert!(facade.s_is_member("s", "b").await.unwrap());
        assert!(!facade.s_is_member("s", "z").await.unwrap());

        assert_eq!(facade.s_remove("s", &["a", "z"]).await.unwrap(), 1);
        assert_eq!(sorted(facade.s_members("s").await.unwrap()), vec!["b", "c"]);
        assert!(facade.s_members::<String>("none").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_random_members() {
        let facade = facade();
        facade.s_add_all("s", &[1, 2, 3], None).await.unwrap();

        let one: i64 = facade.random_member("s").await.unwrap().unwrap();
        assert!((1..=3).contains(&one));
        assert_eq!(facade.random_member::<i64>("none").await.unwrap(), None);

        let repeated = facade.random_members::<i64>("s", 10).await.unwrap();
        assert_eq!(repeated.len(), 10);
        assert!(repeated.iter().all(|m| (1..=3).contains(m)));

        let mut distinct = facade.random_distinct_members::<i64>("s", 10).await.unwrap();
        distinct.sort();
        assert_eq!(distinct, vec![1, 2, 3]);

        assert_eq!(facade.random_members::<i64>("s", 1).await.unwrap().len(), 1);
        assert!(facade.random_members::<i64>("s", 0).await.unwrap().is_empty());
        assert!(facade.random_members::<i64>("none", 1).await.unwrap().is_empty());
        assert_eq!(facade.s_card("s").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_random_pop() {
        let facade = facade();
        facade.s_add_all("s", &["a", "b", "c"], None).await.unwrap();

        let popped: String = facade.random_pop("s").await.unwrap().unwrap();
        assert!(!facade.s_is_member("s", &popped).await.unwrap());

        let rest = facade.random_pop_n::<String>("s", 5).await.unwrap();
        assert_eq!(rest.len(), 2);
        assert!(!facade.has_key("s").await.unwrap());
        assert_eq!(facade.random_pop::<String>("s").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_algebra() {
        let facade = facade();
        facade.s_add_all("a", &["1", "2", "3"], None).await.unwrap();
        facade.s_add_all("b", &["2", "3", "4"], None).await.unwrap();
        facade.s_add_all("c", &["3", "5"], None).await.unwrap();

        assert_eq!(sorted(facade.s_diff("a", &["b"]).await.unwrap()), vec!["1"]);
        assert_eq!(sorted(facade.s_inter("a", &["b", "c"]).await.unwrap()), vec!["3"]);
        assert_eq!(sorted(facade.s_union("a", &["c"]).await.unwrap()), vec!["1", "2", "3", "5"]);

        assert_eq!(facade.s_union_and_store("a", &["b", "c"], "all").await.unwrap(), 5);
        assert_eq!(facade.s_inter_and_store("a", &["b"], "both").await.unwrap(), 2);
        assert_eq!(facade.s_diff_and_store("a", &["b", "c"], "only").await.unwrap(), 1);
        assert_eq!(sorted(facade.s_members("only").await.unwrap()), vec!["1"]);
    }
}
