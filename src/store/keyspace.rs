//! Key -> entry map with lazy expiry

use super::entry::Entry;
use super::value::Value;
use bytes::Bytes;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::time::Instant;

type KeyMap = HashMap<Bytes, Entry, BuildHasherDefault<SipHasher13>>;

/// The in-memory keyspace
///
/// Expired entries are removed the first time they are touched; until then
/// every accessor treats them as absent.
pub struct Keyspace {
    entries: KeyMap,
}

impl Keyspace {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Keyspace {
            entries: HashMap::with_capacity_and_hasher(
                capacity,
                BuildHasherDefault::<SipHasher13>::default(),
            ),
        }
    }

    /// Drop the entry for `key` if it has expired
    fn purge(&mut self, key: &[u8]) {
        if self.entries.get(key).is_some_and(Entry::is_expired) {
            self.entries.remove(key);
        }
    }

    /// Store a value, replacing whatever was there and clearing its expiry
    pub fn set(&mut self, key: Bytes, value: Value) {
        self.entries.insert(key, Entry::new(value));
    }

    /// Store a value that expires at `expire_at`
    pub fn set_until(&mut self, key: Bytes, value: Value, expire_at: Instant) {
        self.entries.insert(key, Entry::with_expiration(value, expire_at));
    }

    pub fn get(&mut self, key: &[u8]) -> Option<&Value> {
        self.purge(key);
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut Value> {
        self.purge(key);
        self.entries.get_mut(key).map(|entry| &mut entry.value)
    }

    /// Mutable access to the value at `key`, inserting `make()` if absent
    pub fn get_or_insert_with(&mut self, key: &Bytes, make: impl FnOnce() -> Value) -> &mut Value {
        self.purge(key);
        &mut self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(make()))
            .value
    }

    /// Delete `key` if it now holds an empty collection
    pub fn remove_if_empty(&mut self, key: &[u8]) {
        if self.entries.get(key).is_some_and(|entry| entry.value.is_empty_collection()) {
            self.entries.remove(key);
        }
    }

    /// Delete a key, returns true if it existed
    pub fn delete(&mut self, key: &[u8]) -> bool {
        self.purge(key);
        self.entries.remove(key).is_some()
    }

    pub fn exists(&mut self, key: &[u8]) -> bool {
        self.purge(key);
        self.entries.contains_key(key)
    }

    /// Expire `key` at `expire_at`; returns false when the key does not exist
    ///
    /// A deadline already reached deletes the key.
    pub fn expire(&mut self, key: &[u8], expire_at: Instant) -> bool {
        self.purge(key);
        if expire_at <= Instant::now() {
            return self.entries.remove(key).is_some();
        }
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.set_expiration(expire_at);
                true
            }
            None => false,
        }
    }

    /// Remaining TTL: seconds, -1 without expiry, -2 when missing
    pub fn ttl(&mut self, key: &[u8]) -> i64 {
        self.purge(key);
        match self.entries.get(key) {
            Some(entry) => entry.ttl_seconds(),
            None => -2,
        }
    }

    /// Live keys, in no particular order
    pub fn keys(&self) -> Vec<Bytes> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.values().filter(|entry| !entry.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_basic_set_get() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("key1"), Value::string("value1"));

        assert_eq!(ks.get(b"key1"), Some(&Value::string("value1")));
        assert_eq!(ks.get(b"key2"), None);
    }

    #[test]
    fn test_delete_and_exists() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("key1"), Value::string("value1"));

        assert!(ks.exists(b"key1"));
        assert!(ks.delete(b"key1"));
        assert!(!ks.delete(b"key1"));
        assert!(!ks.exists(b"key1"));
    }

    #[test]
    fn test_expired_entries_are_invisible() {
        let mut ks = Keyspace::new();
        ks.set_until(Bytes::from("gone"), Value::string("v"), Instant::now());
        ks.set(Bytes::from("kept"), Value::string("v"));

        assert_eq!(ks.get(b"gone"), None);
        assert_eq!(ks.ttl(b"gone"), -2);
        assert_eq!(ks.keys(), vec![Bytes::from("kept")]);
        assert_eq!(ks.len(), 1);
    }

    #[test]
    fn test_expire_and_ttl() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("k"), Value::string("v"));

        assert_eq!(ks.ttl(b"k"), -1);
        let in_100s = Instant::now() + Duration::from_secs(100);
        assert!(ks.expire(b"k", in_100s));
        assert_eq!(ks.ttl(b"k"), 100);
        assert!(!ks.expire(b"missing", in_100s));

        // Overwriting clears the expiry
        ks.set(Bytes::from("k"), Value::string("w"));
        assert_eq!(ks.ttl(b"k"), -1);
    }

    #[test]
    fn test_non_positive_expire_deletes() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("k"), Value::string("v"));
        assert!(ks.expire(b"k", Instant::now()));
        assert!(!ks.exists(b"k"));
    }

    #[test]
    fn test_get_or_insert_replaces_expired() {
        let mut ks = Keyspace::new();
        ks.set_until(Bytes::from("l"), Value::string("old"), Instant::now());

        let value = ks.get_or_insert_with(&Bytes::from("l"), Value::empty_list);
        assert_eq!(value.type_name(), "list");
        assert_eq!(ks.ttl(b"l"), -1);
    }

    #[test]
    fn test_remove_if_empty() {
        let mut ks = Keyspace::new();
        ks.get_or_insert_with(&Bytes::from("s"), Value::empty_set);
        ks.remove_if_empty(b"s");
        assert!(!ks.exists(b"s"));
    }
}
