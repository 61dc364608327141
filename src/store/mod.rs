//! In-memory keyspace
//!
//! Backs `MemoryClient`. Knows nothing about RESP or commands; commands
//! operate on it through `Keyspace` and the `Value` variants.

mod entry;
mod value;
mod zset;
mod keyspace;

pub use entry::Entry;
pub use value::Value;
pub use zset::SortedSet;
pub use keyspace::Keyspace;
