//! ferrum-facade - typed access to a Redis-compatible key-value store
//!
//! The crate is layered so each part can be used on its own:
//! - `facade`: typed operations with expirations and numeric coercion
//! - `client`: the `StoreClient` seam, over TCP or in process
//! - `protocol`: the RESP2 codec
//! - `store`, `commands`, `dispatch`: the keyspace behind the in-process client

pub mod protocol;
pub mod store;
pub mod commands;
pub mod dispatch;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod expiry;
pub mod facade;

/// Re-export commonly used types
pub use client::{Cmd, MemoryClient, StoreClient, TcpClient};
pub use config::ClientConfig;
pub use convert::{compose_score, Json};
pub use error::{Error, Result};
pub use expiry::{Expiry, TimeUnit};
pub use facade::Facade;
pub use protocol::RespValue;
pub use rust_decimal::Decimal;
