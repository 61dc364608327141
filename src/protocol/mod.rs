//! RESP2 protocol implementation
//!
//! Frame types plus the parser and encoder used on both sides of a store
//! client: commands go out as arrays of bulk strings, replies come back as
//! any frame.

mod types;
mod resp;

pub use types::{RespValue, RespError};
pub(crate) use types::format_float;
pub use resp::{RespParser, RespEncoder};
