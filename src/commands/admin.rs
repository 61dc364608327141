//! Admin commands (PING, FLUSHDB)

use super::{Command, CommandResult};
use crate::protocol::RespValue;
use crate::store::Keyspace;
use bytes::Bytes;

/// PING command - Liveness check
///
/// Syntax: PING [message]
pub struct PingCommand;

impl Command for PingCommand {
    fn execute(&self, _ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        Ok(match args.first() {
            Some(message) => RespValue::BulkString(message.clone()),
            None => RespValue::simple_string("PONG"),
        })
    }

    fn name(&self) -> &'static str {
        "PING"
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// FLUSHDB command - Remove every key
///
/// Syntax: FLUSHDB
pub struct FlushDbCommand;

impl Command for FlushDbCommand {
    fn execute(&self, ks: &mut Keyspace, _args: &[Bytes]) -> CommandResult {
        ks.clear();
        Ok(RespValue::ok())
    }

    fn name(&self) -> &'static str {
        "FLUSHDB"
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}
