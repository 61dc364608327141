//! Command dispatcher
//!
//! Routes a command (name plus arguments) to its handler in the registry,
//! checks arity, and turns handler failures into error frames.

use crate::commands::CommandRegistry;
use crate::protocol::RespValue;
use crate::store::Keyspace;
use bytes::Bytes;
use tracing::{debug, warn};

/// Command dispatcher
pub struct Dispatcher {
    registry: CommandRegistry,

    keyspace: Keyspace,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            registry: CommandRegistry::new(),
            keyspace: Keyspace::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Dispatcher {
            registry: CommandRegistry::new(),
            keyspace: Keyspace::with_capacity(capacity),
        }
    }

    /// Dispatch a command
    ///
    /// `command[0]` is the command name, the rest are its arguments. Always
    /// produces a reply; failures come back as error frames.
    pub fn dispatch(&mut self, command: &[Bytes]) -> RespValue {
        let (name, args) = match command.split_first() {
            Some(split) => split,
            None => return RespValue::error("ERR empty command"),
        };

        let cmd_name = match std::str::from_utf8(name) {
            Ok(s) => s,
            Err(_) => return RespValue::error("ERR invalid command name encoding"),
        };

        debug!("Dispatching command: {}", cmd_name);

        let command = match self.registry.get(cmd_name) {
            Some(cmd) => cmd,
            None => {
                warn!("Unknown command: {}", cmd_name);
                return RespValue::error(format!("ERR unknown command '{}'", cmd_name));
            }
        };

        let too_few = args.len() < command.min_args();
        let too_many = command.max_args().is_some_and(|max| args.len() > max);
        if too_few || too_many {
            return RespValue::error(format!(
                "ERR wrong number of arguments for '{}' command",
                cmd_name.to_lowercase()
            ));
        }

        match command.execute(&mut self.keyspace, args) {
            Ok(reply) => reply,
            Err(e) => {
                debug!("{} failed: {}", command.name(), e);
                e.into()
            }
        }
    }

    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
