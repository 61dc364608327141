//! In-process store client
//!
//! Executes commands against a local keyspace through the same dispatcher
//! and command registry a server would use. Meant for embedding and tests;
//! nothing is persisted.

use super::{Cmd, StoreClient};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::protocol::RespValue;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// Store client backed by an in-memory keyspace
pub struct MemoryClient {
    dispatcher: Mutex<Dispatcher>,
}

impl MemoryClient {
    pub fn new() -> Self {
        MemoryClient {
            dispatcher: Mutex::new(Dispatcher::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MemoryClient {
            dispatcher: Mutex::new(Dispatcher::with_capacity(capacity)),
        }
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreClient for MemoryClient {
    async fn execute(&self, cmd: Cmd) -> Result<RespValue> {
        let mut dispatcher = self.dispatcher.lock().await;
        Ok(dispatcher.dispatch(cmd.as_slice()))
    }

    /// Runs the whole batch under one lock, so no other caller sees it half
    /// applied
    async fn pipeline(&self, cmds: Vec<Cmd>) -> Result<Vec<RespValue>> {
        debug!("Pipelining {} command(s) in memory", cmds.len());
        let mut dispatcher = self.dispatcher.lock().await;
        Ok(cmds
            .iter()
            .map(|cmd| dispatcher.dispatch(cmd.as_slice()))
            .collect())
    }
}
