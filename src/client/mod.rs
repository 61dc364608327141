//! Store access
//!
//! The facade only talks to a [`StoreClient`]: something that executes one
//! command, or a batch of them, and hands back raw RESP replies. Two
//! implementations ship with the crate, one over TCP and one in process.

mod connection;
mod memory;
mod tcp;

pub use connection::Connection;
pub use memory::MemoryClient;
pub use tcp::TcpClient;

use crate::error::Result;
use crate::protocol::RespValue;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// A command: its name followed by byte-string arguments
#[derive(Clone, PartialEq, Eq)]
pub struct Cmd {
    args: Vec<Bytes>,
}

impl Cmd {
    pub fn new(name: &str) -> Self {
        Cmd {
            args: vec![Bytes::copy_from_slice(name.as_bytes())],
        }
    }

    /// Append an argument
    pub fn arg<A: AsRef<[u8]>>(mut self, arg: A) -> Self {
        self.args.push(Bytes::copy_from_slice(arg.as_ref()));
        self
    }

    /// Append an argument that is already `Bytes`, without copying
    pub fn arg_bytes(mut self, arg: Bytes) -> Self {
        self.args.push(arg);
        self
    }

    /// Append every item of `args`
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        for arg in args {
            self.args.push(Bytes::copy_from_slice(arg.as_ref()));
        }
        self
    }

    /// Command name as written by the caller
    pub fn name(&self) -> &str {
        self.args
            .first()
            .and_then(|name| std::str::from_utf8(name).ok())
            .unwrap_or("")
    }

    /// Name and arguments, in wire order
    pub fn as_slice(&self) -> &[Bytes] {
        &self.args
    }
}

impl fmt::Debug for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for arg in &self.args {
            list.entry(&String::from_utf8_lossy(arg));
        }
        list.finish()
    }
}

/// Access to a key-value store speaking RESP commands
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Execute one command and return its reply
    ///
    /// Error replies from the store come back as `RespValue::Error`, not as
    /// `Err`; `Err` is reserved for transport and protocol failures.
    async fn execute(&self, cmd: Cmd) -> Result<RespValue>;

    /// Execute a batch of commands, returning one reply per command in order
    async fn pipeline(&self, cmds: Vec<Cmd>) -> Result<Vec<RespValue>> {
        let mut replies = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            replies.push(self.execute(cmd).await?);
        }
        Ok(replies)
    }
}

#[async_trait]
impl<C: StoreClient + ?Sized> StoreClient for std::sync::Arc<C> {
    async fn execute(&self, cmd: Cmd) -> Result<RespValue> {
        (**self).execute(cmd).await
    }

    async fn pipeline(&self, cmds: Vec<Cmd>) -> Result<Vec<RespValue>> {
        (**self).pipeline(cmds).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("SET").arg("k").arg(b"v").arg_bytes(Bytes::from("x"));
        assert_eq!(cmd.name(), "SET");
        assert_eq!(
            cmd.as_slice(),
            &[
                Bytes::from("SET"),
                Bytes::from("k"),
                Bytes::from("v"),
                Bytes::from("x"),
            ]
        );
    }

    #[test]
    fn test_cmd_args_and_debug() {
        let cmd = Cmd::new("DEL").args(["a", "b"]);
        assert_eq!(cmd.as_slice().len(), 3);
        assert_eq!(format!("{:?}", cmd), r#"["DEL", "a", "b"]"#);
    }
}
