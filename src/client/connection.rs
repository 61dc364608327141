//! Request/reply connection
//!
//! Drives the RESP codec over any byte stream. Commands of a batch are
//! encoded into one buffer and flushed together; replies are then read back
//! one per command.
//!
//! A caller may be dropped between sending and reading. The replies it was
//! owed are counted and discarded before the next command goes out. A
//! half-written command or an unparsable reply leaves the stream out of
//! step for good, and the connection refuses further use.

use super::Cmd;
use crate::error::{Error, Result};
use crate::protocol::{RespEncoder, RespParser, RespValue};
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// One connection to a store
pub struct Connection<S> {
    /// Underlying stream
    stream: S,

    /// Read buffer
    read_buffer: BytesMut,

    /// Write buffer
    write_buffer: BytesMut,

    /// Replies owed for commands already sent
    pending: usize,

    /// Set while a write is in flight and after any failed exchange
    broken: bool,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Connection {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
            write_buffer: BytesMut::with_capacity(4096),
            pending: 0,
            broken: false,
        }
    }

    /// True once the stream can no longer be trusted
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Send one command and wait for its reply
    pub async fn request(&mut self, cmd: &Cmd) -> Result<RespValue> {
        self.send(std::slice::from_ref(cmd)).await?;
        self.read_reply().await
    }

    /// Send a batch in one write, then read one reply per command
    pub async fn pipeline(&mut self, cmds: &[Cmd]) -> Result<Vec<RespValue>> {
        self.send(cmds).await?;
        let mut replies = Vec::with_capacity(cmds.len());
        for _ in cmds {
            replies.push(self.read_reply().await?);
        }
        Ok(replies)
    }

    /// Encode and flush commands
    pub async fn send(&mut self, cmds: &[Cmd]) -> Result<()> {
        self.resync().await?;

        self.write_buffer.clear();
        for cmd in cmds {
            RespEncoder::encode_command(&mut self.write_buffer, cmd.as_slice());
        }

        // Stays set if the write fails or is dropped half way
        self.broken = true;
        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;
        self.broken = false;
        self.pending += cmds.len();

        debug!("Sent {} command(s), {} bytes", cmds.len(), self.write_buffer.len());
        Ok(())
    }

    /// Discard replies owed to callers that stopped waiting
    async fn resync(&mut self) -> Result<()> {
        if self.broken {
            return Err(Error::ConnectionBroken);
        }
        if self.pending > 0 {
            warn!("Discarding {} unclaimed reply(ies)", self.pending);
        }
        while self.pending > 0 {
            self.read_reply().await?;
        }
        Ok(())
    }

    /// Read the next complete reply
    pub async fn read_reply(&mut self) -> Result<RespValue> {
        if self.broken {
            return Err(Error::ConnectionBroken);
        }
        loop {
            match RespParser::parse(&mut self.read_buffer) {
                Ok(Some(value)) => {
                    self.pending = self.pending.saturating_sub(1);
                    return Ok(value);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Protocol error: {}", e);
                    self.broken = true;
                    return Err(e.into());
                }
            }

            let n = match self.stream.read_buf(&mut self.read_buffer).await {
                Ok(n) => n,
                Err(e) => {
                    self.broken = true;
                    return Err(e.into());
                }
            };
            if n == 0 {
                self.broken = true;
                return Err(Error::ConnectionClosed);
            }
            debug!("Read {} bytes", n);
        }
    }
}
