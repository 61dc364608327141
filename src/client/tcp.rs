//! RESP over TCP
//!
//! A single connection; concurrent callers queue on a mutex. Pipelines hold
//! the lock for the whole batch so replies are never interleaved. A
//! connection left out of step by a failed exchange is replaced on the next
//! call.

use super::{Cmd, Connection, StoreClient};
use crate::config::ClientConfig;
use crate::convert::checked;
use crate::error::{Error, Result};
use crate::protocol::RespValue;
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Store client over one TCP connection
pub struct TcpClient {
    config: ClientConfig,
    conn: Mutex<Connection<TcpStream>>,
}

impl TcpClient {
    /// Connect, then authenticate and select the database when configured
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let conn = Self::open(config).await?;
        Ok(TcpClient {
            config: config.clone(),
            conn: Mutex::new(conn),
        })
    }

    async fn open(config: &ClientConfig) -> Result<Connection<TcpStream>> {
        let timeout = Duration::from_millis(config.connect_timeout_ms);
        let stream = tokio::time::timeout(timeout, TcpStream::connect(&config.addr))
            .await
            .map_err(|_| Error::Timeout)??;
        stream.set_nodelay(true)?;

        let mut conn = Connection::new(stream);

        if let Some(password) = &config.password {
            checked(conn.request(&Cmd::new("AUTH").arg(password)).await?)?;
        }
        if config.database != 0 {
            checked(conn.request(&Cmd::new("SELECT").arg(config.database.to_string())).await?)?;
        }

        info!("Connected to {} (db {})", config.addr, config.database);
        Ok(conn)
    }

    /// The connection, reopened first if an earlier exchange broke it
    async fn usable(&self) -> Result<MutexGuard<'_, Connection<TcpStream>>> {
        let mut conn = self.conn.lock().await;
        if conn.is_broken() {
            warn!("Reconnecting to {}", self.config.addr);
            *conn = Self::open(&self.config).await?;
        }
        Ok(conn)
    }
}

#[async_trait]
impl StoreClient for TcpClient {
    async fn execute(&self, cmd: Cmd) -> Result<RespValue> {
        debug!("Executing {}", cmd.name());
        let mut conn = self.usable().await?;
        conn.request(&cmd).await
    }

    async fn pipeline(&self, cmds: Vec<Cmd>) -> Result<Vec<RespValue>> {
        if cmds.is_empty() {
            return Ok(Vec::new());
        }
        debug!(
            "Pipelining {}",
            cmds.iter().map(Cmd::name).collect::<Vec<_>>().join(" ")
        );
        let mut conn = self.usable().await?;
        conn.pipeline(&cmds).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::Facade;
    use bytes::Bytes;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned replies to whatever arrives, one reply per read
    async fn fake_server(replies: Vec<&'static [u8]>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 1024];
            for reply in replies {
                if socket.read(&mut buf).await.unwrap() == 0 {
                    return;
                }
                socket.write_all(reply).await.unwrap();
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_connect_auth_select() {
        let addr = fake_server(vec![b"+OK\r\n", b"+OK\r\n", b"$3\r\nbar\r\n"]).await;
        let config = ClientConfig {
            addr,
            password: Some("secret".to_string()),
            database: 2,
            ..ClientConfig::default()
        };

        let client = TcpClient::connect(&config).await.unwrap();
        let reply = client.execute(Cmd::new("GET").arg("foo")).await.unwrap();
        assert_eq!(reply, RespValue::BulkString(Bytes::from("bar")));
    }

    #[tokio::test]
    async fn test_auth_rejected() {
        let addr = fake_server(vec![b"-WRONGPASS invalid password\r\n"]).await;
        let config = ClientConfig {
            addr,
            password: Some("bad".to_string()),
            ..ClientConfig::default()
        };

        let err = TcpClient::connect(&config).await.err().unwrap();
        assert!(matches!(err, Error::Server(msg) if msg.starts_with("WRONGPASS")));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let config = ClientConfig { addr, ..ClientConfig::default() };
        assert!(TcpClient::connect(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_late_reply_goes_to_its_own_caller() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 1024];

            socket.read(&mut buf).await.unwrap();
            tokio::time::sleep(Duration::from_millis(150)).await;
            socket.write_all(b"$7\r\nvalue-a\r\n").await.unwrap();

            socket.read(&mut buf).await.unwrap();
            socket.write_all(b"$7\r\nvalue-b\r\n").await.unwrap();
        });

        let config = ClientConfig { addr, ..ClientConfig::default() };
        let facade = Facade::new(TcpClient::connect(&config).await.unwrap());

        let gave_up = tokio::time::timeout(Duration::from_millis(50), facade.get_string("a")).await;
        assert!(gave_up.is_err());

        assert_eq!(facade.get_string("b").await.unwrap().as_deref(), Some("value-b"));
    }

    #[tokio::test]
    async fn test_reconnects_after_garbage() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 1024];
            for reply in [&b"?oops\r\n"[..], &b"$2\r\nok\r\n"[..]] {
                let (mut socket, _) = listener.accept().await.unwrap();
                socket.read(&mut buf).await.unwrap();
                socket.write_all(reply).await.unwrap();
            }
        });

        let config = ClientConfig { addr, ..ClientConfig::default() };
        let client = TcpClient::connect(&config).await.unwrap();

        let err = client.execute(Cmd::new("GET").arg("k")).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));

        let reply = client.execute(Cmd::new("GET").arg("k")).await.unwrap();
        assert_eq!(reply, RespValue::BulkString(Bytes::from("ok")));
    }
}
