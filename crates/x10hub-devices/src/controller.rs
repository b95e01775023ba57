//! Connection to a mochad controller daemon.
//!
//! mochad bridges a CM15A/CM19A interface to a line-oriented TCP protocol.
//! Commands are single text lines (`pl a1 on`) with no acknowledgment; the
//! only request that produces a reply is `st`, which dumps the controller's
//! view of every device and ends with an `End status` line.
//!
//! The link underneath is half-duplex and cannot multiplex requests, so every
//! controller carries a [`RequestLock`] that all devices bound to it share.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{X10Error, X10Result};

/// Default mochad host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default mochad TCP port.
pub const DEFAULT_PORT: u16 = 1099;

/// Line mochad prints after the last status entry.
const STATUS_TERMINATOR: &str = "End status";

/// Raw line transport to a controller.
#[async_trait]
pub trait MochadTransport: Send + Sync {
    /// Write one command line. Fire-and-forget.
    async fn send_line(&self, line: &str) -> X10Result<()>;

    /// Request and return the full status report text.
    async fn status_report(&self) -> X10Result<String>;
}

/// Mutual-exclusion handle guarding one controller's link.
///
/// Cloning shares the same underlying lock.
#[derive(Debug, Clone, Default)]
pub struct RequestLock(Arc<Mutex<()>>);

impl RequestLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of the controller link.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }

    /// Whether two handles guard the same link.
    pub fn same_lock(&self, other: &RequestLock) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// TCP transport speaking to a mochad daemon.
pub struct TcpTransport {
    stream: Mutex<BufReader<TcpStream>>,
}

impl TcpTransport {
    pub async fn connect(host: &str, port: u16) -> X10Result<Self> {
        let stream = TcpStream::connect((host, port)).await.map_err(|e| {
            X10Error::Connection(format!("Failed to connect to mochad at {}:{}: {}", host, port, e))
        })?;
        Ok(Self {
            stream: Mutex::new(BufReader::new(stream)),
        })
    }
}

/// Discard event lines mochad has already pushed to us.
///
/// mochad echoes every `Tx`/`Rx` event to all clients. Nothing here consumes
/// them, so they are dropped before each request to keep the socket from
/// backing up and to keep them out of status replies. Returns the number of
/// bytes discarded.
fn drain_pending(stream: &mut BufReader<TcpStream>) -> X10Result<usize> {
    let mut drained = stream.buffer().len();
    stream.consume(drained);

    let mut buf = [0u8; 512];
    loop {
        match stream.get_ref().try_read(&mut buf) {
            Ok(0) => {
                return Err(X10Error::Communication(
                    "mochad closed the connection".to_string(),
                ));
            }
            Ok(n) => drained += n,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
            Err(e) => return Err(e.into()),
        }
    }

    if drained > 0 {
        debug!(bytes = drained, "Discarded unsolicited mochad output");
    }
    Ok(drained)
}

#[async_trait]
impl MochadTransport for TcpTransport {
    async fn send_line(&self, line: &str) -> X10Result<()> {
        let mut stream = self.stream.lock().await;
        drain_pending(&mut stream)?;
        stream
            .get_mut()
            .write_all(format!("{}\n", line).as_bytes())
            .await?;
        stream.get_mut().flush().await?;
        Ok(())
    }

    async fn status_report(&self) -> X10Result<String> {
        let mut stream = self.stream.lock().await;
        drain_pending(&mut stream)?;
        stream.get_mut().write_all(b"st\n").await?;
        stream.get_mut().flush().await?;

        let mut report = String::new();
        loop {
            let mut line = String::new();
            let read = stream.read_line(&mut line).await?;
            if read == 0 {
                return Err(X10Error::Communication(
                    "mochad closed the connection during status report".to_string(),
                ));
            }
            report.push_str(&line);
            if line.contains(STATUS_TERMINATOR) {
                break;
            }
        }
        Ok(report)
    }
}

/// A controller: one transport plus the lock serializing access to it.
#[derive(Clone)]
pub struct MochadController {
    transport: Arc<dyn MochadTransport>,
    lock: RequestLock,
    endpoint: String,
}

impl MochadController {
    /// Connect to a mochad daemon over TCP.
    pub async fn connect(host: &str, port: u16) -> X10Result<Self> {
        let transport = TcpTransport::connect(host, port).await?;
        let endpoint = format!("{}:{}", host, port);
        info!(endpoint = %endpoint, "Connected to mochad controller");
        Ok(Self::with_transport(Arc::new(transport), endpoint))
    }

    /// Wrap an existing transport.
    pub fn with_transport(transport: Arc<dyn MochadTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            lock: RequestLock::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The lock every device on this controller must hold for I/O.
    pub fn request_lock(&self) -> &RequestLock {
        &self.lock
    }

    pub async fn send_line(&self, line: &str) -> X10Result<()> {
        debug!(endpoint = %self.endpoint, line, "mochad send");
        self.transport.send_line(line).await
    }

    pub async fn status_report(&self) -> X10Result<String> {
        debug!(endpoint = %self.endpoint, "mochad status request");
        self.transport.status_report().await
    }
}

impl std::fmt::Debug for MochadController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MochadController")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
