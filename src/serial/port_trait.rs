//! Trait abstraction for serial port operations to enable testing

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};

/// Modem-control output lines wired to device enable/wake pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlLine {
    /// Data Terminal Ready
    Dtr,
    /// Request To Send
    Rts,
}

/// Trait for serial port I/O operations
///
/// Every receive carries its own timeout; no call blocks indefinitely.
#[async_trait]
pub trait SerialTransport: Send {
    /// Write all data to the port and flush it
    async fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read until `buf` is full or `timeout` elapses, returning the byte count
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    /// Read a variable-length burst, stopping early once the line goes idle
    async fn receive_until_idle(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    /// Drive a modem-control line
    fn set_line(&mut self, line: ControlLine, level: bool) -> io::Result<()>;
}

/// Wrapper around tokio_serial::SerialStream that implements SerialTransport
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
    /// Silence that ends an idle-terminated read
    idle_gap: Duration,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream, idle_gap: Duration) -> Self {
        Self { port, idle_gap }
    }

    async fn read_into(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
        idle_gap: Option<Duration>,
    ) -> io::Result<usize> {
        let deadline = Instant::now() + timeout;
        let mut filled = 0;

        while filled < buf.len() {
            let wait_until = match idle_gap {
                Some(gap) if filled > 0 => (Instant::now() + gap).min(deadline),
                _ => deadline,
            };

            match timeout_at(wait_until, self.port.read(&mut buf[filled..])).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => filled += n,
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            }
        }

        Ok(filled)
    }
}

#[async_trait]
impl SerialTransport for TokioSerialPort {
    async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data).await?;
        self.port.flush().await
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.read_into(buf, timeout, None).await
    }

    async fn receive_until_idle(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let gap = self.idle_gap;
        self.read_into(buf, timeout, Some(gap)).await
    }

    fn set_line(&mut self, line: ControlLine, level: bool) -> io::Result<()> {
        use tokio_serial::SerialPort;

        let result = match line {
            ControlLine::Dtr => self.port.write_data_terminal_ready(level),
            ControlLine::Rts => self.port.write_request_to_send(level),
        };
        result.map_err(io::Error::from)
    }
}
