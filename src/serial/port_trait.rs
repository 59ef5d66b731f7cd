//! Serial sink abstraction so the device can be driven against any transport

use async_trait::async_trait;
use std::io;

/// Write-only, ordered byte sink (a UART in production, memory in tests)
#[async_trait]
pub trait SerialSink: Send {
    /// Write all data to the sink
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}
