use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ClientError;
use crate::gate::SyncGate;

pub const DEFAULT_READ_BUFFER: usize = 256;

/// Drains the server side of the connection and prints whatever arrives.
pub struct Receiver<R, O> {
    reader: R,
    out: O,
    gate: Arc<SyncGate>,
    buffer_size: usize,
}

impl<R, O> Receiver<R, O>
where
    R: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    pub fn new(reader: R, out: O, gate: Arc<SyncGate>, buffer_size: usize) -> Self {
        Self {
            reader,
            out,
            gate,
            buffer_size: buffer_size.max(1),
        }
    }

    /// Runs until the server closes the connection or a read fails. The gate
    /// is closed on the way out so a console waiting on `ls` is released.
    pub async fn run(mut self) -> Result<(), ClientError> {
        let result = self.pump().await;
        self.gate.close();
        result
    }

    async fn pump(&mut self) -> Result<(), ClientError> {
        let mut buf = vec![0u8; self.buffer_size];
        loop {
            let n = match self.reader.read(&mut buf).await {
                Ok(0) => {
                    log::warn!("Server closed the connection");
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) => {
                    log::error!("Failed to read from server: {}", e);
                    return Err(ClientError::Read(e));
                }
            };
            log::debug!("Received {} bytes", n);

            // Printed verbatim; the server's text is not assumed to be UTF-8.
            self.out
                .write_all(strip_nul(&buf[..n]))
                .await
                .map_err(ClientError::Console)?;
            self.out.write_all(b"\n").await.map_err(ClientError::Console)?;
            self.out.flush().await.map_err(ClientError::Console)?;

            self.gate.signal();
        }
    }
}

// The server may send C strings; drop the terminator and any padding.
fn strip_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |idx| idx + 1);
    &bytes[..end]
}
