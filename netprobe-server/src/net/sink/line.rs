use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use crate::error::ConnectionError;
use crate::net::sink::ClientSink;

/// Newline-terminated UTF-8 messages over any async writer.
pub struct LineSink<W> {
    writer: W,
}

impl<W> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl<W> ClientSink for LineSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Err(e) = self.writer.shutdown().await {
            tracing::trace!(error=%e, "shutdown on closed socket");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_newline() {
        let mut sink = LineSink::new(Vec::<u8>::new());
        sink.send_line("How old are you?").await.unwrap();
        sink.send_line("").await.unwrap();
        assert_eq!(sink.writer, b"How old are you?\n\n");
    }
}
