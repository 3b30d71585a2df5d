pub mod line;

use crate::error::ConnectionError;
use async_trait::async_trait;

#[async_trait]
pub trait ClientSink: Send {
    /// Sends one protocol message; the sink appends the `\n` terminator.
    async fn send_line(&mut self, line: &str) -> Result<(), ConnectionError>;

    /// Closes the outgoing side. Errors from an already closed peer are ignored.
    async fn close(&mut self);
}

/// In-memory sink, collects every message it is handed.
#[async_trait]
impl ClientSink for Vec<String> {
    async fn send_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        self.push(line.to_string());
        Ok(())
    }

    async fn close(&mut self) {}
}
