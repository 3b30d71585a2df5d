use std::net::SocketAddr;
use thiserror::Error;

pub type AppResult<T> = Result<T, ServerError>;

/// Failures of the listener as a whole.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening address could not be bound. Fatal at startup.
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),
}

/// Failures that end a single session. Never propagated past the session.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection closed by {0}")]
    Closed(SocketAddr),

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
