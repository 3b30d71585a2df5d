use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use crate::error::{AppResult, ConnectionError, ServerError};
use crate::hardening::ACCEPT_BACKOFF;
use crate::net::connection::handle_connection;
use crate::probe::Probe;
use crate::state::registry::Registry;
use crate::state::session::Session;

/// Accepts clients, runs one task per session and coordinates shutdown.
///
/// Accept errors outside of shutdown are logged and retried after a short
/// backoff instead of stopping the server.
pub struct Listener {
    /// Taken out (and so closed) by the accept loop or by shutdown.
    socket: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    registry: Arc<Registry>,
    probe: Arc<dyn Probe>,
    sessions: DashMap<u64, Arc<Session>>,
    next_session: AtomicU64,
    shutting_down: watch::Sender<bool>,
}

impl Listener {
    pub async fn bind(addr: &str, registry: Arc<Registry>, probe: Arc<dyn Probe>) -> AppResult<Arc<Self>> {
        let bind_err = |source: std::io::Error| ServerError::Bind { addr: addr.to_string(), source };
        let socket = TcpListener::bind(addr).await.map_err(bind_err)?;
        let local_addr = socket.local_addr().map_err(bind_err)?;

        Ok(Arc::new(Self {
            socket: Mutex::new(Some(socket)),
            local_addr,
            registry,
            probe,
            sessions: DashMap::new(),
            next_session: AtomicU64::new(1),
            shutting_down: watch::Sender::new(false),
        }))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutting_down.borrow()
    }

    /// Accept loop. Returns once `shutdown_all` has been called.
    pub async fn run(self: Arc<Self>) -> AppResult<()> {
        let socket = self.socket.lock().take();
        let Some(socket) = socket else {
            return Ok(());
        };
        let mut stop = self.shutting_down.subscribe();
        tracing::info!(addr=%self.local_addr, "listening");

        loop {
            tokio::select! {
                // The watch guard must not outlive this branch: it is not Send.
                _ = async { let _ = stop.wait_for(|stop| *stop).await; } => break,
                res = socket.accept() => match res {
                    Ok((stream, peer)) => self.spawn_session(stream, peer),
                    Err(e) => {
                        if self.is_shutting_down() {
                            break;
                        }
                        tracing::error!(error=%ServerError::Accept(e), "failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }

        tracing::info!(addr=%self.local_addr, "listener closed");
        Ok(())
    }

    /// Stops accepting and tears down every live session. Safe to repeat.
    pub fn shutdown_all(&self) {
        if !self.shutting_down.send_replace(true) {
            tracing::info!(sessions = self.sessions.len(), "shutting down");
        }
        drop(self.socket.lock().take());

        let live: Vec<Arc<Session>> = self.sessions.iter().map(|e| e.value().clone()).collect();
        for sess in live {
            sess.teardown(&self.registry);
        }
    }

    fn spawn_session(self: &Arc<Self>, stream: TcpStream, peer: SocketAddr) {
        let key = self.next_session.fetch_add(1, Ordering::Relaxed);
        let sess = Arc::new(Session::new(peer));
        self.sessions.insert(key, sess.clone());
        tracing::info!(%peer, "client connected");

        // Shutdown may have swept the set just before this insert.
        if self.is_shutting_down() {
            sess.teardown(&self.registry);
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            match handle_connection(stream, sess, this.registry.clone(), this.probe.clone()).await {
                Ok(()) | Err(ConnectionError::Closed(_)) => {}
                Err(e) => tracing::warn!(%peer, error=%e, "connection error"),
            }
            this.sessions.remove(&key);
            tracing::info!(%peer, "client disconnected");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::TcpProbe;
    use std::time::Duration;

    fn assert_send<T: Send>(_: &T) {}

    async fn bind() -> Arc<Listener> {
        let probe = Arc::new(TcpProbe::new(Duration::from_millis(100)));
        Listener::bind("127.0.0.1:0", Arc::new(Registry::new()), probe).await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn run_is_spawnable_and_stops_on_shutdown() {
        let listener = bind().await;
        let fut = listener.clone().run();
        assert_send(&fut);

        let task = tokio::spawn(fut);
        listener.shutdown_all();
        tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap().unwrap();
        assert!(listener.is_shutting_down());
    }

    #[tokio::test]
    async fn run_after_shutdown_returns_immediately() {
        let listener = bind().await;
        listener.shutdown_all();
        listener.shutdown_all();
        listener.clone().run().await.unwrap();
        assert_eq!(listener.session_count(), 0);
    }
}
