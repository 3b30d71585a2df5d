use std::net::SocketAddr;
use netprobe_core::{UserId, UserRecord};
use parking_lot::Mutex;
use tokio::sync::Notify;
use crate::banner::{AGE_PROMPT, AGE_RETRY_PROMPT};
use crate::state::registry::Registry;

/// Registration handshake, fed one line at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnState {
    Connected,
    AwaitingName,
    AwaitingAge { name: String },
    /// Last age line did not parse; the prompt is repeated until it does.
    AgeInvalid { name: String },
    Registered { record: UserRecord },
}

/// What the connection should do after feeding a line to the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeStep {
    Prompt(&'static str),
    Complete(UserRecord),
}

impl ConnState {
    /// Advance by one received line. Once registered, feeding repeats the completion.
    pub fn feed(&mut self, line: &str) -> HandshakeStep {
        let current = std::mem::replace(self, ConnState::Connected);
        let (next, step) = match current {
            ConnState::Connected | ConnState::AwaitingName => {
                // The name is taken literally, empty included.
                let name = line.to_string();
                (ConnState::AwaitingAge { name }, HandshakeStep::Prompt(AGE_PROMPT))
            }
            ConnState::AwaitingAge { name } | ConnState::AgeInvalid { name } => {
                match UserRecord::parse_age(line) {
                    Ok(age) => {
                        let record = UserRecord::new(name, age);
                        (ConnState::Registered { record: record.clone() }, HandshakeStep::Complete(record))
                    }
                    Err(_) => (ConnState::AgeInvalid { name }, HandshakeStep::Prompt(AGE_RETRY_PROMPT)),
                }
            }
            ConnState::Registered { record } => {
                (ConnState::Registered { record: record.clone() }, HandshakeStep::Complete(record))
            }
        };
        *self = next;
        step
    }
}

#[derive(Debug)]
struct Lifecycle {
    id: Option<UserId>,
    alive: bool,
}

/// Per-connection state shared between the connection task and the listener.
#[derive(Debug)]
pub struct Session {
    pub peer: SocketAddr,
    lifecycle: Mutex<Lifecycle>,
    shutdown: Notify,
}

impl Session {
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            peer,
            lifecycle: Mutex::new(Lifecycle { id: None, alive: true }),
            shutdown: Notify::new(),
        }
    }

    pub fn id(&self) -> Option<UserId> {
        self.lifecycle.lock().id.clone()
    }

    /// Binds the registry id; only the first bind sticks. If the session was
    /// already torn down the entry is removed again and `false` is returned.
    pub fn register(&self, id: UserId, registry: &Registry) -> bool {
        {
            let mut lc = self.lifecycle.lock();
            if lc.alive {
                lc.id.get_or_insert(id);
                return true;
            }
        }
        registry.remove(&id);
        false
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle.lock().alive
    }

    /// Single teardown path for exit, socket failure and server shutdown.
    /// Returns `true` only for the call that actually tore the session down.
    pub fn teardown(&self, registry: &Registry) -> bool {
        let id = {
            let mut lc = self.lifecycle.lock();
            if !lc.alive {
                return false;
            }
            lc.alive = false;
            lc.id.clone()
        };

        if let Some(id) = id {
            if registry.remove(&id).is_some() {
                tracing::info!(peer=%self.peer, %id, "user deregistered");
            }
        }

        // Wakes the connection task so it drops its socket.
        self.shutdown.notify_one();
        true
    }

    /// Resolves once teardown has been requested.
    pub async fn closed(&self) {
        if !self.is_alive() {
            return;
        }
        self.shutdown.notified().await;
    }
}
