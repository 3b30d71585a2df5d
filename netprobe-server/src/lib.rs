pub mod banner;
pub mod commands;
pub mod config;
pub mod error;
pub mod hardening;
pub mod input;
pub mod net;
pub mod probe;
pub mod state;

// Convenient re-exports (so call sites can do `netprobe_server::Registry`, etc.)
pub use commands::process_command;
pub use net::listener::Listener;
pub use probe::{Probe, TcpProbe};
pub use state::{
    registry::Registry,
    session::{ConnState, Session},
};
