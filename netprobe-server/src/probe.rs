//! Network diagnostics consumed by the command loop.
//!
//! The session treats every result as opaque text and relays it verbatim.
//! Implementations bound their own running time; the caller imposes none.

mod tcp;

pub use tcp::TcpProbe;

use async_trait::async_trait;

/// Request count for `/port` when the client gives none
pub const DEFAULT_SCAN_REQUESTS: u32 = 1;
/// Request count for `/res_time` when the client gives none
pub const DEFAULT_RESPONSE_REQUESTS: u32 = 4;

#[async_trait]
pub trait Probe: Send + Sync {
    /// Human-readable reachability status of `host`.
    async fn host_online(&self, host: &str) -> String;

    /// Human-readable summary of the open ports in `start..=end`.
    async fn scan_port_range(&self, ip: &str, start: u16, end: u16, num_requests: u32) -> String;

    /// Human-readable timing summary for a single port.
    async fn port_response_time(&self, ip: &str, port: u16, num_requests: u32) -> String;
}
