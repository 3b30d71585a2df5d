use std::sync::Arc;
use crate::commands::{CmdCtx, CommandOutput};
use crate::error::ConnectionError;
use crate::net::sink::ClientSink;
use crate::probe::DEFAULT_SCAN_REQUESTS;
use crate::success;

pub async fn port(
    ctx: Arc<CmdCtx>,
    out: &mut dyn ClientSink,
    ip: &str,
    start: u16,
    end: u16,
    num_requests: Option<u32>,
) -> Result<CommandOutput, ConnectionError> {
    // Reachability goes out first; a scan can take a while.
    out.send_line(&ctx.probe.host_online(ip).await).await?;

    let n = num_requests.unwrap_or(DEFAULT_SCAN_REQUESTS);
    Ok(success!(ctx.probe.scan_port_range(ip, start, end, n).await))
}
