use std::sync::Arc;
use crate::commands::{CmdCtx, CommandOutput};
use crate::error::ConnectionError;
use crate::net::sink::ClientSink;
use crate::probe::DEFAULT_RESPONSE_REQUESTS;
use crate::success;

pub async fn res_time(
    ctx: Arc<CmdCtx>,
    out: &mut dyn ClientSink,
    ip: &str,
    port: u16,
    num_requests: Option<u32>,
) -> Result<CommandOutput, ConnectionError> {
    out.send_line(&ctx.probe.host_online(ip).await).await?;

    let n = num_requests.unwrap_or(DEFAULT_RESPONSE_REQUESTS);
    Ok(success!(ctx.probe.port_response_time(ip, port, n).await))
}
