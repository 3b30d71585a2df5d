use std::sync::Arc;
use crate::commands::{CmdCtx, CommandOutput};
use crate::success;

pub async fn ping(ctx: Arc<CmdCtx>, host: &str) -> CommandOutput {
    success!(ctx.probe.host_online(host).await)
}
