use std::sync::Arc;
use netprobe_core::UserId;
use crate::commands::{CmdCtx, CommandOutput};
use crate::{failure, success};

pub fn get(ctx: Arc<CmdCtx>, id: &UserId) -> CommandOutput {
    let Some(record) = ctx.registry.get(id) else {
        return failure!("HTTP/1.1 404 Not Found\n\nUser not found");
    };

    match serde_json::to_string(&record) {
        Ok(body) => success!(format!("HTTP/1.1 200 OK\nContent-Type: application/json\n\n{body}")),
        Err(e) => {
            tracing::error!(%id, error=%e, "failed to encode user record");
            failure!("HTTP/1.1 500 Internal Server Error\n\nCould not encode user")
        }
    }
}
