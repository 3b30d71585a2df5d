use std::sync::Arc;
use crate::commands::{CmdCtx, CommandOutput};
use crate::success;

pub fn post(ctx: Arc<CmdCtx>, name: &str, age: i64) -> CommandOutput {
    let id = ctx.registry.insert(name, age);
    tracing::debug!(%id, name, age, "user posted");

    success!(format!("HTTP/1.1 200 OK\n\nUser data updated\nid: {id}"))
}
