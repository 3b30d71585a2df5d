use std::sync::Arc;
use crate::banner::HELP;
use crate::error::ConnectionError;
use crate::input::parser::{Command, parse_command};
use crate::net::sink::ClientSink;
use crate::probe::Probe;
use crate::state::registry::Registry;
use crate::state::session::Session;

mod get;
mod ping;
mod port;
mod post;
mod res_time;

/// Command context passed to command handlers
pub struct CmdCtx {
    /// Shared user registry
    pub registry: Arc<Registry>,
    /// Network diagnostics
    pub probe: Arc<dyn Probe>,
    /// Client session
    pub sess: Arc<Session>,
}

impl CmdCtx {
    /// Name used in per-command logging, the registry id once registered.
    pub fn who(&self) -> String {
        match self.sess.id() {
            Some(id) => id.to_string(),
            None => self.sess.peer.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct CommandOutput {
    pub message: String,
    pub is_error: bool,
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        CommandOutput { is_error: false, message: $msg.to_string() }
    };
}

#[macro_export]
macro_rules! failure {
    ($msg:expr) => {
        CommandOutput { is_error: true, message: $msg.to_string() }
    };
}

/// Whether the command loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Parses and runs one client line. Only a failing socket surfaces as an
/// error; bad input is answered on `out` and the loop continues.
pub async fn process_command(
    raw: &str,
    ctx: Arc<CmdCtx>,
    out: &mut dyn ClientSink,
) -> Result<Flow, ConnectionError> {
    let cmd = match parse_command(raw) {
        Ok(cmd) => cmd,
        Err(e) => {
            tracing::debug!(who=%ctx.who(), error=%e, "rejected command");
            out.send_line(&e.to_string()).await?;
            return Ok(Flow::Continue);
        }
    };

    if !matches!(cmd, Command::Help) {
        tracing::info!(command = cmd.as_str(), "{}: {}", ctx.who(), raw);
    }

    let output = match cmd {
        Command::Exit => return Ok(Flow::Exit),
        Command::Help => success!(HELP),
        Command::Ping { host } => ping::ping(ctx.clone(), &host).await,
        Command::Port { ip, start, end, num_requests } => {
            port::port(ctx.clone(), out, &ip, start, end, num_requests).await?
        }
        Command::ResTime { ip, port, num_requests } => {
            res_time::res_time(ctx.clone(), out, &ip, port, num_requests).await?
        }
        Command::Get { id } => get::get(ctx.clone(), &id),
        Command::Post { name, age } => post::post(ctx.clone(), &name, age),
    };

    if output.is_error {
        tracing::debug!(who=%ctx.who(), "command failed");
    }
    out.send_line(&output.message).await?;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parser::{PORT_USAGE, POST_USAGE};
    use crate::probe::{DEFAULT_RESPONSE_REQUESTS, DEFAULT_SCAN_REQUESTS};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Probe for Recorder {
        async fn host_online(&self, host: &str) -> String {
            self.calls.lock().push(format!("online {host}"));
            format!("{host} is online")
        }

        async fn scan_port_range(&self, ip: &str, start: u16, end: u16, n: u32) -> String {
            self.calls.lock().push(format!("scan {ip} {start} {end} {n}"));
            "scanned".to_string()
        }

        async fn port_response_time(&self, ip: &str, port: u16, n: u32) -> String {
            self.calls.lock().push(format!("time {ip} {port} {n}"));
            "timed".to_string()
        }
    }

    fn ctx() -> (Arc<CmdCtx>, Arc<Recorder>) {
        let probe = Arc::new(Recorder::default());
        let ctx = Arc::new(CmdCtx {
            registry: Arc::new(Registry::with_demo_users()),
            probe: probe.clone(),
            sess: Arc::new(Session::new("127.0.0.1:5000".parse().unwrap())),
        });
        (ctx, probe)
    }

    async fn run(ctx: &Arc<CmdCtx>, raw: &str) -> (Flow, Vec<String>) {
        let mut out: Vec<String> = Vec::new();
        let flow = process_command(raw, ctx.clone(), &mut out).await.unwrap();
        (flow, out)
    }

    #[tokio::test]
    async fn exit_sends_nothing() {
        let (ctx, _) = ctx();
        assert_eq!(run(&ctx, "/exit").await, (Flow::Exit, vec![]));
    }

    #[tokio::test]
    async fn unknown_input_gets_help() {
        let (ctx, _) = ctx();
        assert_eq!(run(&ctx, "what").await, (Flow::Continue, vec![HELP.to_string()]));
    }

    #[tokio::test]
    async fn port_sends_status_then_scan() {
        let (ctx, probe) = ctx();
        let (_, out) = run(&ctx, "/port 10.0.0.1 1 65535").await;
        assert_eq!(out, vec!["10.0.0.1 is online", "scanned"]);
        assert_eq!(
            *probe.calls.lock(),
            vec!["online 10.0.0.1".to_string(), format!("scan 10.0.0.1 1 65535 {DEFAULT_SCAN_REQUESTS}")]
        );
    }

    #[tokio::test]
    async fn port_with_too_many_params_is_usage() {
        let (ctx, probe) = ctx();
        let (flow, out) = run(&ctx, "/port 10.0.0.1 1 2 3 4").await;
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, vec![PORT_USAGE]);
        assert!(probe.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn res_time_uses_default_count() {
        let (ctx, probe) = ctx();
        let (_, out) = run(&ctx, "/res_time host 22").await;
        assert_eq!(out, vec!["host is online", "timed"]);
        assert_eq!(probe.calls.lock()[1], format!("time host 22 {DEFAULT_RESPONSE_REQUESTS}"));
    }

    #[tokio::test]
    async fn post_then_get() {
        let (ctx, _) = ctx();
        let (_, out) = run(&ctx, "/POST Bob 25").await;
        assert_eq!(out, vec!["HTTP/1.1 200 OK\n\nUser data updated\nid: user4"]);

        let (_, out) = run(&ctx, "/get user4").await;
        assert_eq!(
            out,
            vec![r#"HTTP/1.1 200 OK
Content-Type: application/json

{"name":"Bob","age":25}"#]
        );
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let (ctx, _) = ctx();
        let (_, out) = run(&ctx, "/get nobody").await;
        assert_eq!(out, vec!["HTTP/1.1 404 Not Found\n\nUser not found"]);
    }

    #[tokio::test]
    async fn bad_age_is_reported() {
        let (ctx, _) = ctx();
        let (flow, out) = run(&ctx, "/post Bob old").await;
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out.len(), 1);
        assert!(out[0].ends_with(POST_USAGE));
        assert_eq!(ctx.registry.len(), 3);
    }
}
