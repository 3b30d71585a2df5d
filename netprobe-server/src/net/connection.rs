use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::TcpStream;

use crate::banner::{HELP, WELCOME, greeting};
use crate::commands::{CmdCtx, Flow, process_command};
use crate::error::ConnectionError;
use crate::hardening::MAX_LINE_BYTES;
use crate::net::sink::ClientSink;
use crate::net::sink::line::LineSink;
use crate::probe::Probe;
use crate::state::registry::Registry;
use crate::state::session::{ConnState, HandshakeStep, Session};

/// Drives one client from welcome to teardown. Teardown runs on every exit
/// path, including a listener-initiated shutdown that interrupts a read.
pub async fn handle_connection(
    stream: TcpStream,
    sess: Arc<Session>,
    registry: Arc<Registry>,
    probe: Arc<dyn Probe>,
) -> Result<(), ConnectionError> {
    let (r, w) = stream.into_split();
    let mut reader = BufReader::new(r);
    let mut sink = LineSink::new(w);

    let ctx = Arc::new(CmdCtx {
        registry: registry.clone(),
        probe,
        sess: sess.clone(),
    });

    let result = tokio::select! {
        res = run_session(&mut reader, &mut sink, ctx) => res,
        _ = sess.closed() => Ok(()),
    };

    sess.teardown(&registry);
    sink.close().await;
    result
}

async fn run_session<R>(
    reader: &mut R,
    out: &mut dyn ClientSink,
    ctx: Arc<CmdCtx>,
) -> Result<(), ConnectionError>
where
    R: AsyncBufRead + Unpin + Send,
{
    let peer = ctx.sess.peer;

    out.send_line(WELCOME).await?;
    let mut state = ConnState::AwaitingName;

    // Unbounded: a client that never sends a valid age holds its task forever.
    let record = loop {
        let line = read_line(reader, peer).await?;
        match state.feed(&line) {
            HandshakeStep::Prompt(prompt) => out.send_line(prompt).await?,
            HandshakeStep::Complete(record) => break record,
        }
    };

    let id = ctx.registry.insert(record.name.clone(), record.age);
    if !ctx.sess.register(id.clone(), &ctx.registry) {
        return Ok(());
    }
    tracing::info!(%peer, %id, name=%record.name, "{} connected!", record.name);

    out.send_line(&greeting(&record.name)).await?;
    out.send_line(HELP).await?;

    loop {
        let line = read_line(reader, peer).await?;
        tracing::debug!(%peer, raw=%line, "received line");

        if process_command(&line, ctx.clone(), out).await? == Flow::Exit {
            return Ok(());
        }
    }
}

/// Reads one trimmed line. End of stream and oversized lines end the session.
async fn read_line<R>(reader: &mut R, peer: SocketAddr) -> Result<String, ConnectionError>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = String::new();
    let n = (&mut *reader).take(MAX_LINE_BYTES as u64).read_line(&mut line).await?;
    if n == 0 {
        return Err(ConnectionError::Closed(peer));
    }
    if n >= MAX_LINE_BYTES && !line.ends_with('\n') {
        return Err(ConnectionError::LineTooLong { limit: MAX_LINE_BYTES });
    }
    Ok(line.trim().to_string())
}
