use clap::Parser;
use netprobe_server::{Listener, Registry, TcpProbe, config::Config};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = Config::parse();

    let registry = Arc::new(if cfg.seed_demo_users {
        Registry::with_demo_users()
    } else {
        Registry::new()
    });
    let probe = Arc::new(TcpProbe::new(cfg.probe_timeout()));

    let listener = Listener::bind(&cfg.addr(), registry, probe).await?;
    tracing::info!(addr=%listener.local_addr(), "Server started");

    let mut server = tokio::spawn(listener.clone().run());

    let finished = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!(error=%e, "cannot listen for ctrl-c");
            }
            None
        }
        res = &mut server => Some(res),
    };

    let res = match finished {
        Some(res) => res,
        None => {
            listener.shutdown_all();
            server.await
        }
    };

    match res {
        Ok(res) => res?,
        Err(e) => tracing::error!(error=%e, "server task failed"),
    }

    tracing::info!("Server shut down");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, prelude::*};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,netprobe_server=debug"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
