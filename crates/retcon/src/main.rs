use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use retcon::client::WsTransport;
use std::sync::Arc;
use tokio::time::{Instant, sleep_until};

#[derive(Debug, Parser)]
#[command(name = "retcon", about = "Load layered config and run a one-shot websocket handshake")]
struct Cli {
    /// Config base name: file stem and upper-cased environment prefix
    #[arg(default_value = retcon::DEFAULT_BASE_NAME)]
    base_name: String,
}

/// Entry point for the Retcon client.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    retcon::init_logging();

    let cli = Cli::parse();
    let bootstrap = retcon::bootstrap(&cli.base_name).context("failed to load configuration")?;
    info!("{}", bootstrap.target.path);

    let lifetime = bootstrap.lifetime();
    let now = Instant::now();
    let deadline = now.checked_add(lifetime).unwrap_or_else(|| {
        warn!("keep-alive overflows the clock (lifetime={:?})", lifetime);
        now + retcon::DEFAULT_LIFETIME
    });
    let completion = bootstrap.supervisor(Arc::new(WsTransport::new())).start();

    tokio::select! {
        report = completion.wait() => {
            info!(
                "connection attempt finished (url={}, state={:?}, events={})",
                report.url,
                report.state,
                report.events.len()
            );
        }
        _ = sleep_until(deadline) => {
            warn!("keep-alive elapsed before the connection attempt finished");
        }
    }

    sleep_until(deadline).await;
    info!("keep-alive elapsed (lifetime={:?})", lifetime);
    Ok(())
}
