use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wayland_window_from_scratch::{Client, config::Args, transport::Connection};

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let config = args.surface_config()?;
    let endpoint = args.endpoint()?;
    let conn = Connection::connect(&endpoint)
        .with_context(|| format!("failed to connect to {}", endpoint.display()))?;

    info!(
        endpoint = %endpoint.display(),
        width = config.width,
        height = config.height,
        "starting"
    );

    let mut client = Client::new(conn, config, args.paint.painter());
    if let Err(err) = client.run() {
        error!(%err, phase = %client.phase(), "session failed");
        return Err(err.into());
    }

    info!("window closed");
    Ok(())
}
