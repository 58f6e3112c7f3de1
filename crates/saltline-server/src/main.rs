//! Saltline server binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port
//! saltline-server
//!
//! # Listen on a specific address
//! saltline-server --bind 0.0.0.0:10001
//! ```

use clap::Parser;
use saltline_server::{Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Saltline protocol server
#[derive(Parser, Debug)]
#[command(name = "saltline-server")]
#[command(about = "Saltline encrypted datagram chat server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:10001")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Saltline server starting");

    let config = ServerConfig { bind_address: args.bind };
    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
