//! Saltline chat client binary.
//!
//! # Usage
//!
//! ```bash
//! saltline-client --username alice --address 127.0.0.1:10001
//! ```
//!
//! Lines read from stdin are sent as encrypted chat messages; `quit` or
//! `exit` terminates. Decrypted broadcasts from other peers are printed to
//! stdout.

// Chat output is this binary's purpose.
#![allow(clippy::print_stdout)]

use clap::Parser;
use saltline_client::ConnectedClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Saltline encrypted chat client
#[derive(Parser, Debug)]
#[command(name = "saltline-client")]
#[command(about = "Saltline encrypted datagram chat client")]
#[command(version)]
struct Args {
    /// Address of the server we are connecting to
    #[arg(short, long, default_value = "127.0.0.1:10001")]
    address: String,

    /// Name to show in chat
    #[arg(short, long)]
    username: String,

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

    let (client, mut incoming) = ConnectedClient::connect(&args.username, &args.address).await?;

    tracing::info!("Connected to {} as {}", args.address, args.username);

    tokio::spawn(async move {
        while let Some(line) = incoming.recv().await {
            println!("{line}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message == "quit" || message == "exit" {
            tracing::info!("exiting...");
            break;
        }
        if let Err(err) = client.send_chat(message).await {
            tracing::error!("error sending: {err}");
        }
    }

    client.stop();
    Ok(())
}
