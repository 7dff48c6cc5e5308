//! Standalone coordinator binary.
//!
//! Usage:
//!   cargo run -p gallery_server -- [--addr 127.0.0.1:8000]
//!
//! The coordinator accepts viewer connections and relays each peer's
//! position snapshots to every other connected viewer.
//!
//! Console commands:
//!   status  - Show connected viewers
//!   quit    - Shutdown coordinator

use std::env;
use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::Context;
use gallery_server::server::RelayServer;
use gallery_shared::config::GalleryConfig;
use tokio::sync::mpsc;
use tracing::info;

fn parse_args() -> GalleryConfig {
    let mut cfg = GalleryConfig::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                cfg.server_addr = args[i + 1].clone();
                i += 2;
            }
            _ => i += 1,
        }
    }
    cfg
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args();
    info!(addr = %cfg.server_addr, "Starting coordinator");

    let mut server = RelayServer::new(cfg).await.context("create server")?;
    let local = server.local_addr()?;
    info!(%local, "Coordinator listening");

    // Set up console input channel.
    let (console_tx, console_rx) = mpsc::channel::<String>(32);
    server.set_console_input(console_rx);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            if stdin.lock().read_line(&mut line).is_err() {
                break;
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!("Coordinator ready. Type 'status' for info, 'quit' to exit.");
    println!();

    // Main relay loop.
    let tick_interval = Duration::from_millis(5);
    let mut next_tick = tokio::time::Instant::now();

    loop {
        // Accept new viewers (non-blocking); a failed handshake only
        // loses that connection.
        if let Err(e) = server.try_accept(Duration::from_millis(1)).await {
            info!(error = %e, "Rejected connection");
        }

        server.step().await?;

        next_tick += tick_interval;
        tokio::time::sleep_until(next_tick).await;
    }
}
