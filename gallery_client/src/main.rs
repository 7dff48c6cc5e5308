//! Standalone viewer binary.
//!
//! Usage:
//!   cargo run -p gallery_client -- [--addr 127.0.0.1:8000] [--catalog assets/test.csv]
//!
//! The client connects to the coordinator, seeds an initial exhibit,
//! broadcasts the local position on a fixed period, and applies inbound
//! peer state to avatars.
//!
//! Console commands:
//!   exhibit <json>  - Apply a curation payload
//!   status          - Show client status
//!   quit            - Exit client

use std::env;
use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::Context;
use gallery_client::client::{GalleryClient, LinkState};
use gallery_client::player::{LocalPlayer, MoveInput};
use gallery_shared::catalog::Catalog;
use gallery_shared::config::GalleryConfig;
use gallery_shared::physics::{Locomotion, RoomWalk};
use gallery_shared::room::Room;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, warn};

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
            "--catalog" if i + 1 < args.len() => {
                cfg.catalog_path = args[i + 1].clone();
                i += 2;
            }
            "--assets" if i + 1 < args.len() => {
                cfg.assets_base = args[i + 1].clone();
                i += 2;
            }
            "--name" if i + 1 < args.len() => {
                cfg.viewer_name = args[i + 1].clone();
                i += 2;
            }
            _ => i += 1,
        }
    }
    cfg
}

fn load_catalog(path: &str) -> Catalog {
    match std::fs::read_to_string(path) {
        Ok(text) => match Catalog::from_csv(&text) {
            Ok(cat) => {
                info!(entries = cat.len(), path, "Catalog loaded");
                cat
            }
            Err(e) => {
                warn!(error = %e, path, "Catalog parse failed; continuing without it");
                Catalog::empty()
            }
        },
        Err(e) => {
            warn!(error = %e, path, "Catalog read failed; continuing without it");
            Catalog::empty()
        }
    }
}

/// First exhibits shown before any curated payload arrives.
fn initial_payload() -> serde_json::Value {
    json!({
        "works": [
            { "id": "F458", "title": "Sunflowers",
              "reason": "Opening exhibit: the vivid yellows set the room's tone." },
            { "id": "F587", "title": "Wheat Field with Cypresses",
              "reason": "Opening exhibit: golden wheat against a restless sky." },
            { "id": "F422", "title": "The Sower",
              "reason": "Opening exhibit: dusk light and a striding figure." },
        ]
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args();
    info!(server = %cfg.server_addr, viewer = %cfg.viewer_name, "Starting client");

    let catalog = load_catalog(&cfg.catalog_path);
    let mut client = GalleryClient::connect(&cfg, catalog).await.context("connect")?;

    let shown = client.apply_payload(&initial_payload());
    info!(count = shown, "Initial exhibit seeded");

    // Set up console input channel.
    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);

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

    println!("Client connected. Type 'exhibit <json>' to update the room, 'status' for info, 'quit' to exit.");
    println!();

    let room = Room::new(cfg.room.width, cfg.room.height, cfg.room.depth)?;
    let mut walk = RoomWalk::new(room);
    let mut player = LocalPlayer::default();

    let tick_interval = Duration::from_millis(cfg.broadcast_ms);
    let mut next_tick = tokio::time::Instant::now();

    loop {
        // Process console commands.
        while let Ok(line) = console_rx.try_recv() {
            match client.exec_console(&line) {
                Ok(output) => {
                    for line in output {
                        println!("{}", line);
                    }
                }
                Err(e) => {
                    println!("Error: {}", e);
                }
            }
        }

        // Surface curator messages.
        for msg in client.chat_messages.drain(..) {
            println!("curator: {msg}");
        }

        // Movement input would come from the windowing layer; headless
        // runs stand still.
        player.apply_input(MoveInput::default());
        walk.step(&mut player.body, tick_interval.as_secs_f32());

        client.broadcast_position(player.broadcast_position()).await?;
        client.poll_peers(Duration::from_millis(10)).await?;

        if client.state == LinkState::Closed {
            println!("Disconnected from coordinator.");
            break;
        }

        next_tick += tick_interval;
        tokio::time::sleep_until(next_tick).await;
    }

    Ok(())
}
