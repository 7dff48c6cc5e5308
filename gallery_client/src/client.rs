//! Client implementation.
//!
//! The client maintains:
//! - One reliable connection to the session coordinator
//! - The room, catalog, and current exhibit list
//! - The scene graph, texture store, and frame pool
//! - Peer avatars updated from inbound state messages
//!
//! Everything lives on this struct; components receive references, and
//! no module-level state exists. Layout and reconciliation are pure and
//! synchronous; the only suspension points are the socket.

use std::time::Duration;

use anyhow::Context;
use gallery_shared::{
    catalog::Catalog,
    config::GalleryConfig,
    exhibit::{normalize_payload, ExhibitItem},
    frames::FramePool,
    layout::{compute_layout, LayoutOptions},
    math::Vec3,
    net::{GalleryMsg, PeerId, PeerUpdate, ReliableConn, PROTOCOL_VERSION},
    room::Room,
    scene::Scene,
    textures::TextureStore,
};
use serde_json::Value;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::avatars::AvatarRegistry;

/// Peer link state. Sends are silently dropped unless `Open`; a fresher
/// position goes out on the next tick anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    /// Terminal: no reconnection is attempted.
    Closed,
}

/// High-level gallery client.
pub struct GalleryClient {
    pub peer_id: PeerId,
    pub state: LinkState,

    conn: ReliableConn,

    pub room: Room,
    pub layout: LayoutOptions,
    pub catalog: Catalog,
    assets_base: String,

    pub scene: Scene,
    pub textures: TextureStore,
    pub pool: FramePool,
    pub avatars: AvatarRegistry,

    /// Most recently displayed exhibit list.
    items: Vec<ExhibitItem>,

    /// Curator messages to display.
    pub chat_messages: Vec<String>,
}

impl GalleryClient {
    /// Connects to the coordinator and performs the handshake.
    pub async fn connect(cfg: &GalleryConfig, catalog: Catalog) -> anyhow::Result<Self> {
        let room = Room::new(cfg.room.width, cfg.room.height, cfg.room.depth)?;

        info!(server = %cfg.server_addr, "Connecting to coordinator");

        let stream = TcpStream::connect(&cfg.server_addr)
            .await
            .context("tcp connect")?;
        let mut conn = ReliableConn::new(stream);

        conn.send(&GalleryMsg::Hello {
            protocol: PROTOCOL_VERSION,
        })
        .await?;

        let welcome = conn.recv().await?;
        let peer_id = match welcome {
            GalleryMsg::Welcome { peer_id } => peer_id,
            other => anyhow::bail!("expected Welcome, got {other:?}"),
        };

        info!(peer_id = ?peer_id, "Connected to coordinator");

        Ok(Self {
            peer_id,
            state: LinkState::Open,
            conn,
            room,
            layout: LayoutOptions::default(),
            catalog,
            assets_base: cfg.assets_base.clone(),
            scene: Scene::default(),
            textures: TextureStore::default(),
            pool: FramePool::default(),
            avatars: AvatarRegistry::default(),
            items: Vec::new(),
            chat_messages: Vec::new(),
        })
    }

    /// Number of items currently displayed.
    pub fn displayed_count(&self) -> usize {
        self.items.len()
    }

    /// Ingests one curation payload and updates the room.
    ///
    /// An empty post-filter works list is "no update": the previous
    /// exhibits stay on the walls rather than blanking the room on a bad
    /// response. Returns the number of items now displayed.
    pub fn apply_payload(&mut self, value: &Value) -> usize {
        let payload = normalize_payload(value);

        if let Some(comment) = &payload.curator_comment {
            self.chat_messages.push(comment.clone());
        } else if let Some(err) = &payload.error {
            self.chat_messages.push(format!("error: {err}"));
        } else if let Some(text) = &payload.text {
            self.chat_messages.push(text.clone());
        }

        if payload.works.is_empty() {
            debug!("Payload carried no works; keeping current exhibits");
            return self.items.len();
        }

        let works = self.catalog.enrich(payload.works, &self.assets_base);
        self.show_items(works)
    }

    /// Replaces the displayed exhibit list directly (initial seeding,
    /// tests). One layout pass plus one reconciliation.
    pub fn show_items(&mut self, items: Vec<ExhibitItem>) -> usize {
        let placements = compute_layout(items.len(), &self.room, &self.layout);
        if placements.iter().any(Option::is_none) {
            warn!(
                items = items.len(),
                "Degraded layout: some items have no placement"
            );
        }
        self.pool
            .reconcile(&mut self.scene, &mut self.textures, &items, &placements);
        self.items = items;
        info!(count = self.items.len(), "Exhibits updated");
        self.items.len()
    }

    /// Sends the local viewer position. Skipped silently unless the link
    /// is `Open`; a send failure closes the link.
    pub async fn broadcast_position(&mut self, position: Vec3) -> anyhow::Result<()> {
        if self.state != LinkState::Open {
            return Ok(());
        }
        let msg = GalleryMsg::PeerState(PeerUpdate {
            peer_id: self.peer_id,
            position,
        });
        if let Err(e) = self.conn.send(&msg).await {
            warn!(error = %e, "Coordinator link lost on send");
            self.state = LinkState::Closed;
        }
        Ok(())
    }

    /// Drains inbound peer state, applying each update to the avatar
    /// registry. Waits up to `timeout` for the first message, then keeps
    /// consuming whatever is already buffered.
    pub async fn poll_peers(&mut self, timeout: Duration) -> anyhow::Result<()> {
        let mut wait = timeout;
        while self.state == LinkState::Open {
            match self.conn.recv_timeout(wait).await {
                Ok(Some(GalleryMsg::PeerState(update))) => {
                    self.avatars.apply(&mut self.scene, &update);
                }
                Ok(Some(GalleryMsg::Disconnect { reason })) => {
                    info!(reason = %reason, "Coordinator closed the session");
                    self.state = LinkState::Closed;
                }
                Ok(Some(other)) => {
                    debug!(?other, "Unhandled message");
                }
                Ok(None) => break, // Timeout, nothing buffered.
                Err(e) => {
                    warn!(error = %e, "Coordinator link lost on recv");
                    self.state = LinkState::Closed;
                }
            }
            wait = Duration::ZERO;
        }
        Ok(())
    }

    /// Executes a console command.
    pub fn exec_console(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };
        if cmd.is_empty() {
            return Ok(Vec::new());
        }

        match cmd {
            "exhibit" => {
                if rest.is_empty() {
                    return Ok(vec!["Usage: exhibit <payload-json>".to_string()]);
                }
                match serde_json::from_str::<Value>(rest) {
                    Ok(value) => {
                        let n = self.apply_payload(&value);
                        Ok(vec![format!("Displaying {n} exhibits")])
                    }
                    Err(e) => Ok(vec![format!("Invalid payload json: {e}")]),
                }
            }
            "status" => {
                let mut out = Vec::new();
                out.push(format!("Link: {:?}", self.state));
                out.push(format!("Peer ID: {:?}", self.peer_id));
                out.push(format!(
                    "Room: {}x{}x{}",
                    self.room.width, self.room.height, self.room.depth
                ));
                out.push(format!("Exhibits: {}", self.items.len()));
                out.push(format!("Frames: {}", self.pool.len()));
                out.push(format!("Peers seen: {}", self.avatars.len()));
                out.push(format!("Catalog entries: {}", self.catalog.len()));
                Ok(out)
            }
            "quit" | "exit" => {
                std::process::exit(0);
            }
            _ => Ok(vec![format!("Unknown command: {cmd}")]),
        }
    }
}
