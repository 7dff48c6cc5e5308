//! Session coordinator.
//!
//! The coordinator is a relay, not an authority: each inbound peer state
//! message is forwarded to every other connected viewer with the
//! sender's session id attached. It keeps no scene and no history; a
//! late joiner simply starts hearing fresh snapshots.
//!
//! Peers that drop are removed from the roster silently; the wire
//! contract has no departure message, so clients keep their last-seen
//! avatars.

use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::Context;
use gallery_shared::{
    config::GalleryConfig,
    net::{ConnReader, ConnWriter, GalleryMsg, PeerId, PeerUpdate, ReliableConn, ReliableListener, PROTOCOL_VERSION},
};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Inbound traffic funneled from per-peer reader tasks.
enum Inbound {
    State(PeerId, PeerUpdate),
    Closed(PeerId),
}

/// Relay server for one gallery session.
pub struct RelayServer {
    pub cfg: GalleryConfig,

    listener: ReliableListener,
    peers: HashMap<PeerId, ConnWriter>,

    inbound_tx: mpsc::Sender<Inbound>,
    inbound_rx: mpsc::Receiver<Inbound>,

    /// Channel for console commands from stdin.
    console_rx: Option<mpsc::Receiver<String>>,
}

impl RelayServer {
    /// Binds the coordinator with the given config.
    pub async fn new(cfg: GalleryConfig) -> anyhow::Result<Self> {
        let addr: SocketAddr = cfg.server_addr.parse().context("parse server_addr")?;
        let listener = ReliableListener::bind(addr).await?;
        let (inbound_tx, inbound_rx) = mpsc::channel(1024);

        Ok(Self {
            cfg,
            listener,
            peers: HashMap::new(),
            inbound_tx,
            inbound_rx,
            console_rx: None,
        })
    }

    /// Sets the console input receiver.
    pub fn set_console_input(&mut self, rx: mpsc::Receiver<String>) {
        self.console_rx = Some(rx);
    }

    /// Returns the local address (after binding).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Accepts one viewer with timeout (non-blocking).
    pub async fn try_accept(&mut self, timeout: Duration) -> anyhow::Result<Option<PeerId>> {
        match tokio::time::timeout(timeout, self.listener.accept()).await {
            Ok(Ok((conn, peer))) => self.handle_new_connection(conn, peer).await.map(Some),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None), // Timeout
        }
    }

    async fn handle_new_connection(
        &mut self,
        mut conn: ReliableConn,
        peer: SocketAddr,
    ) -> anyhow::Result<PeerId> {
        let msg = conn.recv().await?;
        match msg {
            GalleryMsg::Hello { protocol } if protocol == PROTOCOL_VERSION => {
                let id = PeerId::new_unique();
                conn.send(&GalleryMsg::Welcome { peer_id: id }).await?;

                let (reader, writer) = conn.into_split();
                self.peers.insert(id, writer);
                tokio::spawn(read_loop(id, reader, self.inbound_tx.clone()));

                info!(peer_id = ?id, %peer, "Viewer connected");
                Ok(id)
            }
            other => anyhow::bail!("unexpected handshake msg: {other:?}"),
        }
    }

    /// Executes one coordinator step: console, then inbound fan-out.
    pub async fn step(&mut self) -> anyhow::Result<()> {
        self.process_console_commands()?;

        while let Ok(event) = self.inbound_rx.try_recv() {
            match event {
                Inbound::State(from, update) => {
                    self.fan_out(from, update.position).await;
                }
                Inbound::Closed(id) => {
                    if self.peers.remove(&id).is_some() {
                        info!(peer_id = ?id, "Viewer disconnected");
                    }
                }
            }
        }
        Ok(())
    }

    /// Forwards a position snapshot to every peer except the sender,
    /// with the sender's authoritative id attached. Peers whose link
    /// fails mid-write are dropped from the roster.
    async fn fan_out(&mut self, from: PeerId, position: gallery_shared::math::Vec3) {
        let msg = GalleryMsg::PeerState(PeerUpdate {
            peer_id: from,
            position,
        });

        let mut dead = Vec::new();
        for (&id, writer) in self.peers.iter_mut() {
            if id == from {
                continue;
            }
            if let Err(e) = writer.send(&msg).await {
                debug!(peer_id = ?id, error = %e, "Dropping unreachable viewer");
                dead.push(id);
            }
        }
        for id in dead {
            self.peers.remove(&id);
        }
    }

    fn process_console_commands(&mut self) -> anyhow::Result<()> {
        // Collect lines first to avoid borrow conflict
        let lines: Vec<String> = if let Some(ref mut rx) = self.console_rx {
            let mut collected = Vec::new();
            while let Ok(line) = rx.try_recv() {
                collected.push(line);
            }
            collected
        } else {
            Vec::new()
        };

        for line in lines {
            for out in self.exec_console(&line)? {
                println!("{out}");
            }
        }
        Ok(())
    }

    /// Executes a console command.
    pub fn exec_console(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        match tokens[0] {
            "status" => {
                let mut out = Vec::new();
                out.push(format!("Listening: {}", self.cfg.server_addr));
                out.push(format!("Viewers: {}", self.peers.len()));
                for id in self.peers.keys() {
                    out.push(format!("  {id:?}"));
                }
                Ok(out)
            }
            "quit" | "exit" => {
                info!("Coordinator shutting down");
                std::process::exit(0);
            }
            other => Ok(vec![format!("Unknown command: {other}")]),
        }
    }

    /// Runs the coordinator for a number of maintenance ticks.
    pub async fn run_for_ticks(&mut self, ticks: u32) -> anyhow::Result<()> {
        for _ in 0..ticks {
            self.try_accept(Duration::from_millis(1)).await?;
            self.step().await?;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(())
    }
}

/// Per-peer reader: forwards state inbound, reports closure once the
/// connection dies or says goodbye.
async fn read_loop(id: PeerId, mut reader: ConnReader, tx: mpsc::Sender<Inbound>) {
    loop {
        match reader.recv().await {
            Ok(GalleryMsg::PeerState(update)) => {
                if tx.send(Inbound::State(id, update)).await.is_err() {
                    return;
                }
            }
            Ok(GalleryMsg::Disconnect { reason }) => {
                debug!(peer_id = ?id, reason = %reason, "Viewer said goodbye");
                let _ = tx.send(Inbound::Closed(id)).await;
                return;
            }
            Ok(other) => {
                debug!(peer_id = ?id, ?other, "Unexpected message");
            }
            Err(e) => {
                debug!(peer_id = ?id, error = %e, "Viewer link closed");
                let _ = tx.send(Inbound::Closed(id)).await;
                return;
            }
        }
    }
}

/// Helper for tests: bind to an ephemeral port.
pub async fn bind_ephemeral() -> anyhow::Result<(RelayServer, GalleryConfig)> {
    let cfg = GalleryConfig {
        server_addr: format!("{}:{}", IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        ..Default::default()
    };

    let mut server = RelayServer::new(cfg).await?;
    let addr = server.local_addr()?;
    server.cfg.server_addr = addr.to_string();
    let cfg = server.cfg.clone();

    Ok((server, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_wrong_protocol() -> anyhow::Result<()> {
        let (mut server, cfg) = bind_ephemeral().await?;

        let handle = tokio::spawn(async move {
            let stream = tokio::net::TcpStream::connect(cfg.server_addr).await?;
            let mut conn = ReliableConn::new(stream);
            conn.send(&GalleryMsg::Hello { protocol: 999 }).await?;
            Ok::<_, anyhow::Error>(())
        });

        let res = server.try_accept(Duration::from_millis(500)).await;
        assert!(res.is_err());
        assert_eq!(server.peer_count(), 0);
        handle.await??;
        Ok(())
    }

    #[tokio::test]
    async fn unknown_console_command_reports() -> anyhow::Result<()> {
        let (mut server, _cfg) = bind_ephemeral().await?;
        let out = server.exec_console("frobnicate")?;
        assert_eq!(out, vec!["Unknown command: frobnicate".to_string()]);
        Ok(())
    }
}
