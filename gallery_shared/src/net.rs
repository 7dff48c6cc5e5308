//! Networking primitives.
//!
//! One persistent reliable (TCP) connection per viewer carries the whole
//! session: a versioned handshake, then periodic peer state both ways.
//! Frames are length-prefixed JSON, explicit and versionable, sized for
//! tens of messages per second rather than bulk transfer.

use anyhow::Context;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    sync::atomic::{AtomicU32, Ordering},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener, TcpStream,
    },
    time,
};

use crate::math::Vec3;

/// Protocol version for compatibility checks.
pub const PROTOCOL_VERSION: u32 = 1;

static NEXT_PEER_ID: AtomicU32 = AtomicU32::new(1);

/// Identifies a connected viewer within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub u32);

impl PeerId {
    pub fn new_unique() -> Self {
        PeerId(NEXT_PEER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One peer's replicated state: a position snapshot, no deltas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PeerUpdate {
    pub peer_id: PeerId,
    pub position: Vec3,
}

/// High-level message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum GalleryMsg {
    /// Client -> server on connect.
    Hello { protocol: u32 },
    /// Server -> client: assigns the session peer id.
    Welcome { peer_id: PeerId },
    /// Both directions. Client sends its own state; the relay forwards
    /// it to every other peer with the sender's authoritative id.
    PeerState(PeerUpdate),
    /// Either direction, best effort.
    Disconnect { reason: String },
}

/// Reliable connection with length-prefixed frames.
#[derive(Debug)]
pub struct ReliableConn {
    stream: TcpStream,
}

impl ReliableConn {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub async fn send(&mut self, msg: &GalleryMsg) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(msg).context("serialize msg")?;
        let mut buf = BytesMut::with_capacity(4 + payload.len());
        buf.put_u32(payload.len() as u32);
        buf.extend_from_slice(&payload);
        self.stream.write_all(&buf).await.context("tcp write")?;
        Ok(())
    }

    pub async fn recv(&mut self) -> anyhow::Result<GalleryMsg> {
        let mut len_buf = [0u8; 4];
        self.stream
            .read_exact(&mut len_buf)
            .await
            .context("tcp read len")?;
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut payload = vec![0u8; len];
        self.stream
            .read_exact(&mut payload)
            .await
            .context("tcp read payload")?;
        let msg = serde_json::from_slice(&payload).context("deserialize msg")?;
        Ok(msg)
    }

    /// Receives a message within the given timeout; `None` on timeout.
    pub async fn recv_timeout(
        &mut self,
        timeout: std::time::Duration,
    ) -> anyhow::Result<Option<GalleryMsg>> {
        match time::timeout(timeout, self.recv()).await {
            Ok(Ok(msg)) => Ok(Some(msg)),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    /// Splits into independently owned read/write halves so the relay
    /// can read in one task and fan out writes from another.
    pub fn into_split(self) -> (ConnReader, ConnWriter) {
        let (r, w) = self.stream.into_split();
        (ConnReader { read: r }, ConnWriter { write: w })
    }
}

/// Read half of a split connection.
#[derive(Debug)]
pub struct ConnReader {
    read: OwnedReadHalf,
}

impl ConnReader {
    pub async fn recv(&mut self) -> anyhow::Result<GalleryMsg> {
        let mut len_buf = [0u8; 4];
        self.read
            .read_exact(&mut len_buf)
            .await
            .context("tcp read len")?;
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut payload = vec![0u8; len];
        self.read
            .read_exact(&mut payload)
            .await
            .context("tcp read payload")?;
        serde_json::from_slice(&payload).context("deserialize msg")
    }
}

/// Write half of a split connection.
#[derive(Debug)]
pub struct ConnWriter {
    write: OwnedWriteHalf,
}

impl ConnWriter {
    pub async fn send(&mut self, msg: &GalleryMsg) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(msg).context("serialize msg")?;
        let mut buf = BytesMut::with_capacity(4 + payload.len());
        buf.put_u32(payload.len() as u32);
        buf.extend_from_slice(&payload);
        self.write.write_all(&buf).await.context("tcp write")?;
        Ok(())
    }
}

/// TCP server listener.
pub struct ReliableListener {
    listener: TcpListener,
}

impl ReliableListener {
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await.context("tcp bind")?;
        Ok(Self { listener })
    }

    pub async fn accept(&self) -> anyhow::Result<(ReliableConn, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await.context("tcp accept")?;
        Ok((ReliableConn::new(stream), addr))
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

/// Convenience codec helpers.
pub fn encode_to_bytes(msg: &GalleryMsg) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(msg).context("serialize")?;
    Ok(Bytes::from(payload))
}

pub fn decode_from_bytes(b: &[u8]) -> anyhow::Result<GalleryMsg> {
    serde_json::from_slice(b).context("deserialize")
}
