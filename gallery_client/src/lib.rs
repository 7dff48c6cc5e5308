//! `gallery_client`
//!
//! Viewer client: peer sync, avatar registry, local player, and the
//! exhibit update pipeline.

pub mod avatars;
pub mod client;
pub mod player;

pub use client::GalleryClient;
