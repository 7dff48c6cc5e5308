//! `gallery_server`
//!
//! Session coordinator: relays peer state between connected viewers.

pub mod server;

pub use server::RelayServer;
