//! Configuration system.
//!
//! Loads gallery configuration from JSON strings/files (file IO left to app).

use serde::{Deserialize, Serialize};

/// Room dimensions as configured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 30.0,
            depth: 30.0,
        }
    }
}

/// Root configuration shared by client/server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Coordinator listen address, e.g. `127.0.0.1:8000`.
    pub server_addr: String,
    /// Outbound position broadcast period in milliseconds, independent
    /// of render cadence.
    #[serde(default = "default_broadcast_ms")]
    pub broadcast_ms: u64,
    #[serde(default)]
    pub room: RoomConfig,
    /// Path to the catalog CSV.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    /// Base URL/path for local catalog images.
    #[serde(default = "default_assets_base")]
    pub assets_base: String,
    /// Viewer display name (client only).
    #[serde(default = "default_viewer_name")]
    pub viewer_name: String,
}

fn default_broadcast_ms() -> u64 {
    50
}

fn default_catalog_path() -> String {
    "assets/test.csv".to_string()
}

fn default_assets_base() -> String {
    "./assets/GoghDB".to_string()
}

fn default_viewer_name() -> String {
    "Viewer".to_string()
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8000".to_string(),
            broadcast_ms: default_broadcast_ms(),
            room: RoomConfig::default(),
            catalog_path: default_catalog_path(),
            assets_base: default_assets_base(),
            viewer_name: default_viewer_name(),
        }
    }
}

impl GalleryConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
