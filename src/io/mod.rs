//! Node surface: how the planner talks to the rest of the robot.
//!
//! Everything here speaks line-delimited JSON over TCP:
//! - `NbvService` answers planning requests, one request and one reply per line
//! - `TcpMapClient` fetches occupancy-map snapshots from the mapping server
//! - `CloudPublisher` streams the unknown-voxel cloud to connected viewers
//!
//! Wire shapes live in [`messages`].

pub mod messages;

mod map_client;
mod publisher;
mod service;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ArgusError;

pub use map_client::{MapSource, TcpMapClient};
pub use publisher::CloudPublisher;
pub use service::NbvService;

/// Network endpoints for the node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Address the planning service listens on.
    pub bind_address: String,
    /// Address of the external mapping server.
    pub map_server_address: String,
    /// Address the unknown-cloud publisher listens on; `None` disables it.
    pub cloud_publish_address: Option<String>,
    /// Timeout for one map-server round trip (milliseconds).
    pub map_timeout_ms: u64,
}

impl Default for IoConfig {
    fn default() -> Self {
        IoConfig {
            bind_address: "0.0.0.0:5557".to_string(),
            map_server_address: "127.0.0.1:5555".to_string(),
            cloud_publish_address: Some("0.0.0.0:5558".to_string()),
            map_timeout_ms: 5000,
        }
    }
}

impl IoConfig {
    /// Rejects endpoint settings the node cannot start with.
    pub fn validate(&self) -> Result<(), ArgusError> {
        if self.bind_address.is_empty() {
            return Err(ArgusError::Config(
                "bind_address must not be empty".to_string(),
            ));
        }
        if self.map_server_address.is_empty() {
            return Err(ArgusError::Config(
                "map_server_address must not be empty".to_string(),
            ));
        }
        if let Some(address) = &self.cloud_publish_address {
            if address.is_empty() {
                return Err(ArgusError::Config(
                    "cloud_publish_address must not be empty; omit it to disable publishing"
                        .to_string(),
                ));
            }
        }
        if self.map_timeout_ms == 0 {
            return Err(ArgusError::Config(
                "map_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The map round-trip timeout as a [`Duration`].
    pub fn map_timeout(&self) -> Duration {
        Duration::from_millis(self.map_timeout_ms)
    }
}
