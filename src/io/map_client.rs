// src/io/map_client.rs

// Where planning gets its map from. The solver itself never opens a socket;
// it consumes whatever a `MapSource` hands it, which keeps the service
// testable with a mocked source and keeps the TCP client swappable.

use log::debug;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::messages::GetMapRequest;
use super::IoConfig;
use crate::map::{MapSnapshot, OccupancyMap};
use crate::ArgusError;

/// Supplies the occupancy map a planning request runs against.
#[cfg_attr(test, mockall::automock)]
pub trait MapSource: Send + Sync {
    /// Fetches a fresh map. Called once per planning request.
    fn fetch_map(&self) -> Result<OccupancyMap, ArgusError>;
}

/// Fetches map snapshots from a mapping server over TCP.
///
/// The exchange is one [`GetMapRequest`] line out, one
/// [`MapSnapshot`](crate::map::MapSnapshot) line back, on a fresh
/// connection per fetch so a restarted server needs no special handling.
#[derive(Clone, Debug)]
pub struct TcpMapClient {
    address: String,
    timeout: Duration,
}

impl TcpMapClient {
    /// Builds a client for the given server address.
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        TcpMapClient {
            address: address.into(),
            timeout,
        }
    }

    /// Builds a client from the node's io configuration.
    pub fn from_config(config: &IoConfig) -> Self {
        TcpMapClient::new(&config.map_server_address, config.map_timeout())
    }

    /// The server address this client talks to.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl MapSource for TcpMapClient {
    fn fetch_map(&self) -> Result<OccupancyMap, ArgusError> {
        let addr = self
            .address
            .to_socket_addrs()
            .map_err(|e| {
                ArgusError::Transport(format!(
                    "cannot resolve map server address {}: {}",
                    self.address, e
                ))
            })?
            .next()
            .ok_or_else(|| {
                ArgusError::Transport(format!(
                    "map server address {} resolves to nothing",
                    self.address
                ))
            })?;

        let stream = TcpStream::connect_timeout(&addr, self.timeout).map_err(|e| {
            ArgusError::Transport(format!("cannot reach map server {}: {}", self.address, e))
        })?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        let mut request = serde_json::to_string(&GetMapRequest::default())?;
        request.push('\n');
        (&stream).write_all(request.as_bytes())?;

        let mut line = String::new();
        BufReader::new(&stream).read_line(&mut line).map_err(|e| {
            ArgusError::Transport(format!("no reply from map server {}: {}", self.address, e))
        })?;
        if line.trim().is_empty() {
            return Err(ArgusError::Transport(format!(
                "map server {} closed without a reply",
                self.address
            )));
        }

        let snapshot: MapSnapshot = serde_json::from_str(line.trim())?;
        let map = OccupancyMap::from_snapshot(snapshot)?;
        debug!(
            "fetched map from {}: {} voxels at {} m resolution",
            self.address,
            map.known_voxels(),
            map.resolution()
        );
        Ok(map)
    }
}
