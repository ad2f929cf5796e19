// src/io/publisher.rs

// Broadcast publisher for the unknown-voxel cloud. Subscribers connect over
// plain TCP and receive one JSON line per published cloud; a subscriber that
// stops reading is dropped at the next publish instead of stalling the node.

use log::{error, info, warn};
use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::messages::CloudMsg;
use crate::ArgusError;

// A subscriber that cannot take a cloud line for this long is dropped;
// publish() must never block indefinitely on one peer.
const SUBSCRIBER_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Streams point clouds to every connected subscriber.
#[derive(Clone)]
pub struct CloudPublisher {
    clients: Arc<Mutex<Vec<TcpStream>>>,
    address: SocketAddr,
}

impl CloudPublisher {
    /// Binds the publisher and starts accepting subscribers.
    ///
    /// Accepting runs on its own thread for the life of the process, so
    /// subscribers can come and go while the service is busy planning.
    pub fn bind(address: &str) -> Result<Self, ArgusError> {
        let listener = TcpListener::bind(address).map_err(|e| {
            ArgusError::Transport(format!("cannot bind cloud publisher on {}: {}", address, e))
        })?;
        let local = listener.local_addr()?;

        let clients: Arc<Mutex<Vec<TcpStream>>> = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::clone(&clients);
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        if let Err(e) = stream.set_write_timeout(Some(SUBSCRIBER_WRITE_TIMEOUT)) {
                            warn!("rejecting cloud subscriber: {}", e);
                            continue;
                        }
                        match stream.peer_addr() {
                            Ok(peer) => info!("cloud subscriber connected from {}", peer),
                            Err(_) => info!("cloud subscriber connected"),
                        }
                        let mut clients = accepted
                            .lock()
                            .unwrap_or_else(|poisoned| poisoned.into_inner());
                        clients.push(stream);
                    }
                    Err(e) => warn!("failed to accept cloud subscriber: {}", e),
                }
            }
        });

        info!("cloud publisher listening on {}", local);
        Ok(CloudPublisher {
            clients,
            address: local,
        })
    }

    /// The address the publisher actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Number of currently connected subscribers.
    pub fn client_count(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Writes one cloud line to every live subscriber.
    ///
    /// Subscribers whose writes fail or time out are dropped. Returns the
    /// number of subscribers that took the cloud.
    pub fn publish(&self, cloud: &CloudMsg) -> usize {
        let mut line = match serde_json::to_string(cloud) {
            Ok(line) => line,
            Err(e) => {
                error!("cannot encode cloud of {} points: {}", cloud.points.len(), e);
                return 0;
            }
        };
        line.push('\n');

        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        clients.retain_mut(|stream| stream.write_all(line.as_bytes()).is_ok());
        clients.len()
    }
}
