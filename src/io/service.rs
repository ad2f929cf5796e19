// src/io/service.rs

// The planning service endpoint. Connections are persistent: each client
// sends one JSON request per line and reads one JSON reply per line, as many
// times as it likes. A malformed line earns an error reply, not a hangup,
// so a misbehaving client cannot wedge its own session.

use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use super::map_client::MapSource;
use super::messages::{CloudMsg, ErrorMsg, GetNbvRequest, GetNbvResponse, NbvReply};
use super::publisher::CloudPublisher;
use crate::map::BoundingBox;
use crate::solver::NbvSolver;
use crate::ArgusError;

/// Everything one request needs: the solver, the map source, and the
/// optional cloud publisher. Shared across connection threads.
struct NbvHandler {
    solver: NbvSolver,
    map_source: Box<dyn MapSource>,
    publisher: Option<CloudPublisher>,
}

impl NbvHandler {
    /// Runs one planning request end to end.
    fn handle(&self, request: GetNbvRequest) -> Result<GetNbvResponse, ArgusError> {
        let map = self.map_source.fetch_map()?;
        let bounds = match request.bounds {
            Some(msg) => BoundingBox::from(msg),
            None => *self.solver.bounds(),
        };

        let solution = self.solver.solve_in(&map, &bounds)?;

        if let Some(publisher) = &self.publisher {
            let cloud = CloudMsg::now(&solution.unknown);
            let receivers = publisher.publish(&cloud);
            debug!(
                "published unknown cloud: {} points to {} subscriber(s)",
                cloud.points.len(),
                receivers
            );
        }

        Ok(GetNbvResponse::from(&solution))
    }
}

/// Serves next-best-view planning over TCP, one thread per connection.
pub struct NbvService {
    listener: TcpListener,
    handler: Arc<NbvHandler>,
}

impl NbvService {
    /// Binds the service socket.
    ///
    /// Pass `None` for `publisher` to run without cloud publishing.
    pub fn bind(
        address: &str,
        solver: NbvSolver,
        map_source: Box<dyn MapSource>,
        publisher: Option<CloudPublisher>,
    ) -> Result<Self, ArgusError> {
        let listener = TcpListener::bind(address).map_err(|e| {
            ArgusError::Transport(format!("cannot bind planning service on {}: {}", address, e))
        })?;
        Ok(NbvService {
            listener,
            handler: Arc::new(NbvHandler {
                solver,
                map_source,
                publisher,
            }),
        })
    }

    /// The address the service actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, ArgusError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until the process exits.
    pub fn serve_forever(&self) -> Result<(), ArgusError> {
        info!("planning service listening on {}", self.local_addr()?);
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let handler = Arc::clone(&self.handler);
                    thread::spawn(move || serve_connection(handler, stream));
                }
                Err(e) => warn!("failed to accept planning client: {}", e),
            }
        }
        Ok(())
    }
}

/// Request/reply loop for one client connection.
fn serve_connection(handler: Arc<NbvHandler>, stream: TcpStream) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown peer".to_string());
    let reader = match stream.try_clone() {
        Ok(clone) => BufReader::new(clone),
        Err(e) => {
            warn!("cannot serve {}: {}", peer, e);
            return;
        }
    };
    let mut writer = stream;
    info!("planning client connected from {}", peer);

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("read error from {}: {}", peer, e);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<GetNbvRequest>(trimmed) {
            Ok(request) => match handler.handle(request) {
                Ok(response) => NbvReply::Ok(response),
                Err(e) => {
                    warn!("request from {} failed: {}", peer, e);
                    NbvReply::Err(ErrorMsg {
                        error: e.to_string(),
                    })
                }
            },
            Err(e) => {
                warn!("malformed request from {}: {}", peer, e);
                NbvReply::Err(ErrorMsg {
                    error: format!("malformed request: {}", e),
                })
            }
        };

        let mut encoded = match serde_json::to_string(&reply) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("cannot encode reply for {}: {}", peer, e);
                break;
            }
        };
        encoded.push('\n');
        if let Err(e) = writer.write_all(encoded.as_bytes()) {
            warn!("write error to {}: {}", peer, e);
            break;
        }
    }

    info!("planning client {} disconnected", peer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::map_client::MockMapSource;
    use crate::io::messages::BoundsMsg;
    use crate::map::OccupancyMap;
    use crate::{ArgusConfig, NbvSolver};
    use nalgebra::Point3;

    fn small_config() -> ArgusConfig {
        let mut config = ArgusConfig::default();
        config.bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.5, 0.5, 0.5));
        config.sensor.horizontal_rays = 5;
        config.sensor.vertical_rays = 3;
        config.sampling.ring_count = 4;
        config.sampling.elevation_levels = 1;
        config
    }

    #[test]
    fn handler_answers_with_ranked_views() {
        let config = small_config();
        let snapshot = OccupancyMap::new(config.map).unwrap().snapshot();
        let mut source = MockMapSource::new();
        source
            .expect_fetch_map()
            .returning(move || OccupancyMap::from_snapshot(snapshot.clone()));

        let handler = NbvHandler {
            solver: NbvSolver::new(&config).unwrap(),
            map_source: Box::new(source),
            publisher: None,
        };

        let response = handler.handle(GetNbvRequest::default()).unwrap();
        assert!(!response.exploration_done);
        assert!(response.unknown_voxels > 0);
        assert_eq!(response.views.len(), 4);
        for pair in response.views.windows(2) {
            assert!(pair[0].gain >= pair[1].gain);
        }
    }

    #[test]
    fn handler_honors_request_bounds() {
        let config = small_config();
        let snapshot = OccupancyMap::new(config.map).unwrap().snapshot();
        let mut source = MockMapSource::new();
        source
            .expect_fetch_map()
            .returning(move || OccupancyMap::from_snapshot(snapshot.clone()));

        let handler = NbvHandler {
            solver: NbvSolver::new(&config).unwrap(),
            map_source: Box::new(source),
            publisher: None,
        };

        // A 0.2 m cube holds eight 0.1 m voxels.
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.2, 0.2, 0.2));
        let request = GetNbvRequest {
            bounds: Some(BoundsMsg::from(&bounds)),
        };
        let response = handler.handle(request).unwrap();
        assert_eq!(response.unknown_voxels, 8);
    }

    #[test]
    fn handler_propagates_map_source_failure() {
        let mut source = MockMapSource::new();
        source
            .expect_fetch_map()
            .returning(|| Err(ArgusError::Transport("map server unreachable".to_string())));

        let handler = NbvHandler {
            solver: NbvSolver::new(&small_config()).unwrap(),
            map_source: Box::new(source),
            publisher: None,
        };

        let err = handler.handle(GetNbvRequest::default()).unwrap_err();
        assert!(matches!(err, ArgusError::Transport(_)));
    }
}
