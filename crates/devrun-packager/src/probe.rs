//! Liveness probes for the packager endpoint

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use devrun_core::prelude::*;
use devrun_core::PackagerEndpoint;

/// Default connect timeout for a single probe
pub const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Checks whether something is accepting connections at an endpoint
#[trait_variant::make(EndpointProbe: Send)]
pub trait LocalEndpointProbe {
    /// `true` if a listener accepted the probe
    async fn is_listening(&self, endpoint: &PackagerEndpoint) -> bool;
}

/// Probe that opens (and immediately drops) a TCP connection
#[derive(Debug, Clone)]
pub struct TcpProbe {
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(PROBE_CONNECT_TIMEOUT)
    }
}

impl EndpointProbe for TcpProbe {
    async fn is_listening(&self, endpoint: &PackagerEndpoint) -> bool {
        match timeout(self.connect_timeout, TcpStream::connect(endpoint.socket_addr())).await {
            Ok(Ok(_stream)) => {
                trace!("Probe {}: listening", endpoint);
                true
            }
            Ok(Err(e)) => {
                trace!("Probe {}: {}", endpoint, e);
                false
            }
            Err(_) => {
                trace!("Probe {}: connect timed out", endpoint);
                false
            }
        }
    }
}
