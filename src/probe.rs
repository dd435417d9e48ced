//! Health probes for the supervised service.
//!
//! A probe is an external round trip over the network: it confirms the
//! service is actually answering requests, which a mere liveness check on
//! the process cannot. Probe failures are verdicts, not faults; the
//! supervisor responds to them by restarting the service.
use std::{
    fmt, io,
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::{Duration, Instant},
};

use reqwest::blocking::Client;

use crate::{config::ProbeEndpoint, error::ProbeError};

/// Diagnostic payload returned by a successful probe.
///
/// Logged verbatim and never parsed; its shape is whatever the probe found
/// interesting about the round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport(String);

impl ProbeReport {
    /// Wraps a human-readable description of the round trip.
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single bounded health-check round trip against the service.
pub trait HealthProbe {
    /// Performs one probe; any error means the service is unhealthy.
    fn probe(&self) -> Result<ProbeReport, ProbeError>;
}

impl<T: HealthProbe + ?Sized> HealthProbe for Box<T> {
    fn probe(&self) -> Result<ProbeReport, ProbeError> {
        (**self).probe()
    }
}

/// Opaque TCP connection round trip against the service endpoint.
///
/// Knows nothing about the service's protocol; a completed connection within
/// the timeout counts as healthy.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    endpoint: ProbeEndpoint,
    timeout: Duration,
}

impl TcpProbe {
    /// Creates a TCP probe with a bounded connection timeout.
    pub fn new(endpoint: ProbeEndpoint, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }
}

impl HealthProbe for TcpProbe {
    fn probe(&self) -> Result<ProbeReport, ProbeError> {
        let addr = resolve(&self.endpoint)?;
        let started = Instant::now();
        let stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        let peer = stream.peer_addr()?;
        Ok(ProbeReport::new(format!(
            "{peer} accepted a connection in {:?}",
            started.elapsed()
        )))
    }
}

/// Resolves the endpoint to the first usable socket address.
fn resolve(endpoint: &ProbeEndpoint) -> Result<SocketAddr, ProbeError> {
    let mut addrs = (endpoint.host.as_str(), endpoint.port).to_socket_addrs()?;
    addrs.next().ok_or_else(|| {
        ProbeError::Connect(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses resolved for {endpoint}"),
        ))
    })
}

/// HTTP GET probe; any 2xx response counts as healthy.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    url: String,
    client: Client,
}

impl HttpProbe {
    /// Builds the probe and its bounded-timeout HTTP client.
    pub fn new(
        endpoint: &ProbeEndpoint,
        path: &str,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: endpoint.http_url(path),
            client,
        })
    }
}

impl HealthProbe for HttpProbe {
    fn probe(&self) -> Result<ProbeReport, ProbeError> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if status.is_success() {
            Ok(ProbeReport::new(format!("HTTP {status} from {}", self.url)))
        } else {
            Err(ProbeError::Unhealthy(status))
        }
    }
}
