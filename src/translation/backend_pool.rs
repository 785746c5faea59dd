/*!
 * Ordered ring of translation endpoints with a shared selection pointer.
 *
 * The pool is created once per run and shared by reference (`Arc`) with the
 * translation client. Rotation advances the pointer and wraps after the last
 * endpoint; endpoints are never removed, so a dead one is simply revisited
 * on the next lap.
 */

use anyhow::{anyhow, Result};
use log::debug;
use parking_lot::Mutex;
use std::fmt;
use url::Url;

/// One translation service, identified by its base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    base_url: Url,
}

impl BackendEndpoint {
    /// Parse and validate an endpoint string
    ///
    /// A missing scheme defaults to `http://`.
    pub fn parse(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(anyhow!("Endpoint cannot be empty"));
        }

        let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(endpoint)?
        } else {
            Url::parse(&format!("http://{}", endpoint))?
        };

        if url.host_str().is_none() {
            return Err(anyhow!("Invalid host in endpoint: {}", endpoint));
        }

        Ok(Self { base_url: url })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Full URL for an API path below the base URL
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

impl fmt::Display for BackendEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url())
    }
}

/// Cyclic pool of endpoints with a single current selection
#[derive(Debug)]
pub struct BackendPool {
    endpoints: Vec<BackendEndpoint>,
    current: Mutex<usize>,
}

impl BackendPool {
    /// Create a pool selecting the first endpoint
    pub fn new(endpoints: Vec<BackendEndpoint>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(anyhow!("Backend pool needs at least one endpoint"));
        }

        Ok(Self {
            endpoints,
            current: Mutex::new(0),
        })
    }

    /// Create a pool from endpoint strings
    pub fn from_urls<S: AsRef<str>>(urls: &[S]) -> Result<Self> {
        let endpoints = urls
            .iter()
            .map(|u| BackendEndpoint::parse(u.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(endpoints)
    }

    /// The currently selected endpoint
    pub fn current(&self) -> BackendEndpoint {
        let index = *self.current.lock();
        self.endpoints[index].clone()
    }

    /// Index of the currently selected endpoint
    pub fn current_index(&self) -> usize {
        *self.current.lock()
    }

    /// Advance to the next endpoint, wrapping after the last one
    pub fn rotate(&self) -> BackendEndpoint {
        let mut current = self.current.lock();
        let previous = *current;
        *current = (previous + 1) % self.endpoints.len();
        debug!(
            "Rotating backend {} -> {}",
            self.endpoints[previous], self.endpoints[*current]
        );
        self.endpoints[*current].clone()
    }

    /// Number of endpoints in the ring
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false; a pool cannot be built empty
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// All endpoints in ring order
    pub fn endpoints(&self) -> &[BackendEndpoint] {
        &self.endpoints
    }
}
