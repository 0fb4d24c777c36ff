use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Https,
    Http,
}

impl Protocol {
    pub fn is_https(self) -> bool {
        matches!(self, Protocol::Https)
    }
}

/// Outcome of a single liveness check. Every transport failure maps to
/// `NotListening`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Listening,
    NotListening,
}

impl Liveness {
    pub fn is_listening(&self) -> bool {
        matches!(self, Liveness::Listening)
    }
}

/// A URL scheduled for checking, tagged with the domain it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    pub domain: String,
    pub protocol: Protocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub url: String,
    pub domain: String,
    pub protocol: Protocol,
}

impl From<Target> for Hit {
    fn from(target: Target) -> Self {
        Self {
            url: target.url,
            domain: target.domain,
            protocol: target.protocol,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub concurrency: usize,
    pub probes: Vec<String>,
    pub skip_default: bool,
    pub timeout: Duration,
    pub prefer_https: bool,
    pub method: Method,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 20,
            probes: Vec::new(),
            skip_default: false,
            timeout: Duration::from_millis(10_000),
            prefer_https: false,
            method: Method::GET,
        }
    }
}

/// URLs that answered, in the order workers reported them.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    hits: Vec<Hit>,
}

impl ScanReport {
    pub(crate) fn new(hits: Vec<Hit>) -> Self {
        Self { hits }
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> + '_ {
        self.hits.iter().map(|hit| hit.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
