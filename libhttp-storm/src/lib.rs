mod error;
mod http;
mod liveness;
mod pool;
mod scanner;
pub mod targets;
mod types;

pub use error::ProbeError;
pub use liveness::{HttpChecker, LivenessCheck};
pub use pool::{Batch, WorkerPool};
pub use reqwest::Method;
pub use scanner::Scanner;
pub use targets::{build_probe_set, normalize_domain, Probe, ProbeSet};
pub use types::{Hit, Liveness, Protocol, ScanConfig, ScanReport, Target};

/// Probes every domain in `lines` with the real HTTP client.
pub async fn scan<I>(lines: I, config: ScanConfig) -> Result<ScanReport, ProbeError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let probe_set = build_probe_set(lines, &config.probes, config.skip_default);
    let scanner = Scanner::http(config)?;
    Ok(scanner.scan(probe_set).await)
}
