use reqwest::Client;
use std::time::Duration;

/// Client for one-shot probes: no idle connections are kept, so every
/// check dials fresh.
pub fn create_probe_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .pool_max_idle_per_host(0)
        .tcp_nodelay(true)
        .use_rustls_tls()
        .build()
}
