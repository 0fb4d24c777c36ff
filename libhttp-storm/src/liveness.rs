use crate::{error::ProbeError, http::create_probe_client, types::Liveness};
use async_trait::async_trait;
use reqwest::{header::CONNECTION, Client, Method};
use std::time::Duration;

/// Answers "did anything respond at this URL".
#[async_trait]
pub trait LivenessCheck: Send + Sync {
    async fn check(&self, url: &str, method: &Method) -> Liveness;
}

#[derive(Debug, Clone)]
pub struct HttpChecker {
    client: Client,
    timeout: Duration,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        Ok(Self {
            client: create_probe_client(timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl LivenessCheck for HttpChecker {
    async fn check(&self, url: &str, method: &Method) -> Liveness {
        let request = self
            .client
            .request(method.clone(), url)
            .header(CONNECTION, "close")
            .send();

        match tokio::time::timeout(self.timeout, request).await {
            // Any status counts. The body is never read; dropping the
            // response releases the connection.
            Ok(Ok(response)) => {
                drop(response);
                Liveness::Listening
            }
            Ok(Err(_)) | Err(_) => Liveness::NotListening,
        }
    }
}
