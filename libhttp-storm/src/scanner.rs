use crate::{
    error::ProbeError,
    liveness::{HttpChecker, LivenessCheck},
    pool::{Batch, WorkerPool},
    targets::ProbeSet,
    types::{Hit, ScanConfig, ScanReport, Target},
};
use dashmap::DashSet;
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};
use tracing::{debug, info};

type Accumulator = Arc<Mutex<Vec<Hit>>>;

pub struct Scanner {
    checker: Arc<dyn LivenessCheck>,
    pool: WorkerPool,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig, checker: Arc<dyn LivenessCheck>) -> Self {
        Self {
            checker,
            pool: WorkerPool::new(config.concurrency),
            config,
        }
    }

    /// Scanner backed by the real HTTP client, using `config.timeout`.
    pub fn http(config: ScanConfig) -> Result<Self, ProbeError> {
        let checker = HttpChecker::new(config.timeout)?;
        Ok(Self::new(config, Arc::new(checker)))
    }

    /// Checks the HTTPS group to completion, then the HTTP group. With
    /// `prefer_https`, HTTP targets for any domain that already answered
    /// over HTTPS are never checked.
    pub async fn scan(&self, probe_set: ProbeSet) -> ScanReport {
        let start = Instant::now();
        let (https, http) = probe_set.into_groups();
        let hits: Accumulator = Arc::new(Mutex::new(Vec::new()));
        let answered: Arc<DashSet<String>> = Arc::new(DashSet::new());

        let batch = self.submit(https, &hits, &answered);
        debug!(targets = batch.len(), workers = self.pool.size(), "https batch submitted");
        batch.wait().await;
        debug!(answered = answered.len(), "https batch drained");

        let http = if self.config.prefer_https {
            let before = http.len();
            let remaining: Vec<Target> = http
                .into_iter()
                .filter(|target| !answered.contains(&target.domain))
                .collect();
            debug!(skipped = before - remaining.len(), "prefer-https filtered http targets");
            remaining
        } else {
            http
        };

        let batch = self.submit(http, &hits, &answered);
        debug!(targets = batch.len(), workers = self.pool.size(), "http batch submitted");
        batch.wait().await;
        debug!("http batch drained");

        let hits = std::mem::take(&mut *hits.lock().unwrap_or_else(PoisonError::into_inner));
        info!(hits = hits.len(), elapsed = ?start.elapsed(), "scan complete");
        ScanReport::new(hits)
    }

    fn submit(
        &self,
        targets: Vec<Target>,
        hits: &Accumulator,
        answered: &Arc<DashSet<String>>,
    ) -> Batch {
        let checker = Arc::clone(&self.checker);
        let method = self.config.method.clone();
        let hits = Arc::clone(hits);
        let answered = Arc::clone(answered);

        self.pool.submit(targets, move |target: Target| {
            let checker = Arc::clone(&checker);
            let method = method.clone();
            let hits = Arc::clone(&hits);
            let answered = Arc::clone(&answered);
            async move {
                if !checker.check(&target.url, &method).await.is_listening() {
                    return;
                }
                if target.protocol.is_https() {
                    answered.insert(target.domain.clone());
                }
                hits.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(Hit::from(target));
            }
        })
    }
}
