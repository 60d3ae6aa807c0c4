//! Concurrent status collection with per-lot fault isolation.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::error::LotError;
use crate::scrape::StatusSource;
use crate::status::RawStatus;

/// Outcome of one collection pass. Every input lot lands in exactly one
/// of the two maps, so `len()` always equals the input directory size.
#[derive(Debug, Default)]
pub struct Collection {
    pub statuses: BTreeMap<String, RawStatus>,
    pub failures: BTreeMap<String, LotError>,
}

impl Collection {
    pub fn len(&self) -> usize {
        self.statuses.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.failures.is_empty()
    }
}

/// Resolve every lot's raw status with a bounded pool of worker tasks.
///
/// Workers drain a shared queue; one lot's failure never aborts the
/// others. Failed lots are logged and recorded, not retried. Results are
/// keyed by lot name, so completion order cannot affect the outcome.
pub async fn collect_statuses(
    source: Arc<dyn StatusSource>,
    lots: &BTreeMap<String, String>,
    workers: usize,
) -> Collection {
    let queue: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(
        lots.iter()
            .map(|(name, url)| (name.clone(), url.clone()))
            .collect(),
    ));

    let mut handles = Vec::new();
    for _ in 0..workers.clamp(1, lots.len().max(1)) {
        let queue = queue.clone();
        let source = source.clone();
        handles.push(tokio::spawn(async move {
            let mut outcomes = Vec::new();
            loop {
                let next = { queue.lock().await.pop() };
                let (name, url) = match next {
                    Some(item) => item,
                    None => break,
                };
                let outcome = source.lot_status(&url).await;
                outcomes.push((name, outcome));
            }
            outcomes
        }));
    }

    let mut collection = Collection::default();
    let mut aborted = false;
    for handle in handles {
        let outcomes = match handle.await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                // The panicked worker's collected outcomes and any queue
                // items it would have drained are gone; backfill below.
                warn!("collector worker panicked: {e}");
                aborted = true;
                continue;
            }
        };
        for (name, outcome) in outcomes {
            match outcome {
                Ok(status) => {
                    collection.statuses.insert(name, status);
                }
                Err(e @ LotError::SchemaViolation { .. }) => {
                    // Loud: this usually means the site's markup changed
                    // and every lot is about to go dark.
                    error!(lot = %name, "{e}");
                    collection.failures.insert(name, e);
                }
                Err(e) => {
                    warn!(lot = %name, "{e}; skipping this cycle");
                    collection.failures.insert(name, e);
                }
            }
        }
    }

    // Every input lot must appear in the output exactly once. Lots lost
    // to a panicked worker are recorded as failed, not silently dropped.
    if aborted {
        for name in lots.keys() {
            if !collection.statuses.contains_key(name) && !collection.failures.contains_key(name) {
                warn!(lot = %name, "status fetch aborted; skipping this cycle");
                collection.failures.insert(
                    name.clone(),
                    LotError::Unreachable("status fetch aborted".into()),
                );
            }
        }
    }
    collection
}
