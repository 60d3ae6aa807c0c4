//! One end-to-end collection cycle.
//!
//! Strictly sequential: resolve directory, collect statuses, stamp the
//! accepted ones into the current 10-minute bucket, merge into the
//! persisted table. Stateless between invocations; the persisted dataset
//! is the only thing carried across cycles.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::info;

use crate::collector::collect_statuses;
use crate::dataset::{collection_tz, TimeBucket};
use crate::error::CycleError;
use crate::scrape::StatusSource;
use crate::status::occupancy_level;
use crate::store::DatasetStore;

/// Per-cycle counters, logged for the external scheduler's monitoring.
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    /// Lots listed by the directory this cycle.
    pub lots: usize,
    /// Lots whose fetch failed (unreachable or schema violation).
    pub failed: usize,
    /// Observations stamped this cycle (known, normalizer-accepted).
    pub observed: usize,
    /// Rows in the persisted table after merge and dedup.
    pub total_rows: usize,
}

/// Run one cycle stamped with the current time.
pub async fn run_cycle(
    source: Arc<dyn StatusSource>,
    store: &DatasetStore,
    workers: usize,
) -> Result<CycleReport, CycleError> {
    let now = Utc::now().with_timezone(&collection_tz());
    run_cycle_at(source, store, workers, now).await
}

/// Run one cycle stamped with an explicit capture instant.
pub async fn run_cycle_at(
    source: Arc<dyn StatusSource>,
    store: &DatasetStore,
    workers: usize,
    now: DateTime<FixedOffset>,
) -> Result<CycleReport, CycleError> {
    let lots = source.directory().await?;
    info!(lots = lots.len(), "resolved lot directory");

    let collection = collect_statuses(source, &lots, workers).await;
    debug_assert_eq!(collection.len(), lots.len());

    let bucket = TimeBucket::from_time(now);
    let mut new_rows = Vec::new();
    for (lot, raw) in &collection.statuses {
        // Lots with unknown or unmapped status contribute no row.
        if let Some(level) = occupancy_level(raw) {
            new_rows.push(bucket.observation(lot, level));
        }
    }
    let observed = new_rows.len();
    info!(rows = observed, "stamped new observations");

    let mut dataset = store.load().await?;
    info!(rows = dataset.len(), "read dataset");
    dataset.append(new_rows);
    let total_rows = store.save(dataset).await?;

    let report = CycleReport {
        lots: lots.len(),
        failed: collection.failures.len(),
        observed,
        total_rows,
    };
    info!(
        lots = report.lots,
        failed = report.failed,
        observed = report.observed,
        total_rows = report.total_rows,
        "cycle succeeded"
    );
    Ok(report)
}
