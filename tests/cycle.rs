//! End-to-end collection cycle scenarios against a scripted source and
//! an in-memory blob store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Timelike};

use lotwatch::cycle::run_cycle_at;
use lotwatch::dataset::collection_tz;
use lotwatch::error::{CycleError, DirectoryUnavailable, LotError};
use lotwatch::scrape::StatusSource;
use lotwatch::status::RawStatus;
use lotwatch::store::{BlobStore, DatasetStore, MemoryBlobStore};

#[derive(Clone)]
enum Outcome {
    Token(&'static str),
    Unknown,
    Down,
    Drift,
}

struct FakeSource {
    directory: Result<Vec<(&'static str, &'static str)>, &'static str>,
    outcomes: HashMap<&'static str, Outcome>,
}

impl FakeSource {
    fn new(lots: &[(&'static str, &'static str, Outcome)]) -> Self {
        Self {
            directory: Ok(lots.iter().map(|(name, url, _)| (*name, *url)).collect()),
            outcomes: lots.iter().map(|(_, url, o)| (*url, o.clone())).collect(),
        }
    }

    fn unavailable(reason: &'static str) -> Self {
        Self {
            directory: Err(reason),
            outcomes: HashMap::new(),
        }
    }
}

#[async_trait]
impl StatusSource for FakeSource {
    async fn directory(&self) -> Result<BTreeMap<String, String>, DirectoryUnavailable> {
        match &self.directory {
            Ok(lots) => Ok(lots
                .iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect()),
            Err(reason) => Err(DirectoryUnavailable(reason.to_string())),
        }
    }

    async fn lot_status(&self, url: &str) -> Result<RawStatus, LotError> {
        match self.outcomes.get(url) {
            Some(Outcome::Token(t)) => Ok(RawStatus::Token(t.to_string())),
            Some(Outcome::Unknown) => Ok(RawStatus::Unknown),
            Some(Outcome::Down) => Err(LotError::Unreachable("timed out".into())),
            Some(Outcome::Drift) => Err(LotError::SchemaViolation {
                element: "status cell",
                count: 2,
            }),
            None => Ok(RawStatus::Unknown),
        }
    }
}

fn memory_store() -> DatasetStore {
    DatasetStore::new(Arc::new(MemoryBlobStore::default()), "data.feather")
}

fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
    // 2024-01-01 is a Monday.
    collection_tz().with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
}

#[tokio::test]
async fn known_status_becomes_a_row_and_unknown_contributes_none() {
    let source = Arc::new(FakeSource::new(&[
        ("A", "http://x/a", Outcome::Token("meat")),
        ("B", "http://x/b", Outcome::Unknown),
    ]));
    let store = memory_store();

    let report = run_cycle_at(source, &store, 10, at(8, 17, 30)).await.unwrap();
    assert_eq!(report.lots, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.observed, 1);
    assert_eq!(report.total_rows, 1);

    let dataset = store.load().await.unwrap();
    assert_eq!(dataset.len(), 1);
    let row = &dataset.rows()[0];
    assert_eq!(row.lot, "A");
    assert_eq!(row.status, 0.7);
    assert_eq!(row.day, 1); // Monday, 0 = Sunday
    assert_eq!(row.hour, 8);
    assert_eq!(row.minute, 10); // 17 quantized down
    assert_eq!(row.time.minute(), 17);
}

#[tokio::test]
async fn failed_lots_are_isolated_and_the_rest_persist() {
    let source = Arc::new(FakeSource::new(&[
        ("A", "http://x/a", Outcome::Token("panui")),
        ("B", "http://x/b", Outcome::Down),
        ("C", "http://x/c", Outcome::Token("male")),
        ("D", "http://x/d", Outcome::Drift),
        ("E", "http://x/e", Outcome::Token("meat")),
    ]));
    let store = memory_store();

    let report = run_cycle_at(source, &store, 3, at(9, 0, 0)).await.unwrap();
    assert_eq!(report.lots, 5);
    assert_eq!(report.failed, 2);
    assert_eq!(report.observed, 3);
    assert_eq!(report.total_rows, 3);

    let dataset = store.load().await.unwrap();
    let mut lots: Vec<_> = dataset.rows().iter().map(|r| r.lot.as_str()).collect();
    lots.sort_unstable();
    assert_eq!(lots, vec!["A", "C", "E"]);
}

#[tokio::test]
async fn same_key_reobservation_leaves_the_existing_row_untouched() {
    let store = memory_store();

    let first = Arc::new(FakeSource::new(&[(
        "X",
        "http://x/x",
        Outcome::Token("panui"),
    )]));
    run_cycle_at(first, &store, 10, at(8, 11, 5)).await.unwrap();

    // Same 10-minute bucket, different status and capture time.
    let second = Arc::new(FakeSource::new(&[(
        "X",
        "http://x/x",
        Outcome::Token("male"),
    )]));
    let report = run_cycle_at(second, &store, 10, at(8, 19, 59)).await.unwrap();
    assert_eq!(report.total_rows, 1);

    let dataset = store.load().await.unwrap();
    assert_eq!(dataset.len(), 1);
    let row = &dataset.rows()[0];
    assert_eq!(row.status, 0.0); // first write wins
    assert_eq!(row.time.minute(), 11); // original time retained
}

#[tokio::test]
async fn consecutive_buckets_accumulate_history() {
    let store = memory_store();
    for (minute, token) in [(0, "panui"), (10, "meat"), (20, "male")] {
        let source = Arc::new(FakeSource::new(&[(
            "X",
            "http://x/x",
            Outcome::Token(token),
        )]));
        run_cycle_at(source, &store, 10, at(8, minute, 0)).await.unwrap();
    }

    let dataset = store.load().await.unwrap();
    assert_eq!(dataset.len(), 3);
    let statuses: Vec<_> = dataset.rows().iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![0.0, 0.7, 1.0]);
}

#[tokio::test]
async fn zero_successful_lots_still_completes_the_cycle() {
    let source = Arc::new(FakeSource::new(&[
        ("A", "http://x/a", Outcome::Down),
        ("B", "http://x/b", Outcome::Unknown),
    ]));
    let store = memory_store();

    let report = run_cycle_at(source, &store, 10, at(8, 0, 0)).await.unwrap();
    assert_eq!(report.observed, 0);
    assert_eq!(report.total_rows, 0);
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn directory_failure_is_terminal_and_writes_nothing() {
    let blob = Arc::new(MemoryBlobStore::default());
    let store = DatasetStore::new(blob.clone(), "data.feather");
    let source = Arc::new(FakeSource::unavailable("connect failure"));

    let result = run_cycle_at(source, &store, 10, at(8, 0, 0)).await;
    assert!(matches!(result, Err(CycleError::Directory(_))));

    // No partial persist: the blob was never created.
    assert!(blob.get("data.feather").await.unwrap().is_none());
}
