//! Error taxonomy for the collection pipeline.
//!
//! Cycle-level failures (`DirectoryUnavailable`, `StoreError`) abort the
//! whole run with no dataset mutation. `LotError` is scoped to a single
//! lot and never escalates past the collector.

use thiserror::Error;

/// The directory page could not be fetched. Fatal: without a lot list
/// no statuses can be collected.
#[derive(Debug, Error)]
#[error("directory fetch failed: {0}")]
pub struct DirectoryUnavailable(pub String);

/// A failure scoped to one lot's status fetch.
#[derive(Debug, Error)]
pub enum LotError {
    /// Network failure (including timeout) fetching the detail page.
    #[error("lot unreachable: {0}")]
    Unreachable(String),

    /// The detail page matched more than one status cell or image.
    /// Distinct from `RawStatus::Unknown`: the page changed shape, and
    /// coercing it to a status could record a wrong lot's occupancy.
    #[error("page schema violation: found {count} {element} elements")]
    SchemaViolation {
        element: &'static str,
        count: usize,
    },
}

/// Load or save against the durable store failed. Fatal; the previously
/// persisted blob is left untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blob store I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset encoding: {0}")]
    Codec(#[from] arrow::error::ArrowError),

    #[error("corrupt dataset: {0}")]
    Corrupt(String),
}

/// Terminal failure of one collection cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Directory(#[from] DirectoryUnavailable),

    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
}
