//! Persistent per-project version ledgers for relcat.
//!
//! A ledger is an NDJSON file (`<name>.ndjson`) holding one JSON object per
//! line, newest first. Lines written by relcat are compact `VersionRecord`s;
//! older lines are carried along verbatim. This crate provides the
//! `CatalogLayout` that maps project names to ledger paths, the in-memory
//! `Ledger` with its tolerant loader and version-deduplicating merge, atomic
//! persistence through `LedgerStore`, and `verify_ledger` for strict re-reads.

pub mod integrity;
pub mod layout;
pub mod ledger;

pub use integrity::{verify_ledger, LedgerIssue, LedgerReport};
pub use layout::{validate_project_name, CatalogLayout, LEDGER_EXTENSION};
pub use ledger::{InsertResult, Ledger, LedgerEntry, LedgerStore, MergeOutcome};

use std::path::Path;
use thiserror::Error;

/// Fsync a directory so that a preceding `rename()` is durable.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid project name: {0}")]
    InvalidName(String),
    #[error("ledger not found: {0}")]
    LedgerNotFound(String),
}
