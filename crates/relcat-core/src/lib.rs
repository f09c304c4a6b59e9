//! Orchestration for the relcat catalog tools.
//!
//! This crate ties together the record schema, the ledger store and the
//! checksum fetcher: `Normalizer` turns a cargo-dist release manifest into a
//! single `VersionRecord`, `parse_incoming` reads and gates NDJSON records for
//! insertion, and `insert_versions` merges them into a project ledger.
//! `RelcatConfig` holds the settings shared by both tools.

pub mod config;
pub mod identity;
pub mod insert;
pub mod normalize;

pub use config::RelcatConfig;
pub use identity::{resolve_identity, ReleaseIdentity};
pub use insert::{insert_versions, parse_incoming, IncomingRecord};
pub use normalize::{
    filter_artifacts, parse_plan, utc_timestamp, CandidateArtifact, ChecksumUnavailable,
    NormalizeReport, Normalizer,
};

use relcat_schema::SchemaViolations;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no input: {0}")]
    NoInput(String),
    #[error("malformed input on line {line}: {message}")]
    MalformedInput { line: usize, message: String },
    #[error("invalid release manifest: {0}")]
    InvalidManifest(String),
    #[error("missing release: no releases found in manifest")]
    MissingRelease,
    #[error("schema violation on line {line}: {violations}")]
    SchemaViolation {
        line: usize,
        violations: SchemaViolations,
    },
    #[error("schema violation in normalized record: {0}")]
    InvalidOutput(SchemaViolations),
    #[error("duplicate version '{version}' on lines {first_line} and {line}")]
    DuplicateVersion {
        version: String,
        first_line: usize,
        line: usize,
    },
    #[error("schema error: {0}")]
    Schema(#[from] relcat_schema::SchemaError),
    #[error("store error: {0}")]
    Store(#[from] relcat_store::StoreError),
    #[error("remote error: {0}")]
    Remote(#[from] relcat_remote::RemoteError),
    #[error("config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
