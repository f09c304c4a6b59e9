//! Record types, release manifest parsing, and schema validation for relcat.
//!
//! This crate defines the schema layer: the `VersionRecord` / `ArtifactRecord`
//! pair stored in project ledgers, the closed `ArchiveFormat` set, the cargo-dist
//! release manifest (`DistPlan`) consumed by the normalizer, and the validation
//! gate (`validate_record`) that collects every violation in a candidate record
//! before it is allowed into a ledger.

pub mod plan;
pub mod record;
pub mod types;
pub mod validate;

pub use plan::{parse_plan_str, DistPlan, DistRelease};
pub use record::{ArchiveFormat, ArtifactRecord, VersionRecord, DEFAULT_VARIANT};
pub use types::{Platform, Sha256Digest, Variant};
pub use validate::{
    parse_record, validate_record, SchemaViolations, Violation, REQUIRED_ARTIFACT_KEYS,
    VALID_ARCHIVE_FORMATS,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema violation: {0}")]
    Violations(SchemaViolations),
    #[error("failed to parse release manifest: {0}")]
    Plan(#[source] serde_json::Error),
    #[error("failed to decode version record: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid archive format: {0:?}")]
    InvalidArchiveFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_display_lists_every_violation() {
        let e = SchemaError::Violations(SchemaViolations::new(vec![
            Violation::MissingVersion,
            Violation::MissingDate,
        ]));
        let msg = e.to_string();
        assert!(msg.starts_with("schema violation:"));
        assert!(msg.contains("'version'"));
        assert!(msg.contains("'date'"));
    }

    #[test]
    fn schema_error_display_invalid_archive_format() {
        let e = SchemaError::InvalidArchiveFormat("rar".to_owned());
        assert!(e.to_string().contains("\"rar\""));
    }
}
