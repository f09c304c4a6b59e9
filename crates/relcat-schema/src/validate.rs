//! Schema gate for candidate version records.
//!
//! Validation runs on the raw JSON value rather than the typed record so that
//! every problem in a record can be reported at once instead of stopping at the
//! first field serde refuses.

use crate::record::VersionRecord;
use crate::SchemaError;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Keys every artifact object must carry.
pub const REQUIRED_ARTIFACT_KEYS: [&str; 5] =
    ["platform", "variant", "url", "archive_format", "sha256"];

/// Accepted `archive_format` values.
pub const VALID_ARCHIVE_FORMATS: [&str; 3] = ["tar.gz", "tar.zst", "zip"];

/// A single problem found in a candidate record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("record is not an object")]
    NotAnObject,
    #[error("missing or empty 'version'")]
    MissingVersion,
    #[error("missing or empty 'date'")]
    MissingDate,
    #[error("missing or empty 'artifacts'")]
    MissingArtifacts,
    #[error("artifact[{index}]: not an object")]
    ArtifactNotObject { index: usize },
    #[error("artifact[{index}]: missing keys {keys:?}")]
    MissingKeys {
        index: usize,
        keys: Vec<&'static str>,
    },
    #[error("artifact[{index}]: '{key}' must be a string")]
    NotAString { index: usize, key: &'static str },
    #[error("artifact[{index}]: invalid archive_format {value:?}")]
    InvalidArchiveFormat { index: usize, value: String },
}

/// Every violation found in one record, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaViolations(Vec<Violation>);

impl SchemaViolations {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self(violations)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

impl fmt::Display for SchemaViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

fn is_non_empty_str(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.is_empty())
}

/// Check a candidate record against the ledger schema.
///
/// Returns all violations found; an empty result means the record is valid.
/// When `artifacts` is missing or empty no per-artifact checks run, and an
/// artifact with missing keys is not checked further.
pub fn validate_record(entry: &Value) -> SchemaViolations {
    let Some(obj) = entry.as_object() else {
        return SchemaViolations(vec![Violation::NotAnObject]);
    };

    let mut violations = Vec::new();

    if !is_non_empty_str(obj.get("version")) {
        violations.push(Violation::MissingVersion);
    }
    if !is_non_empty_str(obj.get("date")) {
        violations.push(Violation::MissingDate);
    }

    let artifacts = match obj.get("artifacts") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => {
            violations.push(Violation::MissingArtifacts);
            return SchemaViolations(violations);
        }
    };

    for (index, artifact) in artifacts.iter().enumerate() {
        let Some(fields) = artifact.as_object() else {
            violations.push(Violation::ArtifactNotObject { index });
            continue;
        };

        let mut missing: Vec<&'static str> = REQUIRED_ARTIFACT_KEYS
            .into_iter()
            .filter(|key| !fields.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            violations.push(Violation::MissingKeys {
                index,
                keys: missing,
            });
            continue;
        }

        for key in REQUIRED_ARTIFACT_KEYS {
            if !fields[key].is_string() {
                violations.push(Violation::NotAString { index, key });
            }
        }

        if let Some(format) = fields["archive_format"].as_str() {
            if !VALID_ARCHIVE_FORMATS.contains(&format) {
                violations.push(Violation::InvalidArchiveFormat {
                    index,
                    value: format.to_owned(),
                });
            }
        }
    }

    SchemaViolations(violations)
}

/// Validate a candidate record and decode it into a typed [`VersionRecord`].
pub fn parse_record(entry: Value) -> Result<VersionRecord, SchemaError> {
    let violations = validate_record(&entry);
    if !violations.is_empty() {
        return Err(SchemaError::Violations(violations));
    }
    serde_json::from_value(entry).map_err(SchemaError::Decode)
}
