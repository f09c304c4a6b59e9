use crate::types::{Platform, Sha256Digest, Variant};
use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Variant tag assigned to every artifact produced by the normalizer.
pub const DEFAULT_VARIANT: &str = "default";

/// Archive container of a downloadable artifact. The set is closed: any other
/// value is rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchiveFormat {
    #[serde(rename = "tar.gz")]
    TarGz,
    #[serde(rename = "tar.zst")]
    TarZst,
    #[serde(rename = "zip")]
    Zip,
}

impl ArchiveFormat {
    pub const ALL: [ArchiveFormat; 3] = [Self::TarGz, Self::TarZst, Self::Zip];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::TarZst => "tar.zst",
            Self::Zip => "zip",
        }
    }

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => ".tar.gz",
            Self::TarZst => ".tar.zst",
            Self::Zip => ".zip",
        }
    }

    /// Classify a filename by suffix. `None` means the format is unknown.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| filename.ends_with(format.extension()))
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveFormat {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| SchemaError::InvalidArchiveFormat(s.to_owned()))
    }
}

/// One downloadable build output of a version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub platform: Platform,
    pub variant: Variant,
    pub url: String,
    pub archive_format: ArchiveFormat,
    pub sha256: Sha256Digest,
    /// Keys beyond the schema, carried through unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ArtifactRecord {
    /// Sort key for artifacts inside a version record.
    pub fn sort_key(&self) -> (&Platform, &Variant) {
        (&self.platform, &self.variant)
    }
}

/// One released version of a tracked project, as stored in a ledger line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionRecord {
    pub version: String,
    pub date: String,
    pub artifacts: Vec<ArtifactRecord>,
    /// Keys beyond the schema, carried through unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl VersionRecord {
    pub fn new(version: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            date: date.into(),
            artifacts: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Sort artifacts by `(platform, variant)` ascending. The sort is stable.
    pub fn sort_artifacts(&mut self) {
        self.artifacts
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    /// Whether artifacts are already in `(platform, variant)` order.
    pub fn artifacts_sorted(&self) -> bool {
        self.artifacts
            .windows(2)
            .all(|pair| pair[0].sort_key() <= pair[1].sort_key())
    }

    /// Compact single-line JSON, as written to a ledger.
    pub fn to_compact_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
