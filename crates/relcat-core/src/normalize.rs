use crate::config::RelcatConfig;
use crate::identity::{resolve_identity, ReleaseIdentity};
use crate::CoreError;
use chrono::{SecondsFormat, Utc};
use relcat_remote::{ChecksumSource, RemoteError};
use relcat_schema::{
    parse_plan_str, validate_record, ArchiveFormat, ArtifactRecord, DistPlan, Platform,
    SchemaError, VersionRecord, DEFAULT_VARIANT,
};
use std::collections::BTreeMap;
use thiserror::Error;

/// Files in a release that never describe a platform build.
const EXCLUDED_NAMES: [&str; 3] = ["source.tar.gz", "source.tar.gz.sha256", "sha256.sum"];
const EXCLUDED_SUFFIXES: [&str; 3] = [".sha256", ".sh", ".ps1"];

/// A release asset that qualifies as a platform build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateArtifact {
    pub filename: String,
    pub platform: Platform,
    pub archive_format: ArchiveFormat,
}

/// An artifact left out of the record because its checksum could not be
/// fetched.
#[derive(Debug, Error)]
#[error("could not fetch SHA256 for {artifact}: {source}")]
pub struct ChecksumUnavailable {
    pub artifact: String,
    #[source]
    pub source: RemoteError,
}

#[derive(Debug)]
pub struct NormalizeReport {
    pub identity: ReleaseIdentity,
    pub record: VersionRecord,
    pub skipped: Vec<ChecksumUnavailable>,
}

/// Parse a release manifest read from stdin.
pub fn parse_plan(input: &str) -> Result<DistPlan, CoreError> {
    if input.trim().is_empty() {
        return Err(CoreError::NoInput(
            "expected cargo-dist plan JSON on stdin".to_owned(),
        ));
    }
    parse_plan_str(input).map_err(|e| match e {
        SchemaError::Plan(inner) => CoreError::InvalidManifest(inner.to_string()),
        other => CoreError::Schema(other),
    })
}

/// Select the platform builds of `app_name` from a release's asset names.
///
/// Only `<app_name>-<platform>.tar.gz` and `<app_name>-<platform>.zip` are
/// kept; checksum sidecars, source bundles and installer scripts are not.
pub fn filter_artifacts(app_name: &str, artifacts: &[String]) -> Vec<CandidateArtifact> {
    let prefix = format!("{app_name}-");
    artifacts
        .iter()
        .filter_map(|name| {
            if EXCLUDED_NAMES.contains(&name.as_str())
                || EXCLUDED_SUFFIXES.iter().any(|s| name.ends_with(s))
            {
                return None;
            }
            let rest = name.strip_prefix(&prefix)?;
            let format = match ArchiveFormat::from_filename(rest) {
                Some(f @ (ArchiveFormat::TarGz | ArchiveFormat::Zip)) => f,
                _ => {
                    tracing::debug!("ignoring {name}: not a .tar.gz or .zip archive");
                    return None;
                }
            };
            let platform = &rest[..rest.len() - format.extension().len()];
            if platform.is_empty() {
                tracing::debug!("ignoring {name}: no platform in filename");
                return None;
            }
            Some(CandidateArtifact {
                filename: name.clone(),
                platform: Platform::new(platform),
                archive_format: format,
            })
        })
        .collect()
}

/// Current UTC time as RFC 3339 with microseconds and a `+00:00` offset.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Turns a release manifest into a [`VersionRecord`], looking up each
/// artifact's checksum through a [`ChecksumSource`].
pub struct Normalizer<'a, S: ChecksumSource> {
    source: &'a S,
    download_base: String,
    default_org: String,
    clock: fn() -> String,
}

impl<'a, S: ChecksumSource> Normalizer<'a, S> {
    pub fn new(source: &'a S, config: &RelcatConfig) -> Self {
        Self {
            source,
            download_base: config.download_base.trim_end_matches('/').to_owned(),
            default_org: config.default_org.clone(),
            clock: utc_timestamp,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    pub fn download_url(&self, identity: &ReleaseIdentity, version: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}/releases/download/{version}/{filename}",
            self.download_base, identity.org, identity.repo
        )
    }

    pub fn normalize(&self, plan: &DistPlan) -> Result<NormalizeReport, CoreError> {
        self.normalize_with_progress(plan, |_| {})
    }

    /// Like [`normalize`](Self::normalize), calling `progress` before each
    /// checksum fetch.
    pub fn normalize_with_progress<F>(
        &self,
        plan: &DistPlan,
        mut progress: F,
    ) -> Result<NormalizeReport, CoreError>
    where
        F: FnMut(&CandidateArtifact),
    {
        let identity = resolve_identity(plan, &self.download_base, &self.default_org)?;
        let version = plan.announcement_tag.as_str();
        let candidates = plan
            .release(&identity.app_name)
            .map(|release| filter_artifacts(&identity.app_name, &release.artifacts))
            .unwrap_or_default();
        tracing::debug!(
            "{}/{} {version}: {} candidate artifacts",
            identity.org,
            identity.repo,
            candidates.len()
        );

        let mut record = VersionRecord::new(version, (self.clock)());
        let mut skipped = Vec::new();
        for candidate in candidates {
            progress(&candidate);
            let url = self.download_url(&identity, version, &candidate.filename);
            match self.source.fetch_checksum(&format!("{url}.sha256")) {
                Ok(sha256) => record.artifacts.push(ArtifactRecord {
                    platform: candidate.platform,
                    variant: DEFAULT_VARIANT.into(),
                    url,
                    archive_format: candidate.archive_format,
                    sha256,
                    extra: BTreeMap::new(),
                }),
                Err(source) => {
                    let unavailable = ChecksumUnavailable {
                        artifact: candidate.filename,
                        source,
                    };
                    tracing::warn!("{unavailable}");
                    skipped.push(unavailable);
                }
            }
        }
        record.sort_artifacts();

        let violations = validate_record(&serde_json::to_value(&record)?);
        if !violations.is_empty() {
            return Err(CoreError::InvalidOutput(violations));
        }

        Ok(NormalizeReport {
            identity,
            record,
            skipped,
        })
    }
}
