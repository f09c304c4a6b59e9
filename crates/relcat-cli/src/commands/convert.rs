use super::{spin_fail, spinner, stdin_is_interactive, EXIT_SUCCESS};
use relcat_core::{parse_plan, CoreError, Normalizer, RelcatConfig};
use relcat_remote::HttpChecksumSource;
use relcat_schema::DistPlan;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct ConvertOptions {
    pub config: Option<PathBuf>,
    pub download_base: Option<String>,
    pub default_org: Option<String>,
    pub timeout: Option<u64>,
}

/// Resolve the effective config: file, then flags, then `GITHUB_TOKEN`.
fn effective_config(opts: &ConvertOptions) -> Result<RelcatConfig, CoreError> {
    let mut config = match &opts.config {
        Some(path) => RelcatConfig::load(path)?,
        None => RelcatConfig::load_default()?,
    };
    if let Some(base) = &opts.download_base {
        config = config.with_download_base(base);
    }
    if let Some(org) = &opts.default_org {
        config.default_org.clone_from(org);
    }
    if let Some(secs) = opts.timeout {
        config.fetch.timeout_secs = secs;
    }
    if config.fetch.auth_token.is_none() {
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.is_empty() {
                config.fetch = config.fetch.with_token(&token);
            }
        }
    }
    Ok(config)
}

/// Read and parse the plan on `input`. Runs before any config is loaded so
/// that a missing or broken plan is reported as such.
fn read_plan(interactive: bool, mut input: impl Read) -> Result<DistPlan, CoreError> {
    if interactive {
        return Err(CoreError::NoInput(
            "expected cargo-dist plan JSON on stdin".to_owned(),
        ));
    }
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| CoreError::InvalidManifest(format!("not UTF-8: {e}")))?;
    parse_plan(&text)
}

pub fn run(opts: &ConvertOptions) -> Result<u8, String> {
    let plan =
        read_plan(stdin_is_interactive(), std::io::stdin().lock()).map_err(|e| e.to_string())?;
    let config = effective_config(opts).map_err(|e| e.to_string())?;

    eprintln!("Extracting version information...");
    let source = HttpChecksumSource::new(config.fetch.clone());
    let normalizer = Normalizer::new(&source, &config);
    let pb = spinner("fetching checksums");
    let report = match normalizer.normalize_with_progress(&plan, |candidate| {
        pb.set_message(format!("fetching checksum for {}", candidate.filename));
    }) {
        Ok(report) => {
            pb.finish_and_clear();
            report
        }
        Err(e) => {
            spin_fail(&pb, "normalization failed");
            return Err(e.to_string());
        }
    };

    eprintln!(
        "Found version: {} with {} artifacts",
        report.record.version,
        report.record.artifacts.len()
    );
    if !report.skipped.is_empty() {
        eprintln!(
            "Skipped {} artifacts without a checksum",
            report.skipped.len()
        );
    }

    let line = report
        .record
        .to_compact_json()
        .map_err(|e| format!("JSON serialization failed: {e}"))?;
    println!("{line}");
    Ok(EXIT_SUCCESS)
}
