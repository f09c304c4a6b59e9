use crate::CoreError;
use regex::Regex;
use relcat_schema::DistPlan;

/// Where a release lives: `<base>/<org>/<repo>` publishes the assets of
/// `app_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseIdentity {
    pub org: String,
    pub repo: String,
    pub app_name: String,
}

/// Pattern matching a release download link under `download_base`, capturing
/// the organization and repository.
pub fn download_pattern(download_base: &str) -> Result<Regex, CoreError> {
    let base = regex::escape(download_base.trim_end_matches('/'));
    Regex::new(&format!("{base}/([^/\\s]+)/([^/\\s]+)/releases/download/"))
        .map_err(|e| CoreError::Config(format!("invalid download base {download_base:?}: {e}")))
}

/// Resolve organization, repository and application name of a plan.
///
/// The application is the first release entry. Organization and repository
/// come from the first download link in the announcement body; without one,
/// `default_org` and the application name are used.
pub fn resolve_identity(
    plan: &DistPlan,
    download_base: &str,
    default_org: &str,
) -> Result<ReleaseIdentity, CoreError> {
    let app_name = plan
        .releases
        .first()
        .map(|r| r.app_name.clone())
        .ok_or(CoreError::MissingRelease)?;

    if let Some(body) = plan.announcement_github_body.as_deref() {
        let pattern = download_pattern(download_base)?;
        if let Some(caps) = pattern.captures(body) {
            return Ok(ReleaseIdentity {
                org: caps[1].to_owned(),
                repo: caps[2].to_owned(),
                app_name,
            });
        }
        tracing::debug!("no download link in announcement body, using default org {default_org}");
    }

    Ok(ReleaseIdentity {
        org: default_org.to_owned(),
        repo: app_name.clone(),
        app_name,
    })
}
