use crate::SchemaError;
use serde::{Deserialize, Serialize};

/// The subset of a `cargo dist plan --output-format=json` document that the
/// normalizer reads. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DistPlan {
    /// Tag being announced, used verbatim as the record version.
    pub announcement_tag: String,
    /// Release notes body; may embed the release download URL template.
    #[serde(default)]
    pub announcement_github_body: Option<String>,
    #[serde(default)]
    pub releases: Vec<DistRelease>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DistRelease {
    pub app_name: String,
    /// Artifact file names produced for this app.
    #[serde(default)]
    pub artifacts: Vec<String>,
}

impl DistPlan {
    /// The release entry for `app_name`, if any.
    pub fn release(&self, app_name: &str) -> Option<&DistRelease> {
        self.releases.iter().find(|r| r.app_name == app_name)
    }
}

pub fn parse_plan_str(input: &str) -> Result<DistPlan, SchemaError> {
    serde_json::from_str(input).map_err(SchemaError::Plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dist_plan_subset() {
        let input = r###"{
            "dist_version": "0.22.1",
            "announcement_tag": "0.5.0",
            "announcement_github_body": "## Install\n\ncurl https://github.com/astral-sh/uv/releases/download/0.5.0/uv-installer.sh | sh",
            "releases": [
                {
                    "app_name": "uv",
                    "app_version": "0.5.0",
                    "artifacts": ["uv-installer.sh", "uv-aarch64-apple-darwin.tar.gz"]
                }
            ],
            "artifacts": {}
        }"###;
        let plan = parse_plan_str(input).unwrap();
        assert_eq!(plan.announcement_tag, "0.5.0");
        assert!(plan.announcement_github_body.unwrap().contains("releases/download"));
        assert_eq!(plan.releases.len(), 1);
        assert_eq!(plan.releases[0].artifacts.len(), 2);
    }

    #[test]
    fn missing_releases_is_empty() {
        let plan = parse_plan_str(r#"{"announcement_tag": "v1"}"#).unwrap();
        assert!(plan.releases.is_empty());
        assert!(plan.announcement_github_body.is_none());
    }

    #[test]
    fn null_body_is_none() {
        let plan =
            parse_plan_str(r#"{"announcement_tag": "v1", "announcement_github_body": null}"#)
                .unwrap();
        assert!(plan.announcement_github_body.is_none());
    }

    #[test]
    fn release_lookup_by_app_name() {
        let plan = parse_plan_str(
            r#"{"announcement_tag": "v1", "releases": [
                {"app_name": "ruff", "artifacts": []},
                {"app_name": "uv", "artifacts": ["uv-x.zip"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(plan.release("uv").unwrap().artifacts, vec!["uv-x.zip"]);
        assert!(plan.release("ty").is_none());
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_plan_str("{not json").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse release manifest"));
    }

    #[test]
    fn rejects_missing_tag() {
        assert!(parse_plan_str(r#"{"releases": []}"#).is_err());
    }
}
