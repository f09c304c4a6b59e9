use crate::CoreError;
use relcat_remote::FetchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";
pub const DEFAULT_ORG: &str = "astral-sh";

/// Settings shared by the relcat tools, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RelcatConfig {
    /// Scheme and host that release downloads are served from.
    pub download_base: String,
    /// Organization used when the manifest does not name one.
    pub default_org: String,
    pub fetch: FetchConfig,
}

impl Default for RelcatConfig {
    fn default() -> Self {
        Self {
            download_base: DEFAULT_DOWNLOAD_BASE.to_owned(),
            default_org: DEFAULT_ORG.to_owned(),
            fetch: FetchConfig::default(),
        }
    }
}

impl RelcatConfig {
    #[must_use]
    pub fn with_download_base(mut self, base: &str) -> Self {
        self.download_base = base.trim_end_matches('/').to_owned();
        self
    }

    /// Load `~/.config/relcat/config.json`, or defaults when it does not exist.
    pub fn load_default() -> Result<Self, CoreError> {
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| CoreError::Config(format!("invalid config {}: {e}", path.display())))?;
        config.download_base = config.download_base.trim_end_matches('/').to_owned();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/relcat/config.json"))
}
