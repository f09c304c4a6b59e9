use crate::StoreError;
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of ledger files, without the dot.
pub const LEDGER_EXTENSION: &str = "ndjson";

/// Directory layout of a catalog: one `<name>.ndjson` ledger per project
/// directly under the root. The root is created lazily on
/// [`initialize`](Self::initialize).
#[derive(Debug, Clone)]
pub struct CatalogLayout {
    root: PathBuf,
}

impl CatalogLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the ledger for `name`. The name is validated first so the path
    /// cannot leave the catalog root.
    pub fn ledger_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_project_name(name)?;
        Ok(self.root.join(format!("{name}.{LEDGER_EXTENSION}")))
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Project names that currently have a ledger, sorted.
    pub fn list_projects(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_project_name(stem).is_ok() {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

pub fn validate_project_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.len() > 128 {
        return Err(StoreError::InvalidName(
            "project name must be 1-128 characters".to_owned(),
        ));
    }
    if name.starts_with('.') {
        return Err(StoreError::InvalidName(
            "project name must not start with '.'".to_owned(),
        ));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(StoreError::InvalidName(
            "project name must match [a-zA-Z0-9._-]".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_path_is_name_with_extension() {
        let layout = CatalogLayout::new("/tmp/relcat-test/v1");
        assert_eq!(
            layout.ledger_path("uv").unwrap(),
            PathBuf::from("/tmp/relcat-test/v1/uv.ndjson")
        );
        assert_eq!(
            layout.ledger_path("python-build-standalone").unwrap(),
            PathBuf::from("/tmp/relcat-test/v1/python-build-standalone.ndjson")
        );
    }

    #[test]
    fn ledger_path_rejects_traversal() {
        let layout = CatalogLayout::new("v1");
        assert!(layout.ledger_path("../etc/passwd").is_err());
        assert!(layout.ledger_path("a/b").is_err());
        assert!(layout.ledger_path("..").is_err());
        assert!(layout.ledger_path("").is_err());
    }

    #[test]
    fn project_names() {
        assert!(validate_project_name("uv").is_ok());
        assert!(validate_project_name("ruff_2.x").is_ok());
        assert!(validate_project_name(".hidden").is_err());
        assert!(validate_project_name("has space").is_err());
        assert!(validate_project_name(&"a".repeat(129)).is_err());
    }

    #[test]
    fn initialize_creates_nested_root() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CatalogLayout::new(dir.path().join("a").join("v1"));
        layout.initialize().unwrap();
        assert!(layout.root().is_dir());
        layout.initialize().unwrap();
    }

    #[test]
    fn list_projects_only_sees_ledgers() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CatalogLayout::new(dir.path());
        fs::write(dir.path().join("uv.ndjson"), "").unwrap();
        fs::write(dir.path().join("ruff.ndjson"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join(".tmp.ndjson"), "").unwrap();
        fs::create_dir(dir.path().join("sub.ndjson")).unwrap();
        assert_eq!(layout.list_projects().unwrap(), vec!["ruff", "uv"]);
    }

    #[test]
    fn list_projects_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CatalogLayout::new(dir.path().join("missing"));
        assert!(layout.list_projects().unwrap().is_empty());
    }
}
