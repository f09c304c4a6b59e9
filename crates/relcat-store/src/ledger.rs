use crate::layout::CatalogLayout;
use crate::{fsync_dir, StoreError};
use relcat_schema::VersionRecord;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One line of a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEntry {
    /// A record merged in this session, serialized when the ledger is written.
    Record(VersionRecord),
    /// A line read from disk. It is written back verbatim; `record` is `None`
    /// when the line is valid JSON but not a current version record.
    Stored {
        line: String,
        version: Option<String>,
        record: Option<VersionRecord>,
    },
}

impl LedgerEntry {
    /// Parse one ledger line. Fails only when the line is not JSON at all.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(line)?;
        let version = value
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let record = serde_json::from_value::<VersionRecord>(value).ok();
        Ok(Self::Stored {
            line: line.to_owned(),
            version,
            record,
        })
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Record(r) => Some(r.version.as_str()),
            Self::Stored { version, .. } => version.as_deref(),
        }
    }

    pub fn record(&self) -> Option<&VersionRecord> {
        match self {
            Self::Record(r) => Some(r),
            Self::Stored { record, .. } => record.as_ref(),
        }
    }

    fn to_line(&self) -> Result<String, StoreError> {
        match self {
            Self::Record(r) => Ok(r.to_compact_json()?),
            Self::Stored { line, .. } => Ok(line.clone()),
        }
    }
}

/// Ordered entries of one project ledger, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

/// What a merge did to a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Incoming records now at the head of the ledger.
    pub inserted: usize,
    /// Existing entries dropped because an incoming record had the same version.
    pub replaced: usize,
    /// Existing entries kept after the incoming ones.
    pub retained: usize,
}

impl Ledger {
    pub fn new(records: Vec<VersionRecord>) -> Self {
        Self {
            entries: records.into_iter().map(LedgerEntry::Record).collect(),
        }
    }

    /// Read a ledger file, skipping lines that are not JSON.
    ///
    /// A missing file is an empty ledger. Blank lines are ignored. Lines that
    /// are not UTF-8 JSON are logged and dropped, so they disappear on the
    /// next save. Any other JSON line is kept and written back unchanged,
    /// whether or not it matches the current record shape.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for (idx, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes?;
            let parsed = std::str::from_utf8(&bytes)
                .map_err(|e| e.to_string())
                .and_then(|line| {
                    let line = line.trim();
                    if line.is_empty() {
                        Ok(None)
                    } else {
                        LedgerEntry::parse(line).map(Some).map_err(|e| e.to_string())
                    }
                });
            match parsed {
                Ok(Some(entry)) => {
                    if entry.record().is_none() {
                        tracing::debug!(
                            "keeping off-schema line {} in {} as-is",
                            idx + 1,
                            path.display()
                        );
                    }
                    entries.push(entry);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        "skipping unreadable line {} in {}: {e}",
                        idx + 1,
                        path.display()
                    );
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Entries that decode as current version records, in ledger order.
    pub fn records(&self) -> impl Iterator<Item = &VersionRecord> {
        self.entries.iter().filter_map(LedgerEntry::record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, version: &str) -> Option<&VersionRecord> {
        self.entries
            .iter()
            .find(|e| e.version() == Some(version))
            .and_then(LedgerEntry::record)
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(LedgerEntry::version)
    }

    /// Put `incoming` at the head of the ledger, newest first in supplied
    /// order. Existing entries sharing a version with an incoming record are
    /// dropped; entries without a version are always kept. Artifacts of
    /// incoming records are sorted by `(platform, variant)`.
    ///
    /// Versions within `incoming` are expected to be distinct.
    pub fn merge(&mut self, incoming: Vec<VersionRecord>) -> MergeOutcome {
        let incoming_versions: HashSet<String> =
            incoming.iter().map(|r| r.version.clone()).collect();

        let before = self.entries.len();
        self.entries
            .retain(|e| !e.version().is_some_and(|v| incoming_versions.contains(v)));
        let retained = self.entries.len();

        let inserted = incoming.len();
        let mut merged: Vec<LedgerEntry> = incoming
            .into_iter()
            .map(|mut record| {
                record.sort_artifacts();
                LedgerEntry::Record(record)
            })
            .collect();
        merged.append(&mut self.entries);
        self.entries = merged;

        MergeOutcome {
            inserted,
            replaced: before - retained,
            retained,
        }
    }

    /// Serialize as NDJSON: one entry per line, each newline-terminated.
    pub fn to_ndjson(&self) -> Result<String, StoreError> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_line()?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Replace the file at `path` with this ledger.
    ///
    /// The content goes to a temp file in the same directory which is synced
    /// and renamed over `path`, so readers never observe a partial ledger.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let content = self.to_ndjson()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;
        Ok(())
    }
}

/// Result of inserting records into a project ledger on disk.
#[derive(Debug, Clone, Serialize)]
pub struct InsertResult {
    pub ledger: PathBuf,
    #[serde(flatten)]
    pub outcome: MergeOutcome,
    /// Entries in the ledger after the write.
    pub total: usize,
}

/// Ledger access for every project in a catalog.
pub struct LedgerStore {
    layout: CatalogLayout,
}

impl LedgerStore {
    pub fn new(layout: CatalogLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &CatalogLayout {
        &self.layout
    }

    pub fn load(&self, name: &str) -> Result<Ledger, StoreError> {
        Ledger::load(&self.layout.ledger_path(name)?)
    }

    pub fn save(&self, name: &str, ledger: &Ledger) -> Result<(), StoreError> {
        let path = self.layout.ledger_path(name)?;
        self.layout.initialize()?;
        ledger.save(&path)
    }

    /// Load, merge `incoming` into, and rewrite the ledger of `name`.
    pub fn insert(
        &self,
        name: &str,
        incoming: Vec<VersionRecord>,
    ) -> Result<InsertResult, StoreError> {
        let path = self.layout.ledger_path(name)?;
        self.layout.initialize()?;

        let mut ledger = Ledger::load(&path)?;
        let outcome = ledger.merge(incoming);
        ledger.save(&path)?;
        tracing::debug!(
            "wrote {} entries to {} ({} inserted, {} replaced)",
            ledger.len(),
            path.display(),
            outcome.inserted,
            outcome.replaced
        );

        Ok(InsertResult {
            ledger: path,
            outcome,
            total: ledger.len(),
        })
    }
}
