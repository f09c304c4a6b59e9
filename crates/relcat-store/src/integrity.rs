use crate::StoreError;
use relcat_schema::{parse_record, SchemaError};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize)]
pub struct LedgerReport {
    pub ledger: PathBuf,
    /// Non-blank lines examined.
    pub checked: usize,
    pub passed: usize,
    pub issues: Vec<LedgerIssue>,
}

impl LedgerReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerIssue {
    /// 1-based line number in the ledger file.
    pub line: usize,
    pub reason: String,
}

/// Strictly re-read a ledger and report every line that breaks the schema or
/// a ledger invariant.
///
/// Unlike [`Ledger::load`](crate::Ledger::load), nothing is skipped silently:
/// parse failures, schema violations, unsorted artifacts and repeated versions
/// each produce a [`LedgerIssue`].
pub fn verify_ledger(path: &Path) -> Result<LedgerReport, StoreError> {
    if !path.is_file() {
        return Err(StoreError::LedgerNotFound(path.display().to_string()));
    }

    let mut report = LedgerReport {
        ledger: path.to_path_buf(),
        ..Default::default()
    };
    let mut seen: HashMap<String, usize> = HashMap::new();

    let reader = BufReader::new(File::open(path)?);
    for (idx, bytes) in reader.split(b'\n').enumerate() {
        let line_no = idx + 1;
        let bytes = bytes?;
        let Ok(line) = std::str::from_utf8(&bytes) else {
            report.checked += 1;
            report.issues.push(LedgerIssue {
                line: line_no,
                reason: "not UTF-8".to_owned(),
            });
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        report.checked += 1;

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                report.issues.push(LedgerIssue {
                    line: line_no,
                    reason: format!("invalid JSON: {e}"),
                });
                continue;
            }
        };

        let record = match parse_record(value) {
            Ok(r) => r,
            Err(SchemaError::Violations(v)) => {
                report.issues.push(LedgerIssue {
                    line: line_no,
                    reason: v.to_string(),
                });
                continue;
            }
            Err(e) => {
                report.issues.push(LedgerIssue {
                    line: line_no,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let mut clean = true;
        if !record.artifacts_sorted() {
            report.issues.push(LedgerIssue {
                line: line_no,
                reason: "artifacts not sorted by (platform, variant)".to_owned(),
            });
            clean = false;
        }
        if let Some(first) = seen.get(&record.version) {
            report.issues.push(LedgerIssue {
                line: line_no,
                reason: format!(
                    "duplicate version '{}' (first seen on line {first})",
                    record.version
                ),
            });
            clean = false;
        } else {
            seen.insert(record.version.clone(), line_no);
        }

        if clean {
            report.passed += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ledger;
    use relcat_schema::{ArchiveFormat, ArtifactRecord, VersionRecord};
    use std::collections::BTreeMap;
    use std::fs;

    fn record(version: &str, platforms: &[&str]) -> VersionRecord {
        let mut r = VersionRecord::new(version, "2024-01-01T00:00:00Z");
        for p in platforms {
            r.artifacts.push(ArtifactRecord {
                platform: (*p).into(),
                variant: "default".into(),
                url: format!("https://example.com/{p}.zip"),
                archive_format: ArchiveFormat::Zip,
                sha256: "abc123".into(),
                extra: BTreeMap::new(),
            });
        }
        r
    }

    #[test]
    fn clean_ledger_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uv.ndjson");
        Ledger::new(vec![record("1.1.0", &["a", "b"]), record("1.0.0", &["a"])])
            .save(&path)
            .unwrap();

        let report = verify_ledger(&path).unwrap();
        assert_eq!(report.checked, 2);
        assert_eq!(report.passed, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn reports_each_kind_of_issue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uv.ndjson");
        let unsorted = record("3.0.0", &["b", "a"]).to_compact_json().unwrap();
        let ok = record("2.0.0", &["a"]).to_compact_json().unwrap();
        let content = format!(
            "{unsorted}\n{ok}\n{{oops\n{{\"version\":\"\",\"date\":\"d\",\"artifacts\":[]}}\n\n{ok}\n"
        );
        fs::write(&path, content).unwrap();

        let report = verify_ledger(&path).unwrap();
        assert_eq!(report.checked, 5);
        assert_eq!(report.passed, 1);
        let lines: Vec<usize> = report.issues.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![1, 3, 4, 6]);
        assert!(report.issues[0].reason.contains("not sorted"));
        assert!(report.issues[1].reason.starts_with("invalid JSON"));
        assert!(report.issues[2].reason.contains("missing or empty 'version'"));
        assert!(report.issues[3].reason.contains("first seen on line 2"));
    }

    #[test]
    fn non_utf8_line_is_an_issue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uv.ndjson");
        let mut content = record("1.0.0", &["a"]).to_compact_json().unwrap().into_bytes();
        content.extend_from_slice(b"\n\xff\xfe\n");
        fs::write(&path, content).unwrap();

        let report = verify_ledger(&path).unwrap();
        assert_eq!(report.checked, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.issues[0].line, 2);
        assert_eq!(report.issues[0].reason, "not UTF-8");
    }

    #[test]
    fn missing_ledger_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_ledger(&dir.path().join("none.ndjson")).unwrap_err();
        assert!(matches!(err, StoreError::LedgerNotFound(_)));
    }
}
