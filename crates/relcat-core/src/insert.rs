use crate::CoreError;
use relcat_schema::{parse_record, SchemaError, VersionRecord};
use relcat_store::{InsertResult, LedgerStore};
use serde_json::Value;
use std::collections::HashMap;
use std::io::BufRead;

/// A validated record together with the input line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRecord {
    pub line: usize,
    pub record: VersionRecord,
}

/// Read NDJSON version records, failing on the first bad line.
///
/// Blank lines are skipped. Every other line must be a JSON object that passes
/// the schema gate, and no two lines may carry the same version. Line numbers
/// in errors are 1-based.
pub fn parse_incoming<R: BufRead>(reader: R) -> Result<Vec<IncomingRecord>, CoreError> {
    let mut records = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (idx, bytes) in reader.split(b'\n').enumerate() {
        let line_no = idx + 1;
        let bytes = bytes?;
        let line = std::str::from_utf8(&bytes).map_err(|e| CoreError::MalformedInput {
            line: line_no,
            message: format!("not UTF-8: {e}"),
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value =
            serde_json::from_str(line).map_err(|e| CoreError::MalformedInput {
                line: line_no,
                message: e.to_string(),
            })?;
        if !value.is_object() {
            return Err(CoreError::MalformedInput {
                line: line_no,
                message: "expected a JSON object".to_owned(),
            });
        }

        let record = parse_record(value).map_err(|e| match e {
            SchemaError::Violations(violations) => CoreError::SchemaViolation {
                line: line_no,
                violations,
            },
            other => CoreError::Schema(other),
        })?;

        if let Some(&first_line) = seen.get(&record.version) {
            return Err(CoreError::DuplicateVersion {
                version: record.version,
                first_line,
                line: line_no,
            });
        }
        seen.insert(record.version.clone(), line_no);
        records.push(IncomingRecord {
            line: line_no,
            record,
        });
    }

    if records.is_empty() {
        return Err(CoreError::NoInput("no versions provided on stdin".to_owned()));
    }
    Ok(records)
}

/// Merge `incoming` into the ledger of project `name`, newest first.
pub fn insert_versions(
    store: &LedgerStore,
    name: &str,
    incoming: Vec<IncomingRecord>,
) -> Result<InsertResult, CoreError> {
    let records: Vec<VersionRecord> = incoming.into_iter().map(|r| r.record).collect();
    let result = store.insert(name, records)?;
    tracing::debug!(
        "{name}: {} inserted, {} replaced, {} total",
        result.outcome.inserted,
        result.outcome.replaced,
        result.total
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relcat_store::CatalogLayout;
    use std::io::Cursor;

    const V1: &str = r#"{"version":"1.0.0","date":"2024-01-01T00:00:00Z","artifacts":[{"platform":"linux","variant":"default","url":"https://x/1","archive_format":"tar.gz","sha256":"aa"}]}"#;
    const V2: &str = r#"{"version":"2.0.0","date":"2024-02-01T00:00:00Z","artifacts":[{"platform":"mac","variant":"default","url":"https://x/2","archive_format":"zip","sha256":"bb"}]}"#;

    fn parse(input: &str) -> Result<Vec<IncomingRecord>, CoreError> {
        parse_incoming(Cursor::new(input))
    }

    #[test]
    fn parses_records_and_skips_blank_lines() {
        let records = parse(&format!("\n{V2}\n   \n{V1}\n")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].record.version, "2.0.0");
        assert_eq!(records[1].line, 4);
    }

    #[test]
    fn empty_input_is_no_input() {
        assert!(matches!(parse("").unwrap_err(), CoreError::NoInput(_)));
        assert!(matches!(parse("\n  \n").unwrap_err(), CoreError::NoInput(_)));
    }

    #[test]
    fn invalid_json_names_line() {
        let err = parse(&format!("{V1}\n{{not json\n")).unwrap_err();
        match err {
            CoreError::MalformedInput { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_utf8_line_is_malformed_with_line_number() {
        let mut input = format!("{V1}\n").into_bytes();
        input.extend_from_slice(b"\xff\xfe{\n");
        let err = parse_incoming(Cursor::new(input)).unwrap_err();
        match err {
            CoreError::MalformedInput { line, message } => {
                assert_eq!(line, 2);
                assert!(message.starts_with("not UTF-8"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let records = parse(&format!("{V2}\r\n{V1}\r\n")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn non_object_is_malformed() {
        let err = parse("[1, 2]\n").unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn schema_violations_are_aggregated() {
        let line = r#"{"version":"1.0.0","date":"d","artifacts":[{"platform":"p","variant":"v","archive_format":"zip"},{"platform":"p","variant":"v","url":"u","archive_format":"rar","sha256":"s"}]}"#;
        let err = parse(line).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"schema violation on line 1: artifact[0]: missing keys ["sha256", "url"]; artifact[1]: invalid archive_format "rar""#
        );
    }

    #[test]
    fn duplicate_version_in_batch() {
        let err = parse(&format!("{V1}\n{V2}\n{V1}\n")).unwrap_err();
        match err {
            CoreError::DuplicateVersion {
                version,
                first_line,
                line,
            } => {
                assert_eq!(version, "1.0.0");
                assert_eq!(first_line, 1);
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn insert_writes_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(CatalogLayout::new(dir.path().join("v1")));
        let result = insert_versions(&store, "uv", parse(V1).unwrap()).unwrap();
        assert_eq!(result.outcome.inserted, 1);
        assert_eq!(result.total, 1);
        let content = std::fs::read_to_string(dir.path().join("v1/uv.ndjson")).unwrap();
        assert_eq!(content, format!("{V1}\n"));
    }

    #[test]
    fn insert_rejects_bad_project_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(CatalogLayout::new(dir.path()));
        let err = insert_versions(&store, "../escape", parse(V1).unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("store error: invalid project name"));
    }
}
