use relcat_core::{insert_versions, parse_incoming, Normalizer, RelcatConfig};
use relcat_remote::{ChecksumSource, RemoteError};
use relcat_schema::{parse_plan_str, Sha256Digest};
use relcat_store::{verify_ledger, CatalogLayout, Ledger, LedgerStore};
use std::io::Cursor;

/// Serves a fixed digest for every sidecar except those listed as missing.
struct StaticSource {
    missing: Vec<&'static str>,
}

impl ChecksumSource for StaticSource {
    fn fetch_checksum(&self, url: &str) -> Result<Sha256Digest, RemoteError> {
        if self.missing.iter().any(|m| url.ends_with(m)) {
            return Err(RemoteError::NotFound(url.to_owned()));
        }
        let name = url.rsplit('/').next().unwrap_or_default();
        Ok(Sha256Digest::new(format!("{:0>8x}", name.len())))
    }
}

fn plan(version: &str) -> String {
    format!(
        r#"{{
            "announcement_tag": "{version}",
            "announcement_github_body": "Install: https://github.com/astral-sh/uv/releases/download/{version}/uv-installer.sh",
            "releases": [{{
                "app_name": "uv",
                "artifacts": [
                    "uv-x86_64-unknown-linux-gnu.tar.gz",
                    "uv-x86_64-unknown-linux-gnu.tar.gz.sha256",
                    "uv-aarch64-apple-darwin.tar.gz",
                    "uv-x86_64-pc-windows-msvc.zip",
                    "uv-installer.sh",
                    "source.tar.gz",
                    "sha256.sum"
                ]
            }}]
        }}"#
    )
}

fn normalize_line(version: &str, source: &StaticSource) -> String {
    let config = RelcatConfig::default();
    let plan = parse_plan_str(&plan(version)).unwrap();
    let report = Normalizer::new(source, &config).normalize(&plan).unwrap();
    report.record.to_compact_json().unwrap()
}

#[test]
fn normalized_records_merge_newest_first() {
    let source = StaticSource { missing: vec![] };
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::new(CatalogLayout::new(dir.path().join("v1")));

    for version in ["0.1.0", "0.2.0", "0.3.0"] {
        let line = normalize_line(version, &source);
        let incoming = parse_incoming(Cursor::new(line)).unwrap();
        insert_versions(&store, "uv", incoming).unwrap();
    }

    let ledger = store.load("uv").unwrap();
    let versions: Vec<&str> = ledger.versions().collect();
    assert_eq!(versions, vec!["0.3.0", "0.2.0", "0.1.0"]);
    for record in ledger.records() {
        assert_eq!(record.artifacts.len(), 3);
        assert!(record.artifacts_sorted());
    }

    let report = verify_ledger(&dir.path().join("v1/uv.ndjson")).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.passed, 3);
}

#[test]
fn renormalized_version_replaces_existing_entry() {
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::new(CatalogLayout::new(dir.path()));

    let full = StaticSource { missing: vec![] };
    let partial = StaticSource {
        missing: vec!["uv-x86_64-pc-windows-msvc.zip.sha256"],
    };

    let first = normalize_line("1.0.0", &partial);
    insert_versions(&store, "uv", parse_incoming(Cursor::new(first)).unwrap()).unwrap();
    assert_eq!(store.load("uv").unwrap().records().next().unwrap().artifacts.len(), 2);

    let second = normalize_line("1.0.0", &full);
    let result =
        insert_versions(&store, "uv", parse_incoming(Cursor::new(second)).unwrap()).unwrap();
    assert_eq!(result.outcome.replaced, 1);
    assert_eq!(result.total, 1);

    let ledger = Ledger::load(&dir.path().join("uv.ndjson")).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.records().next().unwrap().artifacts.len(), 3);
}

#[test]
fn batch_of_versions_keeps_supplied_order() {
    let source = StaticSource { missing: vec![] };
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::new(CatalogLayout::new(dir.path()));

    let batch = format!(
        "{}\n{}\n",
        normalize_line("2.0.0", &source),
        normalize_line("1.5.0", &source)
    );
    insert_versions(&store, "uv", parse_incoming(Cursor::new(batch)).unwrap()).unwrap();
    let older = normalize_line("1.0.0", &source);
    insert_versions(&store, "uv", parse_incoming(Cursor::new(older)).unwrap()).unwrap();

    let ledger = store.load("uv").unwrap();
    let versions: Vec<&str> = ledger.versions().collect();
    assert_eq!(versions, vec!["1.0.0", "2.0.0", "1.5.0"]);
}
