use super::{json_pretty, stdin_is_interactive, EXIT_SUCCESS};
use relcat_core::{insert_versions, parse_incoming, CoreError};
use relcat_store::{validate_project_name, CatalogLayout, LedgerStore};
use std::path::Path;

pub fn run(name: &str, output: &Path, json: bool) -> Result<u8, String> {
    validate_project_name(name).map_err(|e| e.to_string())?;

    if stdin_is_interactive() {
        return Err(CoreError::NoInput("no versions provided on stdin".to_owned()).to_string());
    }
    let incoming = parse_incoming(std::io::stdin().lock()).map_err(|e| e.to_string())?;
    let first_version = incoming
        .first()
        .map(|r| r.record.version.clone())
        .unwrap_or_default();

    let store = LedgerStore::new(CatalogLayout::new(output));
    let result = insert_versions(&store, name, incoming).map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&result)?);
    } else if result.outcome.inserted == 1 {
        eprintln!(
            "Inserted version {first_version} into {}",
            result.ledger.display()
        );
    } else {
        eprintln!(
            "Inserted {} versions into {}",
            result.outcome.inserted,
            result.ledger.display()
        );
    }
    Ok(EXIT_SUCCESS)
}
