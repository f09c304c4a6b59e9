use super::{colorize_status, dim, json_pretty, EXIT_FAILURE, EXIT_SUCCESS};
use relcat_store::{verify_ledger, CatalogLayout, LedgerReport};
use std::path::Path;

pub fn run(name: Option<&str>, output: &Path, json: bool) -> Result<u8, String> {
    let layout = CatalogLayout::new(output);
    let names = match name {
        Some(n) => vec![n.to_owned()],
        None => layout.list_projects().map_err(|e| e.to_string())?,
    };
    if names.is_empty() {
        return Err(format!("no ledgers found in {}", output.display()));
    }

    let mut reports: Vec<LedgerReport> = Vec::with_capacity(names.len());
    for n in &names {
        let path = layout.ledger_path(n).map_err(|e| e.to_string())?;
        reports.push(verify_ledger(&path).map_err(|e| e.to_string())?);
    }

    if json {
        println!("{}", json_pretty(&reports)?);
    } else {
        for report in &reports {
            println!(
                "{} {}: {}/{} records passed",
                colorize_status(report.is_clean()),
                report.ledger.display(),
                report.passed,
                report.checked
            );
            for issue in &report.issues {
                println!("  {} {}", dim(&format!("line {}:", issue.line)), issue.reason);
            }
        }
    }

    if reports.iter().all(LedgerReport::is_clean) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILURE)
    }
}
