pub mod completions;
pub mod convert;
pub mod insert;
pub mod man_pages;
pub mod verify;

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INPUT_ERROR: u8 = 2;
pub const EXIT_SCHEMA_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Stdin is attached to a terminal, so nothing is being piped in.
pub fn stdin_is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Spinner on stderr. Hidden when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_status(clean: bool) -> String {
    use console::Style;
    if clean {
        Style::new().green().apply_to("ok").to_string()
    } else {
        Style::new().red().bold().apply_to("FAIL").to_string()
    }
}

pub fn dim(text: &str) -> String {
    console::Style::new().dim().apply_to(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_pretty_serializes_object() {
        let val = serde_json::json!({"ledger": "v1/uv.ndjson", "inserted": 1});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"ledger\""));
        assert!(result.contains('\n'));
    }

    #[test]
    fn colorize_status_keeps_label() {
        assert!(colorize_status(true).contains("ok"));
        assert!(colorize_status(false).contains("FAIL"));
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_FAILURE, EXIT_INPUT_ERROR, EXIT_SCHEMA_ERROR];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
