use super::EXIT_SUCCESS;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;

const BIN_NAME: &str = "relcat";

/// Completion script for `shell`, generated from the command definition.
pub fn script<C: CommandFactory>(shell: Shell) -> Result<String, String> {
    let mut cmd = C::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut buf);
    String::from_utf8(buf).map_err(|e| format!("{shell} completions are not UTF-8: {e}"))
}

pub fn run<C: CommandFactory>(shell: Shell) -> Result<u8, String> {
    let script = script::<C>(shell)?;
    tracing::debug!("generated {} bytes of {shell} completions", script.len());
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(script.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| format!("failed to write completions: {e}"))?;
    Ok(EXIT_SUCCESS)
}
