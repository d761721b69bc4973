use anyhow::Result;
use console::style;
use std::io::{self, Write};

/// Write one line to stdout; a closed pipe (`meme list | head`) is not an error
pub(crate) fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

pub(crate) fn heading(text: &str) -> String {
    style(text).bold().to_string()
}

pub(crate) fn ok(text: &str) -> String {
    style(text).green().to_string()
}

pub(crate) fn warn(text: &str) -> String {
    style(text).yellow().to_string()
}

pub(crate) fn fail(text: &str) -> String {
    style(text).red().to_string()
}

pub(crate) fn dim(text: &str) -> String {
    style(text).dim().to_string()
}

/// Footer printed after every dry run
pub(crate) fn dry_run_hint(confirm_command: &str) -> Result<()> {
    print_stdout("")?;
    print_stdout(&warn("Dry run: nothing was changed."))?;
    print_stdout(&format!(
        "To apply these changes, run: {}",
        style(confirm_command).cyan()
    ))
}
