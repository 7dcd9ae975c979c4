//! Interactive confirmation prompts.

use std::io::{self, BufRead, Write};

/// Ask a yes/no question on stdout and read the answer from stdin.
///
/// Empty or unrecognized input resolves to `default`.
pub fn confirm(message: &str, default: bool) -> io::Result<bool> {
    let suffix = if default { "[Y/n]" } else { "[y/N]" };
    print!("{message} {suffix}: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    Ok(match input.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    })
}
