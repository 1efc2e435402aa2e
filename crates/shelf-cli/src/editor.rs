//! Interactive prompts
//!
//! Field entry for `add` and `edit`, and yes/no confirmations.

use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};

/// Whether stdin is attached to a terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let input = read_line(&mut io::stdin().lock())?;
    Ok(is_yes(&input))
}

/// Prompt for a value, returning it trimmed (possibly empty)
pub fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    read_line(&mut io::stdin().lock())
}

/// Prompt with a default value, returns None if user keeps default
pub fn prompt_with_default(label: &str, default: &str) -> Result<Option<String>> {
    if default.is_empty() {
        print!("{}: ", label);
    } else {
        print!("{} [{}]: ", label, default);
    }
    io::stdout().flush()?;

    let input = read_line(&mut io::stdin().lock())?;
    if input.is_empty() {
        Ok(None)
    } else {
        Ok(Some(input))
    }
}

fn read_line(reader: &mut impl BufRead) -> Result<String> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        bail!("Input closed before a value was entered");
    }
    Ok(input.trim().to_string())
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_read_line_trims() {
        let mut input = io::Cursor::new("  Kokoro  \nrest");
        assert_eq!(read_line(&mut input).unwrap(), "Kokoro");
    }

    #[test]
    fn test_read_line_eof() {
        let mut input = io::Cursor::new("");
        assert!(read_line(&mut input).is_err());
    }
}
