//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use shelf_core::{Book, BookDraft, Field, ValidationErrors};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
    /// Confirmations are answered yes without asking
    pub assume_yes: bool,
}

impl Output {
    pub fn new(format: OutputFormat, assume_yes: bool) -> Self {
        Self { format, assume_yes }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single book
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", book.id);
                for field in Field::ALL {
                    println!(
                        "{:<8} {}",
                        format!("{}:", field.label()),
                        display_or_dash(book.get(field))
                    );
                }
            }
            OutputFormat::Json => print_json(book),
            OutputFormat::Quiet => {
                println!("{}", book.id);
            }
        }
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for book in books {
                    println!(
                        "{} | {} | {} | {} | {}",
                        book.short_id(),
                        truncate(&book.title, 30),
                        truncate(&book.author, 20),
                        display_or_dash(&book.year),
                        display_or_dash(&book.isbn)
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => print_json(books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print a book the user is about to save, ahead of a confirmation
    pub fn print_pending(&self, heading: &str, book: &BookDraft) {
        if self.format != OutputFormat::Human {
            return;
        }
        println!("{}", heading);
        for field in Field::ALL {
            println!(
                "  {:<8} {}",
                format!("{}:", field.label()),
                display_or_dash(book.get(field))
            );
        }
    }

    /// Print per-field validation errors
    pub fn print_validation_errors(&self, errors: &ValidationErrors) {
        match self.format {
            OutputFormat::Json => {
                let fields: serde_json::Map<String, serde_json::Value> = errors
                    .iter()
                    .map(|(field, msg)| (field.key().to_string(), msg.into()))
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({"status": "invalid", "errors": fields})
                );
            }
            OutputFormat::Human | OutputFormat::Quiet => {
                for (field, msg) in errors.iter() {
                    eprintln!("  {}: {}", field.label(), msg);
                }
            }
        }
    }

    /// Print a one-shot notice left by an earlier command
    pub fn notice(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}\n", message),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"notice": message}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human && !self.assume_yes
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to encode JSON: {}", e),
    }
}

fn display_or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Human-readable size, e.g. "512 Bytes", "1.5 KB"
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
