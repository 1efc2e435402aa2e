//! CSV import and export handlers

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use tracing::{info, warn};

use shelf_core::csv_bridge::{books_to_csv, columns, drafts_from_csv, filter_rows, parse};
use shelf_core::{validate_draft_now, BookStore, Config, SlotStore};

use crate::editor::confirm;
use crate::output::{format_file_size, Output, OutputFormat};

/// Replace the catalog with the books in a CSV file
///
/// Rows are stored as read. With `strict`, every row must pass the same
/// validation as `add` or nothing is imported.
pub fn import<S: SlotStore>(
    store: &mut BookStore<S>,
    file: PathBuf,
    strict: bool,
    output: &Output,
) -> Result<()> {
    import_with(store, file, strict, output, confirm)
}

fn import_with<S: SlotStore>(
    store: &mut BookStore<S>,
    file: PathBuf,
    strict: bool,
    output: &Output,
    confirm: impl FnOnce(&str) -> Result<bool>,
) -> Result<()> {
    let (text, size) = read_csv_file(&file)?;

    let drafts = drafts_from_csv(&text)
        .with_context(|| format!("Failed to parse CSV file: {:?}", file))?;

    let invalid: Vec<(usize, String)> = drafts
        .iter()
        .enumerate()
        .filter_map(|(i, draft)| {
            validate_draft_now(draft)
                .err()
                .map(|errors| (i + 1, errors.to_string()))
        })
        .collect();

    if strict && !invalid.is_empty() {
        for (row, errors) in &invalid {
            eprintln!("  Row {}: {}", row, errors);
        }
        bail!(
            "Import aborted: {} of {} row(s) are invalid; nothing was imported",
            invalid.len(),
            drafts.len()
        );
    }

    if output.should_prompt() {
        println!(
            "Import {} book(s) from {}? Existing data will be overwritten ({} book(s)).",
            drafts.len(),
            display_name(&file),
            store.count()?
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let imported = store.import_all(drafts).context("Failed to import books")?;
    info!(count = imported.len(), file = ?file, "Imported CSV");

    output.success(&format!(
        "Imported {} book(s) from {} ({})",
        imported.len(),
        display_name(&file),
        format_file_size(size)
    ));
    if !invalid.is_empty() {
        warn!(count = invalid.len(), "Imported rows that fail validation");
        output.message(&format!(
            "{} row(s) did not pass validation; fix them with `shelf edit`",
            invalid.len()
        ));
    }

    Ok(())
}

/// Write the catalog to a CSV file
///
/// Defaults to `{export_dir}/{export_prefix}_YYYY-MM-DD.csv` for today.
pub fn export<S: SlotStore>(
    store: &BookStore<S>,
    config: &Config,
    path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let books = store.get_all()?;
    let path = path.unwrap_or_else(|| config.export_path(Local::now().date_naive()));

    let csv = books_to_csv(&books, config.header_style).context("Failed to build CSV")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    fs::write(&path, csv).with_context(|| format!("Failed to write file: {:?}", path))?;
    info!(count = books.len(), path = ?path, "Exported CSV");

    if output.is_quiet() {
        println!("{}", path.display());
    } else {
        output.success(&format!(
            "Exported {} book(s) to {}",
            books.len(),
            path.display()
        ));
    }

    Ok(())
}

/// Show the rows of a CSV file without importing it
///
/// Prints every row with its 1-based number, or only the rows with `filter`
/// in any cell, followed by the row and column counts.
pub fn view(file: PathBuf, filter: Option<String>, output: &Output) -> Result<()> {
    let (text, size) = read_csv_file(&file)?;
    let rows = parse(&text).with_context(|| format!("Failed to parse CSV file: {:?}", file))?;
    let headers = columns(&rows);
    let shown = filter_rows(&rows, filter.as_deref().unwrap_or(""));

    match output.format {
        OutputFormat::Json => {
            let records: Vec<_> = shown
                .iter()
                .map(|(number, row)| serde_json::json!({"row": number, "cells": row}))
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "file": display_name(&file),
                    "size": size,
                    "rows": rows.len(),
                    "columns": headers,
                    "matches": filter.as_ref().map(|_| shown.len()),
                    "records": records
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", shown.len());
        }
        OutputFormat::Human => {
            println!("File: {} ({})", display_name(&file), format_file_size(size));
            println!();
            if rows.is_empty() {
                println!("No rows found.");
            } else {
                println!("# | {}", headers.join(" | "));
                for (number, row) in &shown {
                    let cells: Vec<&str> = row.values().map(String::as_str).collect();
                    println!("{} | {}", number, cells.join(" | "));
                }
            }
            println!();
            println!("Rows: {}  Columns: {}", rows.len(), headers.len());
            if filter.as_deref().is_some_and(|q| !q.trim().is_empty()) {
                println!("Matches: {}", shown.len());
            }
        }
    }

    Ok(())
}

/// Read a whole CSV file as UTF-8, returning the text and its size in bytes
fn read_csv_file(file: &Path) -> Result<(String, u64)> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read file: {:?}", file))?;
    let size = bytes.len() as u64;
    let text =
        String::from_utf8(bytes).with_context(|| format!("File is not valid UTF-8: {:?}", file))?;
    Ok((text, size))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
