//! Stats command handler

use anyhow::Result;

use shelf_core::{BookStore, Config, FileSlots};

use crate::output::{format_file_size, Output, OutputFormat};

/// Show catalog statistics and where the data lives
pub fn show(store: &BookStore<FileSlots>, config: &Config, output: &Output) -> Result<()> {
    let books = store.get_all()?;
    let with_isbn = books.iter().filter(|b| !b.isbn.trim().is_empty()).count();
    let size = store.slots().total_size();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "books": books.len(),
                    "with_isbn": with_isbn,
                    "storage": {
                        "location": store.slots().dir(),
                        "size": size
                    },
                    "export": {
                        "header_style": config.header_style.to_string(),
                        "prefix": config.export_prefix
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", books.len());
        }
        OutputFormat::Human => {
            println!("SHELF Stats");
            println!("===========");
            println!();
            println!("Catalog:");
            println!("  Books:     {}", books.len());
            println!("  With ISBN: {}", with_isbn);
            println!();
            println!("Storage:");
            println!("  Location: {}", store.slots().dir().display());
            println!("  Size:     {}", format_file_size(size));
            println!();
            println!("Export:");
            println!("  Header style: {}", config.header_style);
            println!("  File prefix:  {}", config.export_prefix);
        }
    }

    Ok(())
}
