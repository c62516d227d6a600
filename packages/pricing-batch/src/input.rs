//! CSV input reading.
//!
//! The input file needs a header row with at least `name` and `website`
//! columns. Rows with a missing website column still become items - the
//! batch runner records those as failures without touching the network.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use pricing_extraction::BatchItem;

/// Read batch items from a CSV file.
pub fn read_items(path: &Path) -> Result<Vec<BatchItem>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;

    let mut lines = content.lines();
    let header = lines.next().context("Input file is empty")?;
    let columns = parse_row(header);

    let name_idx = find_column(&columns, "name")
        .context("Input file has no 'name' column")?;
    let website_idx = find_column(&columns, "website")
        .context("Input file has no 'website' column")?;

    let mut items = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = parse_row(line);
        let name = fields.get(name_idx).cloned().unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let website = fields.get(website_idx).cloned().unwrap_or_default();
        items.push(BatchItem::new(name, website));
    }

    if items.is_empty() {
        bail!("No items in input file {}", path.display());
    }

    Ok(items)
}

fn find_column(columns: &[String], name: &str) -> Option<usize> {
    columns
        .iter()
        .position(|c| c.trim().eq_ignore_ascii_case(name))
}

/// Split one CSV row, honoring double-quoted fields.
fn parse_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // Escaped quote
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}
