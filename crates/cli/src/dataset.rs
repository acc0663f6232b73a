//! CSV → Dataset loading.
//!
//! First line is the header. A column whose non-empty cells all parse as
//! numbers is a Measure; anything else is a Category. Each row gets a
//! `row-<n>` cross-filter token (1-based, data rows only).

use std::path::Path;

use binchart_core::{Cell, Column, ColumnRole};
use binchart_engine::{CrossFilterRef, Dataset, Row};

use crate::CliError;

pub fn load_csv(path: &Path, delimiter: u8) -> Result<Dataset, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("{}: {e}", path.display())))?;
    parse_csv(&content, delimiter)
}

pub fn parse_csv(content: &str, delimiter: u8) -> Result<Dataset, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CliError::parse(format!("CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(CliError::parse("CSV has no header row"));
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| CliError::parse(format!("CSV parse error at row {}: {e}", i + 1)))?;
        // Short rows pad with nulls, long rows are cut to the header width.
        let cells = (0..headers.len())
            .map(|c| record.get(c).map_or(Cell::Null, Cell::from_input))
            .collect();
        rows.push(Row {
            cells,
            cross_filter_ref: CrossFilterRef::new(format!("row-{}", i + 1)),
        });
    }

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(ordinal, name)| {
            let role = detect_role(&rows, ordinal);
            Column::new(name, role, ordinal)
        })
        .collect();

    tracing::debug!("loaded {} rows from CSV", rows.len());
    Ok(Dataset { columns, rows })
}

fn detect_role(rows: &[Row], ordinal: usize) -> ColumnRole {
    let mut saw_number = false;
    for row in rows {
        match row.cells.get(ordinal) {
            Some(Cell::Number(_)) => saw_number = true,
            Some(Cell::Text(_)) => return ColumnRole::Category,
            Some(Cell::Null) | None => {}
        }
    }
    if saw_number {
        ColumnRole::Measure
    } else {
        ColumnRole::Category
    }
}
