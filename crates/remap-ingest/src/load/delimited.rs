//! CSV reading. A CSV file is a workbook with one sheet named after the file.

use std::path::Path;

use remap_model::{CellValue, TabularDataset};

use crate::error::{IngestError, Result};

use super::split_header;

/// Sheet name used for a CSV file: its stem, or `Sheet1` when it has none.
pub(super) fn csv_sheet_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("Sheet1")
        .to_string()
}

/// Read every record as text. Empty fields are absent cells.
pub(super) fn read_csv(path: &Path) -> Result<TabularDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::parse(path, e))?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::parse(path, e))?;
        let cells: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::text(field)
                }
            })
            .collect();
        grid.push(cells);
    }

    let (header_row, rows) = split_header(grid);
    Ok(TabularDataset::single_sheet(
        csv_sheet_name(path),
        header_row,
        rows,
    ))
}
