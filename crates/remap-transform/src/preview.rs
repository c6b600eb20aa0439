use remap_map::MappingRuleStore;
use remap_model::{CellValue, TabularDataset};
use serde::Serialize;

use crate::engine::{RowOutcome, classify_cell, resolve_column};
use crate::error::Result;

/// Number of rows shown when no limit is given.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Before/after view of one data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    /// 1-based data row number (the header row is not counted).
    pub row_number: usize,
    pub original: String,
    pub transformed: String,
    pub outcome: RowOutcome,
}

/// Preview the first `limit` data rows of `column` without building a new dataset.
pub fn preview(
    dataset: &TabularDataset,
    column: &str,
    store: &MappingRuleStore,
    limit: usize,
) -> Result<Vec<PreviewRow>> {
    let position = resolve_column(dataset, column)?;
    Ok(dataset
        .column_cells(position)
        .take(limit)
        .enumerate()
        .map(|(index, cell)| preview_row(index + 1, cell, store))
        .collect())
}

fn preview_row(row_number: usize, cell: &CellValue, store: &MappingRuleStore) -> PreviewRow {
    let original = cell.to_string();
    let (outcome, target) = classify_cell(cell, store);
    let transformed = target.map_or_else(|| original.clone(), str::to_string);
    PreviewRow {
        row_number,
        original,
        transformed,
        outcome,
    }
}
