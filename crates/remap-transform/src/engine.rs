//! Full-pass transformation of one column.

use remap_map::MappingRuleStore;
use remap_model::{CellValue, TabularDataset, TransformStats, canonical_string};
use serde::Serialize;
use tracing::{debug, info_span};

use crate::error::{Result, TransformError};

/// Decision for a single cell of the target column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcome {
    /// A rule matched and the cell gets the target value.
    Transformed,
    /// The cell has a value but no rule for it.
    Unchanged,
    /// The cell is empty; it is copied and not counted.
    Absent,
}

/// Classify a cell and return its replacement when a rule matches.
pub fn classify_cell<'a>(
    cell: &CellValue,
    store: &'a MappingRuleStore,
) -> (RowOutcome, Option<&'a str>) {
    let Some(key) = canonical_string(cell) else {
        return (RowOutcome::Absent, None);
    };
    match store.lookup(&key) {
        Some(target) => (RowOutcome::Transformed, Some(target)),
        None => (RowOutcome::Unchanged, None),
    }
}

/// Resolve a column by name to its first matching header position.
pub fn resolve_column(dataset: &TabularDataset, column: &str) -> Result<usize> {
    dataset
        .column_index(column)
        .ok_or_else(|| TransformError::ColumnNotFound {
            column: column.to_string(),
        })
}

/// Apply the store's rules to every row of `column`.
///
/// Returns a new dataset with the same layout and the per-row counters. The
/// input dataset is not modified.
pub fn transform(
    dataset: &TabularDataset,
    column: &str,
    store: &MappingRuleStore,
) -> Result<(TabularDataset, TransformStats)> {
    let position = resolve_column(dataset, column)?;
    let _span = info_span!("transform", column = %column, position).entered();

    let mut stats = TransformStats::default();
    let rows = dataset
        .rows()
        .iter()
        .map(|row| {
            let cell = row.get(position).unwrap_or(&CellValue::Empty);
            match classify_cell(cell, store) {
                (RowOutcome::Transformed, Some(target)) => {
                    stats.record_transformed();
                    replace_at(row, position, CellValue::text(target))
                }
                (RowOutcome::Absent, _) => {
                    stats.record_absent();
                    row.clone()
                }
                _ => {
                    stats.record_skipped();
                    row.clone()
                }
            }
        })
        .collect();

    debug!(
        total = stats.total_rows,
        transformed = stats.transformed_rows,
        skipped = stats.skipped_rows,
        absent = stats.absent_rows,
        "transformed column"
    );
    Ok((dataset.with_rows(rows), stats))
}

fn replace_at(row: &[CellValue], position: usize, value: CellValue) -> Vec<CellValue> {
    let mut cells = row.to_vec();
    cells[position] = value;
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept_dataset() -> TabularDataset {
        TabularDataset::single_sheet(
            "Sheet1",
            vec![CellValue::text("Dept")],
            vec![
                vec![CellValue::text("HR")],
                vec![CellValue::text("ENG")],
                vec![CellValue::Empty],
                vec![CellValue::text("HR")],
            ],
        )
    }

    #[test]
    fn dept_scenario() {
        let mut store = MappingRuleStore::new();
        store.upsert_manual("HR", "Human Resources");

        let (output, stats) = transform(&dept_dataset(), "Dept", &store).expect("transform");
        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.transformed_rows, 2);
        assert_eq!(stats.skipped_rows, 1);
        assert_eq!(stats.absent_rows, 1);
        assert_eq!(
            output.rows(),
            &[
                vec![CellValue::text("Human Resources")],
                vec![CellValue::text("ENG")],
                vec![CellValue::Empty],
                vec![CellValue::text("Human Resources")],
            ]
        );
    }

    #[test]
    fn short_rows_count_as_absent() {
        let dataset = TabularDataset::single_sheet(
            "Sheet1",
            vec![CellValue::text("Name"), CellValue::text("Dept")],
            vec![vec![CellValue::text("Ana")], vec![]],
        );
        let mut store = MappingRuleStore::new();
        store.upsert_manual("HR", "Human Resources");

        let (output, stats) = transform(&dataset, "Dept", &store).expect("transform");
        assert_eq!(stats.total_rows, 0);
        assert_eq!(stats.absent_rows, 2);
        assert_eq!(output.rows(), dataset.rows());
    }

    #[test]
    fn numbers_match_canonical_keys() {
        let dataset = TabularDataset::single_sheet(
            "Sheet1",
            vec![CellValue::text("Grade")],
            vec![vec![CellValue::Number(3.0)], vec![CellValue::Bool(true)]],
        );
        let mut store = MappingRuleStore::new();
        store.upsert_manual("3", "three");
        store.upsert_manual("true", "yes");

        let (output, stats) = transform(&dataset, "Grade", &store).expect("transform");
        assert_eq!(stats.transformed_rows, 2);
        assert_eq!(output.cell(0, 0), &CellValue::text("three"));
        assert_eq!(output.cell(1, 0), &CellValue::text("yes"));
    }

    #[test]
    fn empty_string_is_counted_and_can_match() {
        let dataset = TabularDataset::single_sheet(
            "Sheet1",
            vec![CellValue::text("Dept")],
            vec![vec![CellValue::text("")], vec![CellValue::text("")]],
        );
        let store = MappingRuleStore::new();
        let (_, stats) = transform(&dataset, "Dept", &store).expect("transform");
        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.skipped_rows, 2);

        let mut store = MappingRuleStore::new();
        store.upsert_manual("", "Unknown");
        let (output, stats) = transform(&dataset, "Dept", &store).expect("transform");
        assert_eq!(stats.transformed_rows, 2);
        assert_eq!(output.cell(0, 0), &CellValue::text("Unknown"));
    }

    #[test]
    fn unknown_column_fails() {
        let err = transform(&dept_dataset(), "Team", &MappingRuleStore::new())
            .expect_err("no Team column");
        assert_eq!(
            err,
            TransformError::ColumnNotFound {
                column: "Team".to_string()
            }
        );
    }
}
