//! In-memory tabular data for one active sheet.

use crate::cell::{CellValue, canonical_string};
use crate::error::{ModelError, Result};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One sheet of a workbook, loaded fully into memory.
///
/// The header row is kept as raw cells in their original column positions so
/// that data access stays aligned even when some header cells are empty.
/// Rows may be shorter or longer than the header row; reading past the end of
/// a row yields [`CellValue::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    sheet_names: Vec<String>,
    sheet_name: String,
    header_row: Vec<CellValue>,
    rows: Vec<Vec<CellValue>>,
}

/// A visible header with its position in the original layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub position: usize,
}

impl TabularDataset {
    /// Build a dataset for `sheet_name`, which must be one of `sheet_names`.
    pub fn new(
        sheet_names: Vec<String>,
        sheet_name: impl Into<String>,
        header_row: Vec<CellValue>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let sheet_name = sheet_name.into();
        if sheet_names.is_empty() {
            return Err(ModelError::NoSheets);
        }
        if !sheet_names.contains(&sheet_name) {
            return Err(ModelError::UnknownSheet {
                sheet: sheet_name,
                available: sheet_names,
            });
        }
        Ok(Self {
            sheet_names,
            sheet_name,
            header_row,
            rows,
        })
    }

    /// Single-sheet dataset, mostly useful for CSV input and tests.
    pub fn single_sheet(
        sheet_name: impl Into<String>,
        header_row: Vec<CellValue>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        let sheet_name = sheet_name.into();
        Self {
            sheet_names: vec![sheet_name.clone()],
            sheet_name,
            header_row,
            rows,
        }
    }

    /// Same sheet metadata and headers with replacement data rows.
    pub fn with_rows(&self, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            sheet_names: self.sheet_names.clone(),
            sheet_name: self.sheet_name.clone(),
            header_row: self.header_row.clone(),
            rows,
        }
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn header_row(&self) -> &[CellValue] {
        &self.header_row
    }

    /// Non-empty header cells in order, canonically stringified.
    ///
    /// Names are not necessarily unique.
    pub fn headers(&self) -> Vec<String> {
        self.visible_headers().into_iter().map(|h| h.name).collect()
    }

    /// Non-empty header cells with their original column positions.
    pub fn visible_headers(&self) -> Vec<Header> {
        self.header_row
            .iter()
            .enumerate()
            .filter_map(|(position, cell)| {
                let name = canonical_string(cell)?;
                if name.is_empty() {
                    return None;
                }
                Some(Header {
                    name: name.into_owned(),
                    position,
                })
            })
            .collect()
    }

    /// Position of the first header exactly equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.header_row
            .iter()
            .position(|cell| canonical_string(cell).is_some_and(|header| header == name))
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at a data row and column position; out-of-range reads are empty.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// All cells of one column position, one per data row.
    pub fn column_cells(&self, column: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows
            .iter()
            .map(move |cells| cells.get(column).unwrap_or(&EMPTY_CELL))
    }

    /// Widest row, header included.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header_row.len()))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TabularDataset {
        TabularDataset::single_sheet(
            "Staff",
            vec![
                CellValue::text("Name"),
                CellValue::Empty,
                CellValue::text("Dept"),
                CellValue::text("Dept"),
            ],
            vec![
                vec![CellValue::text("Ana"), CellValue::Empty, CellValue::text("HR")],
                vec![CellValue::text("Bo")],
            ],
        )
    }

    #[test]
    fn visible_headers_skip_empty_cells() {
        let dataset = sample();
        assert_eq!(dataset.headers(), vec!["Name", "Dept", "Dept"]);
        let positions: Vec<usize> = dataset
            .visible_headers()
            .iter()
            .map(|h| h.position)
            .collect();
        assert_eq!(positions, vec![0, 2, 3]);
    }

    #[test]
    fn first_matching_header_wins() {
        let dataset = sample();
        assert_eq!(dataset.column_index("Dept"), Some(2));
        assert_eq!(dataset.column_index("dept"), None);
        assert_eq!(dataset.column_index(""), None);
    }

    #[test]
    fn short_rows_read_as_empty() {
        let dataset = sample();
        assert_eq!(dataset.cell(1, 2), &CellValue::Empty);
        assert_eq!(dataset.cell(9, 0), &CellValue::Empty);
        let column: Vec<_> = dataset.column_cells(2).cloned().collect();
        assert_eq!(column, vec![CellValue::text("HR"), CellValue::Empty]);
    }

    #[test]
    fn numeric_headers_are_stringified() {
        let dataset = TabularDataset::single_sheet(
            "Sheet1",
            vec![CellValue::Number(2024.0), CellValue::Bool(true)],
            vec![],
        );
        assert_eq!(dataset.headers(), vec!["2024", "true"]);
        assert_eq!(dataset.column_index("2024"), Some(0));
    }

    #[test]
    fn unknown_active_sheet_is_rejected() {
        let error = TabularDataset::new(vec!["A".into()], "B", vec![], vec![])
            .expect_err("sheet B is not listed");
        assert_eq!(
            error,
            ModelError::UnknownSheet {
                sheet: "B".into(),
                available: vec!["A".into()],
            }
        );
        assert_eq!(
            TabularDataset::new(vec![], "A", vec![], vec![]).expect_err("no sheets"),
            ModelError::NoSheets
        );
    }

    #[test]
    fn with_rows_keeps_layout() {
        let dataset = sample();
        let replaced = dataset.with_rows(vec![vec![CellValue::text("Cy")]]);
        assert_eq!(replaced.header_row(), dataset.header_row());
        assert_eq!(replaced.sheet_name(), "Staff");
        assert_eq!(replaced.row_count(), 1);
        assert_eq!(dataset.width(), 4);
    }
}
