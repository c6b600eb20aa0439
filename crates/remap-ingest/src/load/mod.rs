//! Spreadsheet loading.
//!
//! The first worksheet row is the header row. Rows keep their original column
//! positions; trailing empty cells are trimmed from each row and trailing
//! empty rows are dropped, while empty rows between data rows are kept.

mod delimited;
mod workbook;

use std::path::Path;

use remap_model::{CellValue, SpreadsheetFormat, TabularDataset};
use tracing::info;

use crate::error::{IngestError, Result};

use self::delimited::{csv_sheet_name, read_csv};
use self::workbook::WorkbookSource;

/// Load one sheet of a spreadsheet file.
///
/// `sheet` selects a sheet by exact name; `None` selects the first sheet in
/// file order.
pub fn load_dataset(path: &Path, sheet: Option<&str>) -> Result<TabularDataset> {
    let format = check_input(path)?;
    let dataset = if format.is_workbook() {
        let mut source = WorkbookSource::open(path)?;
        let name = select_sheet(source.sheet_names(), sheet)?;
        source.read_sheet(&name)?
    } else {
        let dataset = read_csv(path)?;
        select_sheet(dataset.sheet_names(), sheet)?;
        dataset
    };
    info!(
        path = %path.display(),
        sheet = %dataset.sheet_name(),
        columns = dataset.headers().len(),
        rows = dataset.row_count(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Load every sheet of a spreadsheet file, in file order.
pub fn load_workbook(path: &Path) -> Result<Vec<TabularDataset>> {
    let format = check_input(path)?;
    if !format.is_workbook() {
        return Ok(vec![read_csv(path)?]);
    }
    let mut source = WorkbookSource::open(path)?;
    let names = source.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in &names {
        sheets.push(source.read_sheet(name)?);
    }
    info!(path = %path.display(), sheets = sheets.len(), "loaded workbook");
    Ok(sheets)
}

/// Sheet names of a spreadsheet file without reading cell data.
pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    let format = check_input(path)?;
    if format.is_workbook() {
        Ok(WorkbookSource::open(path)?.sheet_names().to_vec())
    } else {
        Ok(vec![csv_sheet_name(path)])
    }
}

/// Resolve a requested sheet against the available names.
pub fn select_sheet(available: &[String], requested: Option<&str>) -> Result<String> {
    match requested {
        Some(name) => available
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound {
                sheet: name.to_string(),
                available: available.to_vec(),
            }),
        None => available.first().cloned().ok_or_else(|| IngestError::SheetNotFound {
            sheet: String::new(),
            available: Vec::new(),
        }),
    }
}

fn check_input(path: &Path) -> Result<SpreadsheetFormat> {
    match std::fs::metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(IngestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            });
        }
    }
    SpreadsheetFormat::from_path(path).ok_or_else(|| IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}

/// Split a raw grid into its header row and data rows, normalizing row ends.
fn split_header(grid: Vec<Vec<CellValue>>) -> (Vec<CellValue>, Vec<Vec<CellValue>>) {
    let mut grid: Vec<Vec<CellValue>> = grid
        .into_iter()
        .map(|mut row| {
            trim_trailing_empty(&mut row);
            row
        })
        .collect();
    while grid.last().is_some_and(Vec::is_empty) {
        grid.pop();
    }
    let mut rows = grid.into_iter();
    let header_row = rows.next().unwrap_or_default();
    (header_row, rows.collect())
}

fn trim_trailing_empty(row: &mut Vec<CellValue>) {
    while row.last().is_some_and(CellValue::is_absent) {
        row.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_interior_empty_rows() {
        let grid = vec![
            vec![CellValue::text("Dept"), CellValue::Empty],
            vec![CellValue::text("HR")],
            vec![CellValue::Empty, CellValue::Empty],
            vec![CellValue::text("ENG"), CellValue::Empty],
            vec![],
            vec![CellValue::Empty],
        ];
        let (header, rows) = split_header(grid);
        assert_eq!(header, vec![CellValue::text("Dept")]);
        assert_eq!(
            rows,
            vec![
                vec![CellValue::text("HR")],
                vec![],
                vec![CellValue::text("ENG")],
            ]
        );
    }

    #[test]
    fn split_empty_grid() {
        let (header, rows) = split_header(Vec::new());
        assert!(header.is_empty());
        assert!(rows.is_empty());
    }

    #[test]
    fn select_sheet_defaults_to_first() {
        let names = vec!["Q1".to_string(), "Q2".to_string()];
        assert_eq!(select_sheet(&names, None).expect("first sheet"), "Q1");
        assert_eq!(select_sheet(&names, Some("Q2")).expect("named sheet"), "Q2");
        let err = select_sheet(&names, Some("q2")).expect_err("names are exact");
        assert!(matches!(
            err,
            IngestError::SheetNotFound { ref sheet, ref available } if sheet == "q2" && available.len() == 2
        ));
    }
}
