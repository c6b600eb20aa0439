//! Workbook reading through calamine (xlsx, xlsm, xlsb, xls, ods).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use chrono::{NaiveDateTime, Timelike};
use remap_model::{CellValue, TabularDataset};

use crate::error::{IngestError, Result};

use super::split_header;

/// An open workbook and its sheet names in file order.
pub(super) struct WorkbookSource {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
    sheet_names: Vec<String>,
}

impl WorkbookSource {
    pub(super) fn open(path: &Path) -> Result<Self> {
        let workbook = open_workbook_auto(path).map_err(|e| IngestError::parse(path, e))?;
        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(IngestError::NoSheets {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
            sheet_names,
        })
    }

    pub(super) fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    pub(super) fn read_sheet(&mut self, name: &str) -> Result<TabularDataset> {
        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| IngestError::parse(&self.path, e))?;
        let (header_row, rows) = split_header(range_to_grid(&range));
        tracing::debug!(
            sheet = %name,
            header_cells = header_row.len(),
            rows = rows.len(),
            "read worksheet"
        );
        Ok(TabularDataset::new(
            self.sheet_names.clone(),
            name,
            header_row,
            rows,
        )?)
    }
}

/// Lay a calamine range out on absolute coordinates starting at cell A1.
///
/// calamine ranges begin at the first used cell, so leading rows and columns
/// are padded back in to keep the first worksheet row as the header row.
fn range_to_grid(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let mut grid: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_cell));
        grid.push(cells);
    }
    grid
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Int(value) => CellValue::from(*value),
        Data::Float(value) => CellValue::Number(*value),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) => value.as_datetime().map_or_else(
            || CellValue::Number(value.as_f64()),
            |datetime| CellValue::Text(format_datetime(datetime)),
        ),
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
        Data::Error(error) => CellValue::Text(error.to_string()),
    }
}

/// ISO 8601 text; midnight values print as a plain date.
fn format_datetime(datetime: NaiveDateTime) -> String {
    let time = datetime.time();
    if time.hour() == 0 && time.minute() == 0 && time.second() == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
