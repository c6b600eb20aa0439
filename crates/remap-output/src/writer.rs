//! Spreadsheet writers.
//!
//! Output is built in memory, written to a temp file beside the destination,
//! then renamed into place, so a failed write never leaves a partial file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use remap_model::{CellValue, SpreadsheetFormat, TabularDataset, canonical_string, format_number};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::error::{Result, WriteError};

/// Suffix appended to the source stem for the default destination.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_transformed";

/// `<stem><suffix>.<ext>` beside the source, where `ext` is the output format.
pub fn default_output_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned());
    let format = SpreadsheetFormat::from_path(source)
        .map_or(SpreadsheetFormat::Xlsx, SpreadsheetFormat::output_format);
    source.with_file_name(format!("{stem}{suffix}.{}", format.extension()))
}

/// Write `sheets` to `destination`.
///
/// CSV destinations receive only the `active` sheet; xlsx destinations
/// receive every sheet in order. Fails if `destination` is `source`.
pub fn write_output(
    destination: &Path,
    source: &Path,
    sheets: &[TabularDataset],
    active: &str,
) -> Result<PathBuf> {
    if resolves_to_same_file(source, destination) {
        return Err(WriteError::SameAsSource {
            path: destination.to_path_buf(),
        });
    }
    let active_sheet = sheets
        .iter()
        .find(|sheet| sheet.sheet_name() == active)
        .ok_or_else(|| WriteError::MissingSheet {
            sheet: active.to_string(),
        })?;

    let format = SpreadsheetFormat::from_path(destination);
    let bytes = match format {
        Some(SpreadsheetFormat::Csv) => encode_csv(destination, active_sheet)?,
        Some(SpreadsheetFormat::Xlsx) => encode_xlsx(sheets)?,
        _ => {
            return Err(WriteError::UnsupportedFormat {
                path: destination.to_path_buf(),
            });
        }
    };

    write_atomically(destination, &bytes)?;
    info!(
        path = %destination.display(),
        sheets = if format == Some(SpreadsheetFormat::Csv) { 1 } else { sheets.len() },
        bytes = bytes.len(),
        "wrote output"
    );
    Ok(destination.to_path_buf())
}

fn resolves_to_same_file(source: &Path, destination: &Path) -> bool {
    match (source.canonicalize(), destination.canonicalize()) {
        (Ok(source), Ok(destination)) => source == destination,
        _ => false,
    }
}

fn cell_text(cell: &CellValue) -> String {
    canonical_string(cell).map(std::borrow::Cow::into_owned).unwrap_or_default()
}

fn encode_csv(destination: &Path, sheet: &TabularDataset) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(sheet.header_row().iter().map(cell_text))?;
    for row in sheet.rows() {
        writer.write_record(row.iter().map(cell_text))?;
    }
    writer.into_inner().map_err(|e| WriteError::Io {
        operation: "encode",
        path: destination.to_path_buf(),
        source: e.into_error(),
    })
}

fn encode_xlsx(sheets: &[TabularDataset]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.sheet_name())?;
        write_row(worksheet, sheet.sheet_name(), 0, sheet.header_row())?;
        for (index, row) in sheet.rows().iter().enumerate() {
            write_row(worksheet, sheet.sheet_name(), index + 1, row)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn write_row(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    row: usize,
    cells: &[CellValue],
) -> Result<()> {
    for (column, cell) in cells.iter().enumerate() {
        if cell.is_absent() {
            continue;
        }
        let capacity = || WriteError::Capacity {
            sheet: sheet_name.to_string(),
            row,
            column,
        };
        let row_num = u32::try_from(row).map_err(|_| capacity())?;
        let col_num = u16::try_from(column).map_err(|_| capacity())?;
        match cell {
            CellValue::Empty => {}
            CellValue::Text(text) => {
                worksheet.write_string(row_num, col_num, text)?;
            }
            CellValue::Number(number) if number.is_finite() => {
                worksheet.write_number(row_num, col_num, *number)?;
            }
            CellValue::Number(number) => {
                worksheet.write_string(row_num, col_num, format_number(*number))?;
            }
            CellValue::Bool(flag) => {
                worksheet.write_boolean(row_num, col_num, *flag)?;
            }
        }
    }
    Ok(())
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| WriteError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result = write_temp(&temp_path, bytes).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| WriteError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source: e,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(temp_path: &Path, bytes: &[u8]) -> Result<()> {
    let io_error = |operation: &'static str, e: std::io::Error| WriteError::Io {
        operation,
        path: temp_path.to_path_buf(),
        source: e,
    };
    let mut file = File::create(temp_path).map_err(|e| io_error("create", e))?;
    file.write_all(bytes).map_err(|e| io_error("write", e))?;
    file.sync_all().map_err(|e| io_error("sync", e))?;
    Ok(())
}
