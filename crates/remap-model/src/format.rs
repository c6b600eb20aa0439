use std::path::Path;

use serde::{Deserialize, Serialize};

/// Spreadsheet file formats accepted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    Csv,
    Xlsx,
    Xlsm,
    Xlsb,
    Xls,
    Ods,
}

impl SpreadsheetFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xlsm" => Some(Self::Xlsm),
            "xlsb" => Some(Self::Xlsb),
            "xls" => Some(Self::Xls),
            "ods" => Some(Self::Ods),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xlsm => "xlsm",
            Self::Xlsb => "xlsb",
            Self::Xls => "xls",
            Self::Ods => "ods",
        }
    }

    /// Format used when writing a transformed copy: CSV stays CSV, every
    /// workbook format is written as `.xlsx`.
    pub fn output_format(self) -> Self {
        match self {
            Self::Csv => Self::Csv,
            Self::Xlsx | Self::Xlsm | Self::Xlsb | Self::Xls | Self::Ods => Self::Xlsx,
        }
    }

    pub fn is_workbook(self) -> bool {
        self != Self::Csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_extensions_case_insensitively() {
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("data/Staff.XLSX")),
            Some(SpreadsheetFormat::Xlsx)
        );
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("staff.csv")),
            Some(SpreadsheetFormat::Csv)
        );
        assert_eq!(SpreadsheetFormat::from_path(Path::new("staff.txt")), None);
        assert_eq!(SpreadsheetFormat::from_path(Path::new("staff")), None);
    }

    #[test]
    fn workbooks_are_written_as_xlsx() {
        assert_eq!(SpreadsheetFormat::Ods.output_format(), SpreadsheetFormat::Xlsx);
        assert_eq!(SpreadsheetFormat::Csv.output_format(), SpreadsheetFormat::Csv);
        assert!(!SpreadsheetFormat::Csv.is_workbook());
    }
}
