use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("sheet '{sheet}' is not part of the workbook (available: {})", available.join(", "))]
    UnknownSheet {
        sheet: String,
        available: Vec<String>,
    },
    #[error("workbook has no sheets")]
    NoSheets,
}

pub type Result<T> = std::result::Result<T, ModelError>;
