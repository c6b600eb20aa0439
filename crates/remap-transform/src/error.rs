use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;
