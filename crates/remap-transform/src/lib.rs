//! Rule-driven transformation of a single spreadsheet column.
//!
//! - **engine**: full pass producing a new dataset and row counters
//! - **preview**: before/after view of the first rows

pub mod engine;
mod error;
pub mod preview;

pub use engine::{RowOutcome, classify_cell, resolve_column, transform};
pub use error::{Result, TransformError};
pub use preview::{DEFAULT_PREVIEW_ROWS, PreviewRow, preview};
