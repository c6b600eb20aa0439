//! Spreadsheet ingestion for column remapping.
//!
//! - **Loading**: read csv, xlsx, xlsm, xlsb, xls and ods files into
//!   [`TabularDataset`](remap_model::TabularDataset) values.
//! - **Value indexing**: distinct canonical values of a column, in first-seen
//!   order, optionally with occurrence counts.

mod error;
mod load;
mod values;

// === Error Types ===
pub use error::{IngestError, ParseCause, Result};

// === Loading ===
pub use load::{list_sheets, load_dataset, load_workbook, select_sheet};

// === Value Indexing ===
pub use values::{
    UniqueValueIndex, ValueFrequency, build_value_index, compute_unique_values, value_frequencies,
};
