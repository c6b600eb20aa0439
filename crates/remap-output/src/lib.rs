//! Output writers for transformed spreadsheets.
//!
//! CSV input is written back as CSV. Workbook input (xlsx, xlsm, xlsb, xls,
//! ods) is written as xlsx with every sheet carried over in order.

mod error;
mod writer;

pub use error::{Result, WriteError};
pub use writer::{DEFAULT_OUTPUT_SUFFIX, default_output_path, write_output};
