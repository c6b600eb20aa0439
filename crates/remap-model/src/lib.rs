pub mod cell;
pub mod dataset;
pub mod error;
pub mod format;
pub mod processing;
pub mod rule;

pub use cell::{CellValue, canonical_string, format_number};
pub use dataset::{Header, TabularDataset};
pub use error::{ModelError, Result};
pub use format::SpreadsheetFormat;
pub use processing::{FailureKind, TransformResponse, TransformResult, TransformStats};
pub use rule::{
    ConfidenceBand, DEFAULT_CONFIDENCE, MappingRule, Provenance, normalize_confidence,
};
