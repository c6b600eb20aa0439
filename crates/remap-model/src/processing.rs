use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Per-row outcome counters for one transformation pass.
///
/// Rows whose target cell is absent are tallied in `absent_rows` only; they
/// are not part of `total_rows`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformStats {
    pub total_rows: usize,
    pub transformed_rows: usize,
    pub skipped_rows: usize,
    pub absent_rows: usize,
}

impl TransformStats {
    pub fn record_transformed(&mut self) {
        self.total_rows += 1;
        self.transformed_rows += 1;
    }

    pub fn record_skipped(&mut self) {
        self.total_rows += 1;
        self.skipped_rows += 1;
    }

    pub fn record_absent(&mut self) {
        self.absent_rows += 1;
    }

    /// Share of counted rows that were transformed; 0 when nothing was counted.
    #[allow(clippy::cast_precision_loss)]
    pub fn transformed_ratio(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.transformed_rows as f64 / self.total_rows as f64
        }
    }
}

/// Statistics of a completed run plus where the output was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResult {
    pub stats: TransformStats,
    pub output_location: PathBuf,
}

/// Classification of a failed transformation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Parse,
    SheetNotFound,
    ColumnNotFound,
    WriteFailure,
    Input,
}

/// Structured outcome returned by the transformation entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResponse {
    pub success: bool,
    pub total_rows: usize,
    pub transformed_rows: usize,
    pub skipped_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

impl TransformResponse {
    pub fn succeeded(result: &TransformResult) -> Self {
        Self {
            success: true,
            total_rows: result.stats.total_rows,
            transformed_rows: result.stats.transformed_rows,
            skipped_rows: result.stats.skipped_rows,
            output_path: Some(result.output_location.clone()),
            error_message: None,
            error_kind: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            total_rows: 0,
            transformed_rows: 0,
            skipped_rows: 0,
            output_path: None,
            error_message: Some(message.into()),
            error_kind: Some(kind),
        }
    }
}
