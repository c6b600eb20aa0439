//! Transformation entry point: load, transform, write.
//!
//! [`run_transformation`] never returns an error. Every outcome is reported as
//! a [`TransformResponse`], and a failed run leaves no output file behind.

use std::error::Error as _;
use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;
use tracing::{error, info, info_span};

use remap_ingest::{IngestError, load_workbook, select_sheet};
use remap_map::MappingRuleStore;
use remap_model::{FailureKind, ModelError, TransformResponse, TransformResult};
use remap_output::{DEFAULT_OUTPUT_SUFFIX, WriteError, default_output_path, write_output};
use remap_transform::{TransformError, transform};

/// Inputs of one transformation run.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub source_path: PathBuf,
    pub target_column: String,
    pub rules: MappingRuleStore,
    /// First sheet when `None`.
    pub sheet_name: Option<String>,
    /// `<stem><output_suffix>.<ext>` beside the source when `None`.
    pub output_path: Option<PathBuf>,
    pub output_suffix: String,
}

impl TransformRequest {
    pub fn new(
        source_path: impl Into<PathBuf>,
        target_column: impl Into<String>,
        rules: MappingRuleStore,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_column: target_column.into(),
            rules,
            sheet_name: None,
            output_path: None,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet_name = sheet;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output_path = output;
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    pub fn destination(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| default_output_path(&self.source_path, &self.output_suffix))
    }
}

#[derive(Debug, Error)]
enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl PipelineError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Ingest(IngestError::Parse { .. } | IngestError::NoSheets { .. }) => {
                FailureKind::Parse
            }
            Self::Ingest(
                IngestError::SheetNotFound { .. } | IngestError::Model(ModelError::UnknownSheet { .. }),
            ) => FailureKind::SheetNotFound,
            Self::Ingest(IngestError::Model(ModelError::NoSheets)) => FailureKind::Parse,
            Self::Ingest(IngestError::ColumnNotFound { .. })
            | Self::Transform(TransformError::ColumnNotFound { .. }) => FailureKind::ColumnNotFound,
            Self::Ingest(
                IngestError::FileNotFound { .. }
                | IngestError::UnsupportedFormat { .. }
                | IngestError::FileRead { .. },
            ) => FailureKind::Input,
            Self::Write(_) => FailureKind::WriteFailure,
        }
    }
}

/// Load the source, apply the rules to the target column and write the result.
pub fn run_transformation(request: &TransformRequest) -> TransformResponse {
    let span = info_span!(
        "transformation",
        source = %request.source_path.display(),
        column = %request.target_column
    );
    let _guard = span.enter();
    let start = Instant::now();

    match execute(request) {
        Ok(result) => {
            info!(
                total = result.stats.total_rows,
                transformed = result.stats.transformed_rows,
                skipped = result.stats.skipped_rows,
                output = %result.output_location.display(),
                duration_ms = start.elapsed().as_millis(),
                "transformation complete"
            );
            TransformResponse::succeeded(&result)
        }
        Err(failure) => {
            let message = describe(&failure);
            error!(kind = ?failure.kind(), %message, "transformation failed");
            TransformResponse::failed(failure.kind(), message)
        }
    }
}

fn execute(request: &TransformRequest) -> Result<TransformResult, PipelineError> {
    let mut sheets = load_workbook(&request.source_path)?;
    let names: Vec<String> = sheets
        .iter()
        .map(|sheet| sheet.sheet_name().to_string())
        .collect();
    let active = select_sheet(&names, request.sheet_name.as_deref())?;
    let Some(index) = names.iter().position(|name| *name == active) else {
        return Err(IngestError::SheetNotFound {
            sheet: active,
            available: names,
        }
        .into());
    };

    let (transformed, stats) = transform(&sheets[index], &request.target_column, &request.rules)?;
    sheets[index] = transformed;

    let destination = request.destination();
    let output_location = write_output(&destination, &request.source_path, &sheets, &active)?;
    Ok(TransformResult {
        stats,
        output_location,
    })
}

/// Error message with its chain of causes.
fn describe(failure: &PipelineError) -> String {
    let mut message = failure.to_string();
    let mut source = failure.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
