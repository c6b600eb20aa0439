//! Error types for mapping rules and AI proposals.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the mapping rule store.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A proposal batch is already outstanding for this store.
    #[error("an AI proposal is already in flight for this rule set")]
    ProposalInFlight,

    /// The ticket does not belong to the outstanding proposal.
    #[error("proposal ticket {ticket} is not the one in flight")]
    StaleTicket { ticket: u64 },

    #[error(transparent)]
    Advisor(#[from] AdvisorError),
}

/// Errors from the external AI advisor.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// The advisor cannot be reached or is not configured.
    #[error("advisor unavailable: {reason}")]
    Unavailable { reason: String },

    /// The advisor failed while answering.
    #[error("advisor request failed")]
    Transport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The reply did not contain a usable proposal document.
    #[error("malformed advisor reply: {reason}")]
    Malformed { reason: String },
}

/// Errors reading or writing rule-set documents.
#[derive(Debug, Error)]
pub enum RuleSetError {
    /// File I/O error.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temp file could not be renamed into place.
    #[error("failed to replace {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize rule set")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid rule set {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule set version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion { found: u32, max_supported: u32 },
}

pub type Result<T> = std::result::Result<T, MappingError>;
