//! Rule-set documents: a rule store persisted as JSON between runs.
//!
//! # Storage Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "saved_at": "2026-01-05T10:00:00+00:00",
//!   "column": "Dept",
//!   "source": { "path": "staff.xlsx", "sha256": "…" },
//!   "rules": [{ "source_value": "HR", "target_value": "Human Resources",
//!               "confidence": 1.0, "provenance": "manual" }],
//!   "suppressed": ["ENG"]
//! }
//! ```

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use remap_model::MappingRule;

use crate::error::RuleSetError;
use crate::store::MappingRuleStore;

/// Current document version.
pub const RULE_SET_VERSION: u32 = 1;

const BUFFER_SIZE: usize = 65536;

/// Identity of the spreadsheet a rule set was built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub sha256: String,
}

impl SourceFingerprint {
    pub fn compute(path: &Path) -> Result<Self, RuleSetError> {
        Ok(Self {
            path: path.to_path_buf(),
            sha256: compute_file_sha256(path)?,
        })
    }
}

/// How a spreadsheet compares with the fingerprint stored in a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCheck {
    Matches,
    Changed,
    Unrecorded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetDocument {
    pub version: u32,
    pub saved_at: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceFingerprint>,
    #[serde(default)]
    pub rules: Vec<MappingRule>,
    #[serde(default)]
    pub suppressed: Vec<String>,
}

impl RuleSetDocument {
    /// Snapshot a store for `column`.
    pub fn from_store(
        column: impl Into<String>,
        store: &MappingRuleStore,
        source: Option<SourceFingerprint>,
    ) -> Self {
        Self {
            version: RULE_SET_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            column: column.into(),
            source,
            rules: store.rules().to_vec(),
            suppressed: store.suppressed().map(str::to_string).collect(),
        }
    }

    pub fn to_store(&self) -> MappingRuleStore {
        MappingRuleStore::from_parts(self.rules.iter().cloned(), self.suppressed.iter().cloned())
    }

    /// Compare `path` against the recorded source fingerprint.
    pub fn check_source(&self, path: &Path) -> Result<SourceCheck, RuleSetError> {
        let Some(recorded) = &self.source else {
            return Ok(SourceCheck::Unrecorded);
        };
        let actual = compute_file_sha256(path)?;
        if actual.eq_ignore_ascii_case(&recorded.sha256) {
            Ok(SourceCheck::Matches)
        } else {
            tracing::warn!(
                path = %path.display(),
                recorded = %recorded.path.display(),
                "source file differs from the one the rule set was built against"
            );
            Ok(SourceCheck::Changed)
        }
    }
}

/// Write a rule set as pretty JSON via temp file and rename.
pub fn save_rule_set(path: &Path, document: &RuleSetDocument) -> Result<(), RuleSetError> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| RuleSetError::Serialization { source: e })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RuleSetError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    let result = write_temp(&temp_path, json.as_bytes()).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| RuleSetError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source: e,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result?;

    tracing::info!(
        path = %path.display(),
        rules = document.rules.len(),
        "saved rule set"
    );
    Ok(())
}

fn write_temp(temp_path: &Path, bytes: &[u8]) -> Result<(), RuleSetError> {
    let io_error = |operation: &'static str, e: std::io::Error| RuleSetError::Io {
        operation,
        path: temp_path.to_path_buf(),
        source: e,
    };
    let mut file = File::create(temp_path).map_err(|e| io_error("create", e))?;
    file.write_all(bytes).map_err(|e| io_error("write", e))?;
    file.sync_all().map_err(|e| io_error("sync", e))?;
    Ok(())
}

pub fn load_rule_set(path: &Path) -> Result<RuleSetDocument, RuleSetError> {
    let content = fs::read_to_string(path).map_err(|e| RuleSetError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    let document: RuleSetDocument =
        serde_json::from_str(&content).map_err(|e| RuleSetError::Deserialization {
            path: path.to_path_buf(),
            source: e,
        })?;
    if document.version > RULE_SET_VERSION {
        return Err(RuleSetError::UnsupportedVersion {
            found: document.version,
            max_supported: RULE_SET_VERSION,
        });
    }
    tracing::debug!(
        path = %path.display(),
        rules = document.rules.len(),
        "loaded rule set"
    );
    Ok(document)
}

fn compute_file_sha256(path: &Path) -> Result<String, RuleSetError> {
    let io_error = |operation: &'static str, e: std::io::Error| RuleSetError::Io {
        operation,
        path: path.to_path_buf(),
        source: e,
    };
    let file = File::open(path).map_err(|e| io_error("open", e))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| io_error("read", e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
