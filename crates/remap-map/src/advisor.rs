//! Contract with the external AI advisor that proposes mapping rules.
//!
//! The advisor receives the distinct values of a column plus a free-text goal
//! and answers with text that should contain a JSON object of the form
//! `{"mappings": [{"original", "target", "confidence"}], "explanation"}`.
//! Replies are often wrapped in prose or code fences, so the outermost JSON
//! object is extracted before parsing.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use remap_model::{CellValue, canonical_string};

use crate::error::{AdvisorError, MappingError};
use crate::store::{BatchSummary, MappingRuleStore, proposal_confidence};

/// What the advisor is asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRequest {
    pub unique_values: Vec<String>,
    pub goal: String,
}

/// One proposed source-to-target rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedMapping {
    pub original: String,
    pub target: String,
    pub confidence: f64,
}

impl ProposedMapping {
    pub fn new(original: impl Into<String>, target: impl Into<String>, confidence: f64) -> Self {
        Self {
            original: original.into(),
            target: target.into(),
            confidence,
        }
    }
}

/// Parsed advisor answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingResponse {
    pub mappings: Vec<ProposedMapping>,
    pub explanation: String,
}

/// Opaque credential handed to the advisor. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Configuration consumed by an advisor: model identifier and credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorContext {
    pub model: String,
    pub credential: Option<Credential>,
}

/// An external service that proposes mapping rules.
///
/// Implementations return the raw reply text; interpretation is shared.
pub trait MappingAdvisor {
    fn query(
        &self,
        context: &AdvisorContext,
        request: &MappingRequest,
    ) -> impl Future<Output = Result<String, AdvisorError>> + Send;
}

/// Result of one full proposal round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalOutcome {
    pub response: MappingResponse,
    pub summary: BatchSummary,
}

/// Parse an advisor reply strictly.
pub fn parse_reply(text: &str) -> Result<MappingResponse, AdvisorError> {
    let object = extract_object(text).ok_or_else(|| AdvisorError::Malformed {
        reason: "reply contains no JSON object".to_string(),
    })?;
    let document: Value = serde_json::from_str(object).map_err(|e| AdvisorError::Malformed {
        reason: e.to_string(),
    })?;
    let Value::Object(fields) = document else {
        return Err(AdvisorError::Malformed {
            reason: "reply is not a JSON object".to_string(),
        });
    };

    let mappings = match fields.get("mappings") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries.iter().filter_map(proposal_from_value).collect(),
        Some(_) => {
            return Err(AdvisorError::Malformed {
                reason: "\"mappings\" is not an array".to_string(),
            });
        }
    };
    let explanation = fields
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(MappingResponse {
        mappings,
        explanation,
    })
}

/// Parse an advisor reply, treating a malformed reply as an empty proposal.
pub fn interpret_reply(text: &str) -> MappingResponse {
    match parse_reply(text) {
        Ok(response) => response,
        Err(error) => {
            warn!(%error, "ignoring advisor reply");
            MappingResponse::default()
        }
    }
}

/// Ask the advisor for proposals and merge them into the store.
///
/// The store's proposal slot is held for the whole round trip. It is released
/// on failure and when the returned future is dropped before it finishes.
pub async fn request_proposals<A>(
    store: &mut MappingRuleStore,
    advisor: &A,
    context: &AdvisorContext,
    request: &MappingRequest,
) -> Result<ProposalOutcome, MappingError>
where
    A: MappingAdvisor,
{
    let proposal = store.guard_proposal()?;
    info!(
        model = %context.model,
        values = request.unique_values.len(),
        "requesting mapping proposals"
    );
    let reply = advisor.query(context, request).await?;
    let response = interpret_reply(&reply);
    let summary = proposal.complete(&response.mappings)?;
    info!(
        proposed = response.mappings.len(),
        installed = summary.installed,
        "merged mapping proposals"
    );
    Ok(ProposalOutcome { response, summary })
}

/// Slice from the first `{` to the last `}`.
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn proposal_from_value(entry: &Value) -> Option<ProposedMapping> {
    let original = entry.get("original").and_then(scalar_text);
    let target = entry.get("target").and_then(scalar_text);
    let (Some(original), Some(target)) = (original, target) else {
        warn!("skipping proposal without usable original/target");
        return None;
    };
    let confidence = proposal_confidence(entry.get("confidence").and_then(Value::as_f64));
    Some(ProposedMapping {
        original,
        target,
        confidence,
    })
}

/// Scalars canonicalize like cells, so `3` and `"3"` name the same key.
fn scalar_text(value: &Value) -> Option<String> {
    let cell = match value {
        Value::String(text) => CellValue::text(text.as_str()),
        Value::Number(number) => CellValue::Number(number.as_f64()?),
        Value::Bool(flag) => CellValue::Bool(*flag),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    canonical_string(&cell).map(std::borrow::Cow::into_owned)
}
