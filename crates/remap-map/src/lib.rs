//! Mapping rules for column remapping.
//!
//! - [`MappingRuleStore`]: rules keyed by source value, with manual rules
//!   taking precedence over AI proposals.
//! - [`advisor`]: the request/response contract with the external AI service.
//! - [`ruleset`]: JSON rule-set documents that persist a store between runs.

pub mod advisor;
mod error;
pub mod ruleset;
mod store;

// === Error Types ===
pub use error::{AdvisorError, MappingError, Result, RuleSetError};

// === Rule Store ===
pub use store::{BatchSummary, Coverage, MappingRuleStore, ProposalGuard, ProposalTicket};

// === Advisor Contract ===
pub use advisor::{
    AdvisorContext, Credential, MappingAdvisor, MappingRequest, MappingResponse,
    ProposalOutcome, ProposedMapping, interpret_reply, parse_reply, request_proposals,
};

// === Rule-Set Documents ===
pub use ruleset::{
    RULE_SET_VERSION, RuleSetDocument, SourceCheck, SourceFingerprint, load_rule_set,
    save_rule_set,
};

pub use remap_model::{ConfidenceBand, MappingRule, Provenance};
