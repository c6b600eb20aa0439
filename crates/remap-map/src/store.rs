//! Mapping rule store with provenance-aware reconciliation.
//!
//! Rules are keyed by their canonical source value. Manual rules always win
//! over AI rules for the same key; an AI batch replaces every AI rule at once
//! but never touches a manual rule or a key the user deleted.

use std::collections::{BTreeSet, HashMap};

use remap_model::{MappingRule, Provenance, normalize_confidence};
use tracing::debug;

use crate::advisor::ProposedMapping;
use crate::error::{MappingError, Result};

/// Ordered rule collection with at most one rule per source value.
#[derive(Debug, Clone, Default)]
pub struct MappingRuleStore {
    rules: Vec<MappingRule>,
    positions: HashMap<String, usize>,
    suppressed: BTreeSet<String>,
    in_flight: Option<u64>,
    issued: u64,
}

/// What an AI batch did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// AI rules present after the batch.
    pub installed: usize,
    /// Proposals dropped because a manual rule owns the key.
    pub kept_manual: usize,
    /// Proposals dropped because the user deleted the key.
    pub suppressed: usize,
    /// Proposals that replaced an earlier proposal for the same key.
    pub duplicates: usize,
    /// AI rules removed before the batch was applied.
    pub discarded: usize,
}

/// Split of a column's unique values by whether a rule exists for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    pub covered: usize,
    pub uncovered: Vec<String>,
}

impl Coverage {
    pub fn total(&self) -> usize {
        self.covered + self.uncovered.len()
    }

    /// Fraction of values with a rule; 1.0 when there are no values.
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            1.0
        } else {
            self.covered as f64 / total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty()
    }
}

/// Permission to apply one AI batch. Only one ticket is outstanding per store.
#[derive(Debug)]
#[must_use = "a proposal ticket must be completed or abandoned"]
pub struct ProposalTicket {
    id: u64,
}

impl ProposalTicket {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A proposal slot that is released when dropped unless it was completed.
///
/// Holding the guard across an `.await` keeps the store usable when the
/// surrounding future is cancelled.
#[derive(Debug)]
#[must_use = "dropping the guard abandons the proposal"]
pub struct ProposalGuard<'a> {
    store: &'a mut MappingRuleStore,
    ticket: Option<ProposalTicket>,
}

impl ProposalGuard<'_> {
    pub fn id(&self) -> Option<u64> {
        self.ticket.as_ref().map(ProposalTicket::id)
    }

    /// Apply the batch and release the slot.
    pub fn complete(mut self, proposals: &[ProposedMapping]) -> Result<BatchSummary> {
        match self.ticket.take() {
            Some(ticket) => self.store.complete_proposal(ticket, proposals),
            None => Err(MappingError::StaleTicket { ticket: 0 }),
        }
    }
}

impl Drop for ProposalGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let id = ticket.id();
            if self.store.abandon_proposal(ticket).is_ok() {
                debug!(ticket = id, "abandoned mapping proposal");
            }
        }
    }
}

impl MappingRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted rules and suppressed keys.
    ///
    /// Later duplicates replace earlier ones, except that an AI rule never
    /// replaces a manual rule and never lands on a suppressed key. Manual
    /// rules are forced to full confidence; AI confidences are normalized.
    pub fn from_parts(
        rules: impl IntoIterator<Item = MappingRule>,
        suppressed: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut store = Self {
            suppressed: suppressed.into_iter().collect(),
            ..Self::default()
        };
        for rule in rules {
            let rule = match rule.provenance {
                Provenance::Manual => MappingRule::manual(rule.source_value, rule.target_value),
                Provenance::Ai => {
                    if store.is_suppressed(&rule.source_value)
                        || store.get(&rule.source_value).is_some_and(MappingRule::is_manual)
                    {
                        debug!("skipping persisted AI rule for a manual or deleted key");
                        continue;
                    }
                    MappingRule::ai(rule.source_value, rule.target_value, rule.confidence)
                }
            };
            store.put(rule);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn get(&self, source_value: &str) -> Option<&MappingRule> {
        self.positions
            .get(source_value)
            .map(|&position| &self.rules[position])
    }

    /// Target value for a canonical source value.
    pub fn lookup(&self, source_value: &str) -> Option<&str> {
        self.get(source_value)
            .map(|rule| rule.target_value.as_str())
    }

    /// Keys the user deleted; AI batches skip them.
    pub fn suppressed(&self) -> impl Iterator<Item = &str> {
        self.suppressed.iter().map(String::as_str)
    }

    pub fn is_suppressed(&self, source_value: &str) -> bool {
        self.suppressed.contains(source_value)
    }

    /// Replace every AI rule with the given proposals.
    ///
    /// Manual rules and suppressed keys are left alone. Within the batch, a
    /// later proposal for the same key replaces the earlier one.
    pub fn apply_ai_batch(&mut self, proposals: &[ProposedMapping]) -> BatchSummary {
        let before = self.rules.len();
        self.rules.retain(MappingRule::is_manual);
        self.reindex();
        let mut summary = BatchSummary {
            discarded: before - self.rules.len(),
            ..BatchSummary::default()
        };

        for proposal in proposals {
            if self.suppressed.contains(&proposal.original) {
                summary.suppressed += 1;
                continue;
            }
            let rule = MappingRule::ai(
                proposal.original.clone(),
                proposal.target.clone(),
                proposal.confidence,
            );
            match self.positions.get(&proposal.original) {
                Some(&position) if self.rules[position].is_manual() => {
                    summary.kept_manual += 1;
                }
                Some(&position) => {
                    self.rules[position] = rule;
                    summary.duplicates += 1;
                }
                None => {
                    self.put(rule);
                    summary.installed += 1;
                }
            }
        }

        debug!(
            proposals = proposals.len(),
            installed = summary.installed,
            kept_manual = summary.kept_manual,
            suppressed = summary.suppressed,
            duplicates = summary.duplicates,
            discarded = summary.discarded,
            "applied AI batch"
        );
        summary
    }

    /// Install or overwrite a manual rule. Lifts any suppression of the key.
    ///
    /// Returns the rule it replaced, if any.
    pub fn upsert_manual(
        &mut self,
        source_value: impl Into<String>,
        target_value: impl Into<String>,
    ) -> Option<MappingRule> {
        let rule = MappingRule::manual(source_value, target_value);
        self.suppressed.remove(&rule.source_value);
        self.put(rule)
    }

    /// Remove the rule for a key and suppress the key for later AI batches.
    pub fn delete(&mut self, source_value: &str) -> Option<MappingRule> {
        self.suppressed.insert(source_value.to_string());
        let position = self.positions.remove(source_value)?;
        let removed = self.rules.remove(position);
        self.reindex();
        Some(removed)
    }

    /// How many of `unique_values` have a rule.
    pub fn coverage(&self, unique_values: &[String]) -> Coverage {
        let mut coverage = Coverage::default();
        for value in unique_values {
            if self.positions.contains_key(value) {
                coverage.covered += 1;
            } else {
                coverage.uncovered.push(value.clone());
            }
        }
        coverage
    }

    /// Reserve the store for one AI batch.
    pub fn begin_proposal(&mut self) -> Result<ProposalTicket> {
        if self.in_flight.is_some() {
            return Err(MappingError::ProposalInFlight);
        }
        self.issued += 1;
        self.in_flight = Some(self.issued);
        Ok(ProposalTicket { id: self.issued })
    }

    /// Like [`begin_proposal`](Self::begin_proposal), but the slot is freed
    /// again if the guard is dropped before [`ProposalGuard::complete`].
    pub fn guard_proposal(&mut self) -> Result<ProposalGuard<'_>> {
        let ticket = self.begin_proposal()?;
        Ok(ProposalGuard {
            store: self,
            ticket: Some(ticket),
        })
    }

    /// Apply the batch for an outstanding ticket and release it.
    pub fn complete_proposal(
        &mut self,
        ticket: ProposalTicket,
        proposals: &[ProposedMapping],
    ) -> Result<BatchSummary> {
        self.release(&ticket)?;
        Ok(self.apply_ai_batch(proposals))
    }

    /// Release an outstanding ticket without changing any rule.
    pub fn abandon_proposal(&mut self, ticket: ProposalTicket) -> Result<()> {
        self.release(&ticket)
    }

    pub fn proposal_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    fn release(&mut self, ticket: &ProposalTicket) -> Result<()> {
        if self.in_flight != Some(ticket.id) {
            return Err(MappingError::StaleTicket { ticket: ticket.id });
        }
        self.in_flight = None;
        Ok(())
    }

    /// Insert or replace in place, keeping the key's original position.
    fn put(&mut self, rule: MappingRule) -> Option<MappingRule> {
        if let Some(&position) = self.positions.get(&rule.source_value) {
            return Some(std::mem::replace(&mut self.rules[position], rule));
        }
        self.positions
            .insert(rule.source_value.clone(), self.rules.len());
        self.rules.push(rule);
        None
    }

    fn reindex(&mut self) {
        self.positions = self
            .rules
            .iter()
            .enumerate()
            .map(|(position, rule)| (rule.source_value.clone(), position))
            .collect();
    }
}

/// Confidence for an advisor proposal. Missing, zero and non-finite values
/// fall back to the default.
pub(crate) fn proposal_confidence(raw: Option<f64>) -> f64 {
    raw.filter(|confidence| confidence.abs() > 0.0)
        .map_or(remap_model::DEFAULT_CONFIDENCE, normalize_confidence)
}
