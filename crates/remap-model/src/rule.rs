use serde::{Deserialize, Serialize};

/// Where a mapping rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Ai,
    Manual,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Manual => "manual",
        }
    }
}

/// Confidence assigned to rules whose source gave none or an unusable one.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Clamp a confidence to `[0, 1]`; non-finite values become the default.
pub fn normalize_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        DEFAULT_CONFIDENCE
    }
}

/// A single source-to-target replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRule {
    pub source_value: String,
    pub target_value: String,
    pub confidence: f64,
    pub provenance: Provenance,
}

impl MappingRule {
    pub fn manual(source_value: impl Into<String>, target_value: impl Into<String>) -> Self {
        Self {
            source_value: source_value.into(),
            target_value: target_value.into(),
            confidence: 1.0,
            provenance: Provenance::Manual,
        }
    }

    pub fn ai(
        source_value: impl Into<String>,
        target_value: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            source_value: source_value.into(),
            target_value: target_value.into(),
            confidence: normalize_confidence(confidence),
            provenance: Provenance::Ai,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.provenance == Provenance::Manual
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }
}

/// Coarse confidence grouping used when listing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::High
        } else if confidence >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_rules_are_fully_confident() {
        let rule = MappingRule::manual("HR", "Human Resources");
        assert!(rule.is_manual());
        assert!((rule.confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(rule.band(), ConfidenceBand::High);
    }

    #[test]
    fn ai_confidence_is_normalized() {
        assert!((MappingRule::ai("a", "b", 1.7).confidence - 1.0).abs() < f64::EPSILON);
        assert!(MappingRule::ai("a", "b", -0.2).confidence.abs() < f64::EPSILON);
        assert!((MappingRule::ai("a", "b", f64::NAN).confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn bands() {
        assert_eq!(ConfidenceBand::from_confidence(0.8), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(0.79), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_confidence(0.5), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_confidence(0.1), ConfidenceBand::Low);
    }

    #[test]
    fn rule_serializes_with_lowercase_provenance() {
        let json = serde_json::to_string(&MappingRule::manual("HR", "Human Resources"))
            .expect("serialize rule");
        assert!(json.contains("\"provenance\":\"manual\""));
        let back: MappingRule = serde_json::from_str(&json).expect("deserialize rule");
        assert_eq!(back.target_value, "Human Resources");
    }
}
