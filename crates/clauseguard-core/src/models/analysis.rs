use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::{FREE_TIER_PREVIEW_ITEMS, SCORE_BAD_BELOW, SCORE_GOOD_ABOVE};
use crate::error::AppError;

/// Severity of a risk or impact of an opportunity.
///
/// Parsed case-insensitively. When deserializing model output, labels outside
/// the three known levels fall back to `Medium`.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Level::Low),
            "medium" | "moderate" => Ok(Level::Medium),
            "high" => Ok(Level::High),
            other => Err(format!("unknown level '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unrecognized level in model output; using medium");
            Level::Medium
        }))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(default)]
pub struct RiskItem {
    pub risk: String,
    pub explanation: String,
    pub severity: Level,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(default)]
pub struct OpportunityItem {
    pub opportunity: String,
    pub explanation: String,
    pub impact: Level,
}

/// Structured result produced by the analysis model.
///
/// Missing fields default to empty so a partially filled response still parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOutcome {
    #[serde(deserialize_with = "deserialize_score")]
    pub overall_score: i32,
    pub risks: Vec<RiskItem>,
    pub opportunities: Vec<OpportunityItem>,
    pub summary: String,
    pub key_clauses: Vec<String>,
    pub recommendations: Vec<String>,
    pub negotiation_points: Vec<String>,
    pub contract_duration: String,
    pub termination_conditions: String,
    pub legal_compliance: String,
}

/// Accepts integer or fractional scores; fractions are rounded to the nearest integer.
fn deserialize_score<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("score is not a finite number"));
    }
    // `as` saturates out-of-range values; the score is clamped before storage
    Ok(raw.round() as i32)
}

/// Everything needed to persist an analysis.
#[derive(Debug, Clone)]
pub struct NewContractAnalysis {
    pub user_id: Uuid,
    pub contract_text: String,
    pub contract_type: String,
    pub outcome: AnalysisOutcome,
    pub ai_model: String,
    pub language: String,
}

impl NewContractAnalysis {
    pub fn new(
        user_id: Uuid,
        contract_text: String,
        contract_type: String,
        mut outcome: AnalysisOutcome,
        ai_model: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        outcome.overall_score = outcome.overall_score.clamp(0, 100);
        Self {
            user_id,
            contract_text,
            contract_type: contract_type.trim().to_string(),
            outcome,
            ai_model: ai_model.into(),
            language: language.into(),
        }
    }

    /// A record is never stored without a type label and extracted text.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.contract_type.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Contract type is required".to_string(),
            ));
        }
        if self.contract_text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Contract text is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A persisted analysis. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContractAnalysis {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contract_text: String,
    pub contract_type: String,
    pub overall_score: i32,
    pub risks: Vec<RiskItem>,
    pub opportunities: Vec<OpportunityItem>,
    pub summary: String,
    pub key_clauses: Vec<String>,
    pub recommendations: Vec<String>,
    pub negotiation_points: Vec<String>,
    pub contract_duration: String,
    pub termination_conditions: String,
    pub legal_compliance: String,
    pub ai_model: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreRating {
    Good,
    Average,
    Bad,
}

impl fmt::Display for ScoreRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreRating::Good => f.write_str("Good"),
            ScoreRating::Average => f.write_str("Average"),
            ScoreRating::Bad => f.write_str("Bad"),
        }
    }
}

impl ContractAnalysis {
    /// Build the stored record from a validated insert, assigning identity and timestamp.
    pub fn from_new(id: Uuid, created_at: DateTime<Utc>, new: NewContractAnalysis) -> Self {
        let o = new.outcome;
        Self {
            id,
            user_id: new.user_id,
            contract_text: new.contract_text,
            contract_type: new.contract_type,
            overall_score: o.overall_score,
            risks: o.risks,
            opportunities: o.opportunities,
            summary: o.summary,
            key_clauses: o.key_clauses,
            recommendations: o.recommendations,
            negotiation_points: o.negotiation_points,
            contract_duration: o.contract_duration,
            termination_conditions: o.termination_conditions,
            legal_compliance: o.legal_compliance,
            ai_model: new.ai_model,
            language: new.language,
            created_at,
        }
    }

    pub fn score_rating(&self) -> ScoreRating {
        if self.overall_score > SCORE_GOOD_ABOVE {
            ScoreRating::Good
        } else if self.overall_score < SCORE_BAD_BELOW {
            ScoreRating::Bad
        } else {
            ScoreRating::Average
        }
    }

    /// Free-tier view: risks and opportunities are cut to the first few entries.
    pub fn preview(mut self, is_premium: bool) -> Self {
        if !is_premium {
            self.risks.truncate(FREE_TIER_PREVIEW_ITEMS);
            self.opportunities.truncate(FREE_TIER_PREVIEW_ITEMS);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome_with(score: i32, risks: usize) -> AnalysisOutcome {
        AnalysisOutcome {
            overall_score: score,
            risks: (0..risks)
                .map(|i| RiskItem {
                    risk: format!("risk {}", i),
                    explanation: "because".to_string(),
                    severity: Level::High,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn level_parses_case_insensitively() {
        let item: RiskItem =
            serde_json::from_str(r#"{"risk":"r","explanation":"e","severity":"HIGH"}"#).unwrap();
        assert_eq!(item.severity, Level::High);
        assert_eq!(serde_json::to_string(&Level::Low).unwrap(), "\"low\"");
        assert!("extreme".parse::<Level>().is_err());
    }

    #[test]
    fn unknown_level_falls_back_to_medium() {
        let item: OpportunityItem = serde_json::from_str(
            r#"{"opportunity":"o","explanation":"e","impact":"critical"}"#,
        )
        .unwrap();
        assert_eq!(item.impact, Level::Medium);
    }

    #[test]
    fn fractional_score_is_rounded() {
        let outcome: AnalysisOutcome =
            serde_json::from_str(r#"{"overallScore": 72.5, "risks": []}"#).unwrap();
        assert_eq!(outcome.overall_score, 73);

        let outcome: AnalysisOutcome =
            serde_json::from_str(r#"{"overallScore": 64.2}"#).unwrap();
        assert_eq!(outcome.overall_score, 64);
    }

    #[test]
    fn outcome_tolerates_missing_fields() {
        let outcome: AnalysisOutcome =
            serde_json::from_str(r#"{"overallScore": 72, "risks": [], "opportunities": []}"#)
                .unwrap();
        assert_eq!(outcome.overall_score, 72);
        assert!(outcome.summary.is_empty());
        assert!(outcome.key_clauses.is_empty());
    }

    #[test]
    fn new_analysis_clamps_score() {
        let new = NewContractAnalysis::new(
            Uuid::new_v4(),
            "text".to_string(),
            "NDA".to_string(),
            outcome_with(140, 0),
            "model",
            "en",
        );
        assert_eq!(new.outcome.overall_score, 100);
    }

    #[test]
    fn validate_rejects_blank_type_or_text() {
        let blank_type = NewContractAnalysis::new(
            Uuid::new_v4(),
            "text".to_string(),
            "   ".to_string(),
            AnalysisOutcome::default(),
            "model",
            "en",
        );
        assert!(blank_type.validate().is_err());

        let blank_text = NewContractAnalysis::new(
            Uuid::new_v4(),
            "\n".to_string(),
            "NDA".to_string(),
            AnalysisOutcome::default(),
            "model",
            "en",
        );
        assert!(blank_text.validate().is_err());
    }

    #[test]
    fn score_rating_thresholds() {
        let build = |score| {
            let new = NewContractAnalysis::new(
                Uuid::new_v4(),
                "t".to_string(),
                "NDA".to_string(),
                outcome_with(score, 0),
                "m",
                "en",
            );
            ContractAnalysis::from_new(Uuid::new_v4(), Utc::now(), new)
        };
        assert_eq!(build(71).score_rating(), ScoreRating::Good);
        assert_eq!(build(70).score_rating(), ScoreRating::Average);
        assert_eq!(build(50).score_rating(), ScoreRating::Average);
        assert_eq!(build(49).score_rating(), ScoreRating::Bad);
    }

    #[test]
    fn preview_limits_free_users() {
        let new = NewContractAnalysis::new(
            Uuid::new_v4(),
            "t".to_string(),
            "NDA".to_string(),
            outcome_with(60, 5),
            "m",
            "en",
        );
        let analysis = ContractAnalysis::from_new(Uuid::new_v4(), Utc::now(), new);
        assert_eq!(analysis.clone().preview(false).risks.len(), 3);
        assert_eq!(analysis.preview(true).risks.len(), 5);
    }

    #[test]
    fn serializes_camel_case() {
        let new = NewContractAnalysis::new(
            Uuid::new_v4(),
            "t".to_string(),
            "NDA".to_string(),
            outcome_with(72, 1),
            "m",
            "en",
        );
        let analysis = ContractAnalysis::from_new(Uuid::new_v4(), Utc::now(), new);
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["overallScore"], 72);
        assert_eq!(value["contractType"], "NDA");
        assert!(value.get("keyClauses").is_some());
        assert_eq!(value["risks"][0]["severity"], "high");
    }
}
