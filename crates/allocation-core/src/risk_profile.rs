//! Investor risk profile from a multiple-choice survey.
//!
//! Score = mean of the chosen option scores. Bands:
//! - score <= 13.3 → Low
//! - score <= 23.3 → Medium (balanced)
//! - otherwise     → High

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::AllocationError;
use crate::types::*;
use crate::AllocationResult;

const LOW_RISK_CEILING: Decimal = dec!(13.3);
const MEDIUM_RISK_CEILING: Decimal = dec!(23.3);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyOption {
    pub option_id: String,
    pub option_text: String,
    pub score: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub question_text: String,
    pub options: Vec<SurveyOption>,
}

/// Survey file shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskSurvey {
    #[serde(default)]
    pub risk_questions: Vec<SurveyQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: Decimal) -> Self {
        if score <= LOW_RISK_CEILING {
            RiskLevel::Low
        } else if score <= MEDIUM_RISK_CEILING {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk (Balanced)",
            RiskLevel::High => "High Risk",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "You are an investor who prioritizes financial security and avoids risk.",
            RiskLevel::Medium => "You aim to protect your capital while also seeking moderate returns.",
            RiskLevel::High => "You are willing to take high risks for high return potential.",
        }
    }
}

/// Input: the survey and one option id per question, in question order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfileInput {
    pub survey: RiskSurvey,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfileOutput {
    /// Mean option score, 2 dp.
    pub risk_score: Decimal,
    pub risk_level: RiskLevel,
    pub label: String,
    pub description: String,
    pub questions_answered: usize,
}

/// Score a completed survey.
pub fn score_survey(input: &RiskProfileInput) -> AllocationResult<ComputationOutput<RiskProfileOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();
    let questions = &input.survey.risk_questions;

    if questions.is_empty() {
        return Err(AllocationError::InsufficientData(
            "Risk survey contains no questions".into(),
        ));
    }
    if input.answers.len() != questions.len() {
        return Err(AllocationError::InvalidInput {
            field: "answers".into(),
            reason: format!(
                "Expected {} answers, one per question, got {}",
                questions.len(),
                input.answers.len()
            ),
        });
    }

    let mut total = Decimal::ZERO;
    for (i, (question, answer)) in questions.iter().zip(&input.answers).enumerate() {
        let chosen = question
            .options
            .iter()
            .find(|o| o.option_id.eq_ignore_ascii_case(answer.trim()))
            .ok_or_else(|| AllocationError::InvalidInput {
                field: format!("answers[{i}]"),
                reason: format!(
                    "'{}' is not an option for \"{}\"; choose one of: {}",
                    answer,
                    question.question_text,
                    question
                        .options
                        .iter()
                        .map(|o| o.option_id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;
        total += chosen.score;
    }

    let risk_score = (total / Decimal::from(questions.len() as i64)).round_dp(2);
    let level = RiskLevel::from_score(risk_score);

    let output = RiskProfileOutput {
        risk_score,
        risk_level: level,
        label: level.label().to_string(),
        description: level.description().to_string(),
        questions_answered: questions.len(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mean survey option score with 13.3 / 23.3 band ceilings",
        &serde_json::json!({
            "questions": questions.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn survey() -> RiskSurvey {
        let question = |text: &str| SurveyQuestion {
            question_text: text.into(),
            options: vec![
                SurveyOption { option_id: "A".into(), option_text: "Cautious".into(), score: dec!(5) },
                SurveyOption { option_id: "B".into(), option_text: "Balanced".into(), score: dec!(20) },
                SurveyOption { option_id: "C".into(), option_text: "Aggressive".into(), score: dec!(35) },
            ],
        };
        RiskSurvey {
            risk_questions: vec![question("Horizon?"), question("Drawdown?"), question("Goal?")],
        }
    }

    fn run(answers: &[&str]) -> AllocationResult<ComputationOutput<RiskProfileOutput>> {
        score_survey(&RiskProfileInput {
            survey: survey(),
            answers: answers.iter().map(|a| a.to_string()).collect(),
        })
    }

    #[test]
    fn test_low_profile() {
        let out = run(&["a", "A", "a"]).unwrap();
        assert_eq!(out.result.risk_score, dec!(5));
        assert_eq!(out.result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_medium_profile_rounding() {
        // (5 + 20 + 35) / 3 = 20
        let out = run(&["A", "B", "C"]).unwrap();
        assert_eq!(out.result.risk_score, dec!(20));
        assert_eq!(out.result.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_high_profile() {
        let out = run(&["C", "C", "B"]).unwrap();
        assert_eq!(out.result.risk_score, dec!(30));
        assert_eq!(out.result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(RiskLevel::from_score(dec!(13.3)), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(dec!(13.31)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(dec!(23.3)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(dec!(23.31)), RiskLevel::High);
    }

    #[test]
    fn test_unknown_option_rejected() {
        assert!(run(&["A", "Z", "A"]).is_err());
    }

    #[test]
    fn test_answer_count_mismatch() {
        assert!(run(&["A"]).is_err());
    }

    #[test]
    fn test_empty_survey() {
        let input = RiskProfileInput {
            survey: RiskSurvey::default(),
            answers: vec![],
        };
        assert!(matches!(
            score_survey(&input).unwrap_err(),
            AllocationError::InsufficientData(_)
        ));
    }
}
