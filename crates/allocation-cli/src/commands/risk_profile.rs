use allocation_core::risk_profile::{self, RiskProfileInput, RiskSurvey};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

use super::envelope;
use crate::config::Settings;
use crate::input;
use crate::store;

/// Arguments for scoring the risk profile survey
#[derive(Args)]
pub struct RiskProfileArgs {
    /// Path to JSON file with a RiskProfileInput (survey + answers)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Survey file; defaults to the configured one
    #[arg(long)]
    pub survey: Option<PathBuf>,

    /// Comma-separated option ids, one per question (e.g. "a,c,b")
    #[arg(long, value_delimiter = ',')]
    pub answers: Option<Vec<String>>,

    /// Person to attach the resulting score to; only used with --save
    #[arg(long)]
    pub person: Option<String>,

    /// Write the score back to the people file (requires --person)
    #[arg(long, requires = "person")]
    pub save: bool,
}

pub fn run_risk_profile(args: RiskProfileArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let profile_input: RiskProfileInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(answers) = args.answers {
        let survey_path = args.survey.as_ref().unwrap_or(&settings.survey);
        let survey: RiskSurvey = input::file::read_json(survey_path)?;
        RiskProfileInput { survey, answers }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("Provide --input, --answers or pipe JSON via stdin".into());
    };

    let mut result = risk_profile::score_survey(&profile_input)?;

    if let Some(ref selector) = args.person {
        if args.save {
            let mut people = store::load_people(&settings.people)?;
            let idx = store::find_person(&people, selector)
                .ok_or_else(|| format!("No person '{}' in {}", selector, settings.people.display()))?;
            people[idx].risk_score = Some(result.result.risk_score);
            store::save_people(&settings.people, &people)?;
            tracing::info!(person = %people[idx].name, score = %result.result.risk_score, "risk score saved");
        } else {
            result
                .warnings
                .push(format!("Score not saved for '{selector}'; pass --save to record it"));
        }
    }

    envelope(result, &[])
}
