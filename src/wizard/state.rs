use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::AnswerSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Welcome,
    Questions,
    Complete,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Welcome => "welcome",
            WizardStep::Questions => "questions",
            WizardStep::Complete => "complete",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WizardStep {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "welcome" => Ok(WizardStep::Welcome),
            "questions" => Ok(WizardStep::Questions),
            "complete" => Ok(WizardStep::Complete),
            other => Err(format!("unknown wizard step '{other}'")),
        }
    }
}

/// Last navigation direction. Presentation only; drives slide transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Complete wizard state. Transitions take it by value and hand back the
/// successor.
///
/// `current_question_index` is only meaningful while `step` is `Questions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    pub step: WizardStep,
    pub current_question_index: usize,
    pub direction: Direction,
    pub answers: AnswerSet,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }
}
