use tracing::warn;

use super::{AnswerSet, KeyValueBackend, StoreError};
use crate::wizard::{Direction, WizardState, WizardStep};

pub const CURRENT_STEP_KEY: &str = "currentStep";
pub const CURRENT_QUESTION_INDEX_KEY: &str = "currentQuestionIndex";
pub const ANSWERS_KEY: &str = "answers";

/// Encodes wizard progress as three independent entries: the step name, the
/// question index as a decimal string and the answers as a JSON object.
#[derive(Debug, Clone)]
pub struct ProgressStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> ProgressStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Restores persisted progress for a catalog of `question_count`
    /// questions.
    ///
    /// Missing entries fall back to their defaults. Unreadable or corrupt
    /// entries are logged and replaced by defaults too, so a damaged store
    /// never prevents the wizard from starting.
    pub fn load(&self, question_count: usize) -> WizardState {
        let step = match self.read(CURRENT_STEP_KEY) {
            Some(raw) => raw.parse::<WizardStep>().unwrap_or_else(|err| {
                warn!(error = %err, "ignoring persisted step");
                WizardStep::Welcome
            }),
            None => WizardStep::Welcome,
        };

        let mut index = match self.read(CURRENT_QUESTION_INDEX_KEY) {
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|err| {
                warn!(value = %raw, error = %err, "ignoring persisted question index");
                0
            }),
            None => 0,
        };
        let last = question_count.saturating_sub(1);
        if index > last {
            warn!(index, last, "persisted question index out of range, clamping");
            index = last;
        }

        let answers = match self.read(ANSWERS_KEY) {
            Some(raw) => serde_json::from_str::<AnswerSet>(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "ignoring persisted answers");
                AnswerSet::new()
            }),
            None => AnswerSet::new(),
        };

        WizardState {
            step,
            current_question_index: index,
            direction: Direction::Forward,
            answers,
        }
    }

    /// Writes all three entries, step last, so a stored step never points at
    /// data that was not written. If any write fails, the entries written so
    /// far are restored to their previous values and the error is returned.
    pub fn save(&mut self, state: &WizardState) -> Result<(), StoreError> {
        let entries = [
            (ANSWERS_KEY, serde_json::to_string(&state.answers)?),
            (
                CURRENT_QUESTION_INDEX_KEY,
                state.current_question_index.to_string(),
            ),
            (CURRENT_STEP_KEY, state.step.as_str().to_string()),
        ];
        let mut written: Vec<(&'static str, Option<String>)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let previous = match self.backend.get(key) {
                Ok(previous) => previous,
                Err(err) => {
                    self.roll_back(written);
                    return Err(err);
                }
            };
            if let Err(err) = self.backend.set(key, &value) {
                self.roll_back(written);
                return Err(err);
            }
            written.push((key, previous));
        }
        Ok(())
    }

    /// Removes every entry, so the next load starts at the welcome step.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.backend.remove(CURRENT_STEP_KEY)?;
        self.backend.remove(CURRENT_QUESTION_INDEX_KEY)?;
        self.backend.remove(ANSWERS_KEY)?;
        Ok(())
    }

    fn roll_back(&mut self, written: Vec<(&'static str, Option<String>)>) {
        for (key, previous) in written.into_iter().rev() {
            let restored = match &previous {
                Some(value) => self.backend.set(key, value),
                None => self.backend.remove(key),
            };
            if let Err(err) = restored {
                warn!(key, error = %err, "failed to roll back progress entry");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed to read persisted progress entry");
                None
            }
        }
    }
}
