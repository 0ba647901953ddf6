//! Linear wizard: welcome, then one question at a time, then complete.

mod controller;
mod state;
pub mod transitions;

pub use controller::{Navigation, QuestionView, WizardController, WizardView};
pub use state::{Direction, WizardState, WizardStep};
pub use transitions::{Effect, Outcome, Transition, WizardContext};

use thiserror::Error;

/// Operation requested in a state where it is not available.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("'{operation}' is not available on the {step} step")]
    WrongStep {
        operation: &'static str,
        step: WizardStep,
    },
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    /// Only reachable with a hand-built state; loaded progress is clamped.
    #[error("question index {index} is outside a catalog of {len} questions")]
    IndexOutOfRange { index: usize, len: usize },
}
