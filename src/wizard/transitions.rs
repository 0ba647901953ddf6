//! Pure state transitions.
//!
//! Each function takes the current [`WizardState`] by value and returns the
//! successor together with what happened and any side effect the caller has
//! to carry out. Nothing here persists or talks to the network.

use super::{Direction, WizardError, WizardState, WizardStep};
use crate::catalog::{Question, QuestionCatalog};
use crate::store::AnswerSet;
use crate::submission::SubmissionTrigger;
use crate::validation::{validate, GatingPolicy, RuleTable};

/// Read-only inputs shared by every transition.
#[derive(Debug, Clone, Copy)]
pub struct WizardContext<'a> {
    pub catalog: &'a QuestionCatalog,
    pub rules: &'a RuleTable,
    pub policy: GatingPolicy,
}

impl<'a> WizardContext<'a> {
    /// Returns the reason `question` currently blocks forward navigation.
    pub fn blocking_message(&self, question: &Question, answers: &AnswerSet) -> Option<String> {
        let value = answers.get(&question.id);
        match self.policy {
            GatingPolicy::RequiredOnly => {
                if question.required && value.trim().is_empty() {
                    let message = validate(self.rules, &question.id, value)
                        .message()
                        .map(str::to_string)
                        .unwrap_or_else(|| "This field is required".to_string());
                    Some(message)
                } else {
                    None
                }
            }
            GatingPolicy::Strict => validate(self.rules, &question.id, value)
                .message()
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Started,
    Advanced(usize),
    Retreated(usize),
    Edited,
    /// Nothing to do, e.g. `previous` on the first question.
    Stayed,
    Completed,
    Restarted,
    Blocked {
        question_id: String,
        message: String,
    },
    Refused(WizardError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit {
        trigger: SubmissionTrigger,
        answers: AnswerSet,
    },
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub state: WizardState,
    pub outcome: Outcome,
    pub effect: Option<Effect>,
}

impl Transition {
    fn plain(state: WizardState, outcome: Outcome) -> Self {
        Self {
            state,
            outcome,
            effect: None,
        }
    }

    fn refused(state: WizardState, operation: &'static str) -> Self {
        let step = state.step;
        Self::plain(state, Outcome::Refused(WizardError::WrongStep { operation, step }))
    }

    /// True when the state may differ from the input.
    pub fn mutated(&self) -> bool {
        !matches!(
            self.outcome,
            Outcome::Stayed | Outcome::Blocked { .. } | Outcome::Refused(_)
        )
    }
}

/// `welcome -> questions`, index reset to the first question.
pub fn start(mut state: WizardState) -> Transition {
    if state.step != WizardStep::Welcome {
        return Transition::refused(state, "start");
    }
    state.step = WizardStep::Questions;
    state.current_question_index = 0;
    state.direction = Direction::Forward;
    Transition::plain(state, Outcome::Started)
}

/// Advances one question, or completes the wizard from the last question.
pub fn next(mut state: WizardState, ctx: &WizardContext<'_>) -> Transition {
    if state.step != WizardStep::Questions {
        return Transition::refused(state, "next");
    }
    let index = state.current_question_index;
    let Some(question) = ctx.catalog.get(index) else {
        let len = ctx.catalog.len();
        return Transition::plain(
            state,
            Outcome::Refused(WizardError::IndexOutOfRange { index, len }),
        );
    };
    if let Some(message) = ctx.blocking_message(question, &state.answers) {
        let question_id = question.id.clone();
        return Transition::plain(
            state,
            Outcome::Blocked {
                question_id,
                message,
            },
        );
    }

    if index < ctx.catalog.last_index() {
        state.current_question_index = index + 1;
        state.direction = Direction::Forward;
        let index = state.current_question_index;
        return Transition::plain(state, Outcome::Advanced(index));
    }

    state.step = WizardStep::Complete;
    let answers = state.answers.clone();
    Transition {
        state,
        outcome: Outcome::Completed,
        effect: Some(Effect::Submit {
            trigger: SubmissionTrigger::Completed,
            answers,
        }),
    }
}

/// Goes back one question. A no-op on the first question.
pub fn previous(mut state: WizardState) -> Transition {
    if state.step != WizardStep::Questions {
        return Transition::refused(state, "previous");
    }
    if state.current_question_index == 0 {
        return Transition::plain(state, Outcome::Stayed);
    }
    state.current_question_index -= 1;
    state.direction = Direction::Backward;
    let index = state.current_question_index;
    Transition::plain(state, Outcome::Retreated(index))
}

/// Records an answer. Editing the current single-select question advances
/// immediately, exactly as if `next` had been requested.
pub fn edit(
    mut state: WizardState,
    ctx: &WizardContext<'_>,
    question_id: &str,
    value: &str,
) -> Transition {
    if state.step != WizardStep::Questions {
        return Transition::refused(state, "set_answer");
    }
    let Some(position) = ctx.catalog.position(question_id) else {
        return Transition::plain(
            state,
            Outcome::Refused(WizardError::UnknownQuestion(question_id.to_string())),
        );
    };
    state.answers.set(question_id, value);

    let auto_advance = position == state.current_question_index
        && ctx
            .catalog
            .get(position)
            .map(|q| q.kind.is_select())
            .unwrap_or(false);
    if !auto_advance {
        return Transition::plain(state, Outcome::Edited);
    }

    let advanced = next(state, ctx);
    match advanced.outcome {
        // The edit itself still happened.
        Outcome::Blocked { .. } => Transition::plain(advanced.state, Outcome::Edited),
        _ => advanced,
    }
}

/// `complete -> welcome`: resubmits the current answers, then clears them.
pub fn restart(mut state: WizardState) -> Transition {
    if state.step != WizardStep::Complete {
        return Transition::refused(state, "restart");
    }
    let answers = state.answers.clone();
    state.step = WizardStep::Welcome;
    state.current_question_index = 0;
    state.direction = Direction::Forward;
    state.answers.clear();
    Transition {
        state,
        outcome: Outcome::Restarted,
        effect: Some(Effect::Submit {
            trigger: SubmissionTrigger::Restart,
            answers,
        }),
    }
}
