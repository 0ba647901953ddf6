use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::transitions::{self, Effect, Outcome, Transition, WizardContext};
use super::{Direction, WizardError, WizardState, WizardStep};
use crate::catalog::{CatalogError, Question, QuestionCatalog};
use crate::store::{KeyValueBackend, ProgressStore};
use crate::submission::{SubmissionEvent, SubmissionRequest, SubmissionSink, SubmissionTrigger};
use crate::validation::{GatingPolicy, RuleTable, ValidationResult};

/// Result of a user intent that the wizard accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Started,
    Advanced { index: usize },
    Retreated { index: usize },
    Edited,
    Stayed,
    Completed { submission_id: Uuid },
    Restarted { submission_id: Uuid },
    Blocked { question_id: String, message: String },
}

/// What the presentation layer should render for the current question.
#[derive(Debug, Clone)]
pub struct QuestionView<'a> {
    pub question: &'a Question,
    /// 1-based.
    pub number: usize,
    pub total: usize,
    pub value: &'a str,
    pub can_go_next: bool,
    pub is_first: bool,
    pub is_last: bool,
    /// Inline validation message. Never reported for a blank answer.
    pub error: Option<String>,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub enum WizardView<'a> {
    Welcome,
    Question(QuestionView<'a>),
    Complete,
}

/// Drives the wizard: applies transitions, persists after every change and
/// hands submissions to the sink without waiting for them.
///
/// Persistence is best effort. A failed write is logged and the in-memory
/// state stays authoritative.
pub struct WizardController<B: KeyValueBackend> {
    catalog: Arc<QuestionCatalog>,
    rules: RuleTable,
    policy: GatingPolicy,
    progress: ProgressStore<B>,
    sink: Arc<dyn SubmissionSink>,
    state: WizardState,
    pending_completion: Option<Uuid>,
}

impl<B: KeyValueBackend> WizardController<B> {
    /// Builds a controller from whatever progress `progress` holds. A stored
    /// `questions` step resumes at its question with its answers.
    pub fn resume(
        catalog: Arc<QuestionCatalog>,
        progress: ProgressStore<B>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Result<Self, CatalogError> {
        let rules = RuleTable::for_catalog(&catalog)?;
        let state = progress.load(catalog.len());
        info!(
            step = %state.step,
            index = state.current_question_index,
            answered = state.answers.len(),
            "wizard resumed"
        );
        Ok(Self {
            catalog,
            rules,
            policy: GatingPolicy::default(),
            progress,
            sink,
            state,
            pending_completion: None,
        })
    }

    pub fn with_policy(mut self, policy: GatingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the derived rule table.
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> GatingPolicy {
        self.policy
    }

    pub fn progress(&self) -> &ProgressStore<B> {
        &self.progress
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.state.step != WizardStep::Questions {
            return None;
        }
        self.catalog.get(self.state.current_question_index)
    }

    pub fn start(&mut self) -> Result<Navigation, WizardError> {
        self.apply(transitions::start)
    }

    pub fn next(&mut self) -> Result<Navigation, WizardError> {
        let ctx = WizardContext {
            catalog: &self.catalog,
            rules: &self.rules,
            policy: self.policy,
        };
        let state = std::mem::take(&mut self.state);
        let transition = transitions::next(state, &ctx);
        self.settle(transition)
    }

    pub fn previous(&mut self) -> Result<Navigation, WizardError> {
        self.apply(transitions::previous)
    }

    /// Records an answer; may auto-advance (see [`transitions::edit`]).
    pub fn set_answer(&mut self, question_id: &str, value: &str) -> Result<Navigation, WizardError> {
        let ctx = WizardContext {
            catalog: &self.catalog,
            rules: &self.rules,
            policy: self.policy,
        };
        let state = std::mem::take(&mut self.state);
        let transition = transitions::edit(state, &ctx, question_id, value);
        self.settle(transition)
    }

    pub fn restart(&mut self) -> Result<Navigation, WizardError> {
        self.apply(transitions::restart)
    }

    /// Full validation of the current answer, for inline display.
    pub fn validate_current(&self) -> ValidationResult {
        match self.current_question() {
            Some(question) => self
                .rules
                .validate(&question.id, self.state.answers.get(&question.id)),
            None => ValidationResult::Valid,
        }
    }

    pub fn can_go_next(&self) -> bool {
        let ctx = WizardContext {
            catalog: &self.catalog,
            rules: &self.rules,
            policy: self.policy,
        };
        self.current_question()
            .map(|question| ctx.blocking_message(question, &self.state.answers).is_none())
            .unwrap_or(false)
    }

    pub fn view(&self) -> WizardView<'_> {
        match self.state.step {
            WizardStep::Welcome => WizardView::Welcome,
            WizardStep::Complete => WizardView::Complete,
            WizardStep::Questions => {
                let Some(question) = self.current_question() else {
                    return WizardView::Welcome;
                };
                let index = self.state.current_question_index;
                let value = self.state.answers.get(&question.id);
                let error = if value.trim().is_empty() {
                    None
                } else {
                    self.validate_current().message().map(str::to_string)
                };
                WizardView::Question(QuestionView {
                    question,
                    number: index + 1,
                    total: self.catalog.len(),
                    value,
                    can_go_next: self.can_go_next(),
                    is_first: index == 0,
                    is_last: index == self.catalog.last_index(),
                    error,
                    direction: self.state.direction,
                })
            }
        }
    }

    /// True from completion until the completion submission's event has been
    /// acknowledged.
    pub fn submission_pending(&self) -> bool {
        self.pending_completion.is_some()
    }

    /// Feeds a settled submission back into the wizard. A successful
    /// completion submission clears the answers while the wizard still shows
    /// the completion step. Returns true when the answers were cleared.
    pub fn acknowledge(&mut self, event: &SubmissionEvent) -> bool {
        if event.trigger != SubmissionTrigger::Completed
            || self.pending_completion != Some(event.submission_id)
        {
            return false;
        }
        self.pending_completion = None;
        if !event.succeeded() || self.state.step != WizardStep::Complete {
            return false;
        }
        self.state.answers.clear();
        self.persist();
        true
    }

    fn apply(&mut self, transition: fn(WizardState) -> Transition) -> Result<Navigation, WizardError> {
        let state = std::mem::take(&mut self.state);
        self.settle(transition(state))
    }

    fn settle(&mut self, transition: Transition) -> Result<Navigation, WizardError> {
        let mutated = transition.mutated();
        let Transition {
            state,
            outcome,
            effect,
        } = transition;
        self.state = state;
        if mutated {
            self.persist();
        }

        let submission_id = effect.map(|effect| self.dispatch(effect));
        let navigation = match outcome {
            Outcome::Started => Navigation::Started,
            Outcome::Advanced(index) => Navigation::Advanced { index },
            Outcome::Retreated(index) => Navigation::Retreated { index },
            Outcome::Edited => Navigation::Edited,
            Outcome::Stayed => Navigation::Stayed,
            Outcome::Completed => Navigation::Completed {
                submission_id: submission_id.unwrap_or_default(),
            },
            Outcome::Restarted => Navigation::Restarted {
                submission_id: submission_id.unwrap_or_default(),
            },
            Outcome::Blocked {
                question_id,
                message,
            } => {
                debug!(question_id = %question_id, reason = %message, "forward navigation blocked");
                Navigation::Blocked {
                    question_id,
                    message,
                }
            }
            Outcome::Refused(err) => {
                debug!(error = %err, "wizard intent refused");
                return Err(err);
            }
        };
        Ok(navigation)
    }

    fn dispatch(&mut self, effect: Effect) -> Uuid {
        let Effect::Submit { trigger, answers } = effect;
        let request = SubmissionRequest::new(trigger, answers);
        let submission_id = request.submission_id;
        if trigger == SubmissionTrigger::Completed {
            self.pending_completion = Some(submission_id);
        }
        self.sink.dispatch(request);
        submission_id
    }

    fn persist(&mut self) {
        if let Err(err) = self.progress.save(&self.state) {
            warn!(error = %err, "failed to persist wizard progress; continuing in memory");
        }
    }
}
