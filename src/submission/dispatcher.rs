//! Fire-and-forget submission dispatch.
//!
//! Every request runs on its own task. There is no retry and no
//! cancellation: a request runs to success or failure and then publishes
//! exactly one event.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{SubmissionPayload, SubmissionRequest, SubmissionSink, SubmissionTrigger, Submitter};
use crate::catalog::QuestionCatalog;

/// Receiver end of the submission event channel.
pub type SubmissionEvents = mpsc::UnboundedReceiver<SubmissionEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Warning,
}

/// One-shot user-facing message about a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn submitted() -> Self {
        Self {
            level: NotificationLevel::Success,
            title: "Response Submitted Successfully!".into(),
            description: "Thank you for your response. We will contact you soon.".into(),
        }
    }

    pub fn submission_failed() -> Self {
        Self {
            level: NotificationLevel::Warning,
            title: "Submission Failed".into(),
            description: "Your responses could not be sent. Please check your connection and try again.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Succeeded,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionEvent {
    pub submission_id: Uuid,
    pub trigger: SubmissionTrigger,
    pub outcome: SubmissionOutcome,
    pub notification: Notification,
    pub fingerprint: String,
    pub settled_at: DateTime<Utc>,
}

impl SubmissionEvent {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, SubmissionOutcome::Succeeded)
    }
}

/// Spawns one task per request on a tokio runtime and publishes the result.
#[derive(Clone)]
pub struct SubmissionDispatcher {
    catalog: Arc<QuestionCatalog>,
    submitter: Arc<dyn Submitter>,
    runtime: Handle,
    events: mpsc::UnboundedSender<SubmissionEvent>,
    in_flight: Arc<AtomicUsize>,
}

impl SubmissionDispatcher {
    /// Binds to the runtime of the calling context.
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        submitter: Arc<dyn Submitter>,
    ) -> Result<(Self, SubmissionEvents)> {
        let runtime =
            Handle::try_current().context("Submission dispatcher needs a tokio runtime")?;
        Ok(Self::with_handle(catalog, submitter, runtime))
    }

    pub fn with_handle(
        catalog: Arc<QuestionCatalog>,
        submitter: Arc<dyn Submitter>,
        runtime: Handle,
    ) -> (Self, SubmissionEvents) {
        let (events, receiver) = mpsc::unbounded_channel();
        let dispatcher = Self {
            catalog,
            submitter,
            runtime,
            events,
            in_flight: Arc::new(AtomicUsize::new(0)),
        };
        (dispatcher, receiver)
    }

    /// Number of submissions dispatched but not yet settled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl SubmissionSink for SubmissionDispatcher {
    fn dispatch(&self, request: SubmissionRequest) {
        let payload = SubmissionPayload::build(&self.catalog, &request.answers);
        let fingerprint = payload.fingerprint();
        let submitter = Arc::clone(&self.submitter);
        let events = self.events.clone();
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);
        info!(
            submission_id = %request.submission_id,
            trigger = ?request.trigger,
            fingerprint = %fingerprint,
            "dispatching submission"
        );

        self.runtime.spawn(async move {
            let outcome = match submitter.submit(&payload).await {
                Ok(()) => {
                    info!(submission_id = %request.submission_id, "submission delivered");
                    SubmissionOutcome::Succeeded
                }
                Err(err) => {
                    warn!(
                        submission_id = %request.submission_id,
                        error = %format!("{err:#}"),
                        "submission failed"
                    );
                    SubmissionOutcome::Failed {
                        reason: format!("{err:#}"),
                    }
                }
            };
            let notification = match outcome {
                SubmissionOutcome::Succeeded => Notification::submitted(),
                SubmissionOutcome::Failed { .. } => Notification::submission_failed(),
            };
            let event = SubmissionEvent {
                submission_id: request.submission_id,
                trigger: request.trigger,
                outcome,
                notification,
                fingerprint,
                settled_at: Utc::now(),
            };
            in_flight.fetch_sub(1, Ordering::SeqCst);
            // Nobody listening is fine; the result was already logged.
            let _ = events.send(event);
        });
    }
}
