use anyhow::{anyhow, Result};
use async_trait::async_trait;
use formwizard::catalog::{Question, QuestionCatalog, QuestionKind};
use formwizard::store::{KeyValueBackend, MemoryBackend, ProgressStore};
use formwizard::submission::{
    SubmissionDispatcher, SubmissionEvent, SubmissionEvents, SubmissionPayload, Submitter,
};
use formwizard::wizard::WizardController;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Submitter that records every payload it receives.
#[derive(Default)]
pub struct RecordingSubmitter {
    payloads: Mutex<Vec<serde_json::Value>>,
    fail: AtomicBool,
}

impl RecordingSubmitter {
    pub fn failing() -> Self {
        let submitter = Self::default();
        submitter.fail.store(true, Ordering::SeqCst);
        submitter
    }

    pub fn calls(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }

    pub fn payloads(&self) -> Vec<serde_json::Value> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Submitter for RecordingSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<()> {
        self.payloads
            .lock()
            .unwrap()
            .push(serde_json::to_value(payload)?);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("endpoint unreachable"));
        }
        Ok(())
    }
}

/// Ten questions: a required A/B select first, a required short text, then
/// a mix of optional and required fields ending on an optional free text.
pub fn ten_question_catalog() -> QuestionCatalog {
    let mut questions = vec![
        Question::select("choice", "Pick one", ["A", "B"]).required(),
        Question::new("name", QuestionKind::ShortText, "Your name").required(),
        Question::new("email", QuestionKind::Email, "Email").required(),
        Question::new("phone", QuestionKind::Phone, "Phone"),
        Question::new("birthday", QuestionKind::Date, "Birthday"),
        Question::select("rating", "Rating", ["Good", "Okay", "Poor"]).required(),
    ];
    for n in 7..=9 {
        questions.push(Question::new(
            format!("extra{n}"),
            QuestionKind::ShortText,
            format!("Extra {n}"),
        ));
    }
    questions.push(Question::new(
        "comments",
        QuestionKind::MultiLineText,
        "Comments",
    ));
    QuestionCatalog::new(questions).expect("test catalog is valid")
}

pub struct WizardFixture<B: KeyValueBackend> {
    pub wizard: WizardController<B>,
    pub submitter: Arc<RecordingSubmitter>,
    pub events: SubmissionEvents,
}

impl<B: KeyValueBackend> WizardFixture<B> {
    pub fn with_backend(catalog: QuestionCatalog, backend: B, submitter: RecordingSubmitter) -> Self {
        let catalog = Arc::new(catalog);
        let submitter = Arc::new(submitter);
        let (dispatcher, events) =
            SubmissionDispatcher::new(Arc::clone(&catalog), submitter.clone())
                .expect("tests run inside a tokio runtime");
        let wizard =
            WizardController::resume(catalog, ProgressStore::new(backend), Arc::new(dispatcher))
                .expect("catalog rules compile");
        Self {
            wizard,
            submitter,
            events,
        }
    }

    /// Waits for the next settled submission.
    pub async fn next_event(&mut self) -> SubmissionEvent {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("submission settled in time")
            .expect("event channel open")
    }
}

impl WizardFixture<MemoryBackend> {
    pub fn in_memory(catalog: QuestionCatalog) -> (Self, MemoryBackend) {
        let backend = MemoryBackend::new();
        let fixture = Self::with_backend(catalog, backend.clone(), RecordingSubmitter::default());
        (fixture, backend)
    }
}
