use formwizard::catalog::feedback_catalog;
use formwizard::store::MemoryBackend;
use formwizard::submission::{NotificationLevel, SubmissionOutcome, SubmissionTrigger};
use formwizard::wizard::{Navigation, WizardStep};

use crate::support::{ten_question_catalog, RecordingSubmitter, WizardFixture};

fn answer_required_and_finish(fixture: &mut WizardFixture<MemoryBackend>) -> Navigation {
    let wizard = &mut fixture.wizard;
    wizard.start().unwrap();
    wizard.set_answer("choice", "B").unwrap();
    wizard.set_answer("name", "Ada").unwrap();
    wizard.next().unwrap();
    wizard.set_answer("email", "ada@example.org").unwrap();
    wizard.next().unwrap();
    wizard.next().unwrap();
    wizard.next().unwrap();
    wizard.set_answer("rating", "Okay").unwrap();
    for _ in 6..9 {
        wizard.next().unwrap();
    }
    wizard.next().unwrap()
}

#[tokio::test]
async fn completing_submits_every_question_once() {
    let (mut fixture, _) = WizardFixture::in_memory(ten_question_catalog());
    let nav = answer_required_and_finish(&mut fixture);
    let submission_id = match nav {
        Navigation::Completed { submission_id } => submission_id,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(fixture.wizard.state().step, WizardStep::Complete);

    let event = fixture.next_event().await;
    assert_eq!(event.submission_id, submission_id);
    assert_eq!(event.trigger, SubmissionTrigger::Completed);
    assert_eq!(event.outcome, SubmissionOutcome::Succeeded);
    assert_eq!(event.notification.level, NotificationLevel::Success);
    assert_eq!(fixture.submitter.calls(), 1);

    let payload = &fixture.submitter.payloads()[0];
    let object = payload.as_object().unwrap();
    assert_eq!(object.len(), 10);
    assert_eq!(payload["Choice"], "B");
    assert_eq!(payload["Email"], "ada@example.org");
    assert_eq!(payload["Rating"], "Okay");
    assert_eq!(payload["Phone"], "");
    assert_eq!(payload["Comments"], "");
}

#[tokio::test]
async fn acknowledged_success_clears_answers_but_stays_complete() {
    let (mut fixture, backend) = WizardFixture::in_memory(ten_question_catalog());
    answer_required_and_finish(&mut fixture);
    let event = fixture.next_event().await;

    assert!(fixture.wizard.acknowledge(&event));
    assert_eq!(fixture.wizard.state().step, WizardStep::Complete);
    assert!(fixture.wizard.state().answers.is_empty());
    assert_eq!(backend.entry("answers").as_deref(), Some("{}"));

    // Restart after the clear submits an empty snapshot.
    fixture.wizard.restart().unwrap();
    let restart = fixture.next_event().await;
    assert_eq!(restart.trigger, SubmissionTrigger::Restart);
    assert!(!fixture.wizard.acknowledge(&restart));
    let payload = &fixture.submitter.payloads()[1];
    assert_eq!(payload["Choice"], "");
    assert_eq!(payload["Name"], "");
}

#[tokio::test]
async fn failed_submission_still_completes_with_a_warning() {
    let mut fixture = WizardFixture::with_backend(
        ten_question_catalog(),
        MemoryBackend::new(),
        RecordingSubmitter::failing(),
    );
    let nav = answer_required_and_finish(&mut fixture);
    assert!(matches!(nav, Navigation::Completed { .. }));
    assert_eq!(fixture.wizard.state().step, WizardStep::Complete);

    let event = fixture.next_event().await;
    assert!(!event.succeeded());
    assert!(matches!(event.outcome, SubmissionOutcome::Failed { .. }));
    assert_eq!(event.notification.level, NotificationLevel::Warning);

    assert!(fixture.wizard.submission_pending());
    assert!(!fixture.wizard.acknowledge(&event));
    assert!(!fixture.wizard.submission_pending());
    assert_eq!(fixture.wizard.state().answers.get("name"), "Ada");
}

#[tokio::test]
async fn late_acknowledgement_after_restart_keeps_new_progress() {
    let (mut fixture, _) = WizardFixture::in_memory(ten_question_catalog());
    answer_required_and_finish(&mut fixture);
    fixture.wizard.restart().unwrap();
    fixture.wizard.start().unwrap();
    fixture.wizard.set_answer("choice", "A").unwrap();

    let first = fixture.next_event().await;
    let second = fixture.next_event().await;
    for event in [first, second] {
        assert!(!fixture.wizard.acknowledge(&event));
    }
    assert_eq!(fixture.wizard.state().answers.get("choice"), "A");
    assert_eq!(fixture.submitter.calls(), 2);
}

#[tokio::test]
async fn feedback_catalog_payload_uses_capitalized_keys() {
    let catalog = feedback_catalog();
    let (mut fixture, _) = WizardFixture::in_memory(catalog.clone());
    fixture.wizard.start().unwrap();
    for question in catalog.iter().take(9) {
        let option = question.options[0].clone();
        fixture.wizard.set_answer(&question.id, &option).unwrap();
    }
    fixture
        .wizard
        .set_answer("additionalFeedback", "More examples please")
        .unwrap();
    assert!(matches!(
        fixture.wizard.next().unwrap(),
        Navigation::Completed { .. }
    ));

    fixture.next_event().await;
    let payload = &fixture.submitter.payloads()[0];
    assert_eq!(payload["AdditionalFeedback"], "More examples please");
    assert_eq!(payload["OverallSatisfaction"], "Very satisfied");
    assert_eq!(payload["LessonClarity"], "Clear");
}
