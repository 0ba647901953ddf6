use formwizard::catalog::{Question, QuestionCatalog, QuestionKind};
use formwizard::validation::GatingPolicy;
use formwizard::wizard::{Direction, Navigation, WizardStep};

use crate::support::{ten_question_catalog, WizardFixture};

fn valid_answer(question: &Question) -> String {
    match question.kind {
        QuestionKind::SingleSelect => question.options[0].clone(),
        QuestionKind::Email => "ada@example.org".into(),
        QuestionKind::Phone => "+44 20 7946 0958".into(),
        QuestionKind::Date => "1990-12-10".into(),
        QuestionKind::ShortText | QuestionKind::MultiLineText => "Ada".into(),
    }
}

#[tokio::test]
async fn required_questions_gate_forward_navigation() {
    let catalog = ten_question_catalog();
    let (mut fixture, _) = WizardFixture::in_memory(catalog.clone());
    let wizard = &mut fixture.wizard;
    assert_eq!(wizard.start().unwrap(), Navigation::Started);

    for (index, question) in catalog.iter().enumerate() {
        assert_eq!(wizard.state().current_question_index, index);
        if !question.required {
            let nav = wizard.next().unwrap();
            if index == catalog.last_index() {
                assert!(matches!(nav, Navigation::Completed { .. }));
            } else {
                assert_eq!(nav, Navigation::Advanced { index: index + 1 });
            }
            continue;
        }

        assert!(
            matches!(wizard.next().unwrap(), Navigation::Blocked { ref question_id, .. } if question_id == &question.id),
            "blank required '{}' must block",
            question.id
        );
        wizard.set_answer(&question.id, " \t ").unwrap();
        assert!(matches!(wizard.next().unwrap(), Navigation::Blocked { .. }));
        assert_eq!(wizard.state().current_question_index, index);

        let answer = valid_answer(question);
        let nav = wizard.set_answer(&question.id, &answer).unwrap();
        if question.kind.is_select() {
            assert_eq!(nav, Navigation::Advanced { index: index + 1 });
        } else {
            assert_eq!(nav, Navigation::Edited);
            assert_eq!(wizard.next().unwrap(), Navigation::Advanced { index: index + 1 });
        }
    }
    assert_eq!(wizard.state().step, WizardStep::Complete);
}

#[tokio::test]
async fn optional_questions_accept_any_content() {
    let (mut fixture, _) = WizardFixture::in_memory(ten_question_catalog());
    let wizard = &mut fixture.wizard;
    wizard.start().unwrap();
    wizard.set_answer("choice", "A").unwrap();
    wizard.set_answer("name", "Ada").unwrap();
    wizard.next().unwrap();
    wizard.set_answer("email", "ada@example.org").unwrap();
    wizard.next().unwrap();

    assert_eq!(wizard.state().current_question_index, 3);
    wizard.set_answer("phone", "call me maybe").unwrap();
    assert!(!wizard.validate_current().is_valid());
    assert_eq!(wizard.next().unwrap(), Navigation::Advanced { index: 4 });
    assert_eq!(wizard.next().unwrap(), Navigation::Advanced { index: 5 });
}

#[tokio::test]
async fn required_only_gating_lets_malformed_values_through() {
    let (mut fixture, _) = WizardFixture::in_memory(ten_question_catalog());
    let wizard = &mut fixture.wizard;
    wizard.start().unwrap();
    wizard.set_answer("choice", "A").unwrap();
    wizard.set_answer("name", "Ada").unwrap();
    wizard.next().unwrap();
    wizard.set_answer("email", "not-an-email").unwrap();
    assert_eq!(
        wizard.validate_current().message(),
        Some("Please enter a valid email address")
    );
    assert_eq!(wizard.next().unwrap(), Navigation::Advanced { index: 3 });
}

#[tokio::test]
async fn strict_gating_blocks_malformed_values() {
    let (fixture, _) = WizardFixture::in_memory(ten_question_catalog());
    let mut wizard = fixture.wizard.with_policy(GatingPolicy::Strict);
    wizard.start().unwrap();
    wizard.set_answer("choice", "A").unwrap();
    wizard.set_answer("name", "Ada").unwrap();
    wizard.next().unwrap();
    wizard.set_answer("email", "not-an-email").unwrap();
    assert!(!wizard.can_go_next());
    match wizard.next().unwrap() {
        Navigation::Blocked { question_id, message } => {
            assert_eq!(question_id, "email");
            assert_eq!(message, "Please enter a valid email address");
        }
        other => panic!("expected block, got {other:?}"),
    }
    wizard.set_answer("email", "ada@example.org").unwrap();
    assert_eq!(wizard.next().unwrap(), Navigation::Advanced { index: 3 });
}

#[tokio::test]
async fn next_then_previous_keeps_answers() {
    let (mut fixture, _) = WizardFixture::in_memory(ten_question_catalog());
    let wizard = &mut fixture.wizard;
    wizard.start().unwrap();
    wizard.set_answer("choice", "A").unwrap();
    wizard.set_answer("name", "Grace Hopper").unwrap();
    assert_eq!(wizard.next().unwrap(), Navigation::Advanced { index: 2 });
    assert_eq!(wizard.state().direction, Direction::Forward);

    assert_eq!(wizard.previous().unwrap(), Navigation::Retreated { index: 1 });
    assert_eq!(wizard.state().direction, Direction::Backward);
    assert_eq!(wizard.state().answers.get("name"), "Grace Hopper");

    assert_eq!(wizard.next().unwrap(), Navigation::Advanced { index: 2 });
    assert_eq!(wizard.previous().unwrap(), Navigation::Retreated { index: 1 });
    assert_eq!(wizard.state().current_question_index, 1);
    assert_eq!(wizard.state().answers.get("name"), "Grace Hopper");
}

#[tokio::test]
async fn previous_on_first_question_is_a_noop() {
    let (mut fixture, _) = WizardFixture::in_memory(ten_question_catalog());
    let wizard = &mut fixture.wizard;
    wizard.start().unwrap();
    assert_eq!(wizard.previous().unwrap(), Navigation::Stayed);
    assert_eq!(wizard.state().current_question_index, 0);
    assert_eq!(wizard.state().step, WizardStep::Questions);
}

#[tokio::test]
async fn selecting_an_option_auto_advances() {
    let (mut fixture, _) = WizardFixture::in_memory(ten_question_catalog());
    let wizard = &mut fixture.wizard;
    wizard.start().unwrap();
    let nav = wizard.set_answer("choice", "B").unwrap();
    assert_eq!(nav, Navigation::Advanced { index: 1 });
    assert_eq!(wizard.state().current_question_index, 1);
    assert_eq!(wizard.state().answers.get("choice"), "B");
}

#[tokio::test]
async fn selecting_on_the_last_question_completes() {
    let catalog = QuestionCatalog::new(vec![
        Question::new("nickname", QuestionKind::ShortText, "Nickname"),
        Question::select("verdict", "Would you come back?", ["Yes", "No"]).required(),
    ])
    .unwrap();
    let (mut fixture, _) = WizardFixture::in_memory(catalog);
    fixture.wizard.start().unwrap();
    fixture.wizard.next().unwrap();
    let nav = fixture.wizard.set_answer("verdict", "Yes").unwrap();
    assert!(matches!(nav, Navigation::Completed { .. }));
    assert_eq!(fixture.wizard.state().step, WizardStep::Complete);

    let event = fixture.next_event().await;
    assert!(event.succeeded());
    assert_eq!(fixture.submitter.payloads()[0]["Verdict"], "Yes");
}

#[tokio::test]
async fn restart_clears_answers_and_returns_to_welcome() {
    let catalog = QuestionCatalog::new(vec![
        Question::select("mood", "Mood", ["Up", "Down"]).required(),
        Question::new("why", QuestionKind::MultiLineText, "Why?"),
    ])
    .unwrap();
    let (mut fixture, backend) = WizardFixture::in_memory(catalog);
    fixture.wizard.start().unwrap();
    fixture.wizard.set_answer("mood", "Up").unwrap();
    fixture.wizard.set_answer("why", "Sunny").unwrap();
    assert!(matches!(
        fixture.wizard.next().unwrap(),
        Navigation::Completed { .. }
    ));
    fixture.next_event().await;

    assert!(matches!(
        fixture.wizard.restart().unwrap(),
        Navigation::Restarted { .. }
    ));
    let state = fixture.wizard.state();
    assert_eq!(state.step, WizardStep::Welcome);
    assert_eq!(state.current_question_index, 0);
    assert!(state.answers.is_empty());
    assert_eq!(backend.entry("currentStep").as_deref(), Some("welcome"));
    assert_eq!(backend.entry("answers").as_deref(), Some("{}"));

    let event = fixture.next_event().await;
    assert!(event.succeeded());
    assert_eq!(fixture.submitter.calls(), 2);
    assert_eq!(fixture.submitter.payloads()[1]["Mood"], "Up");
}
