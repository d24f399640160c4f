use std::collections::HashSet;

use exam_engine::{
    Error, Exam, ExamConfig, ExamView, Phase, StateError,
    view::{QuestionScreen, ResultScreen, ReviewScreen},
};

fn document(count: usize) -> String {
    let entries = (1..=count)
        .map(|i| {
            format!(
                r#""Q{i}": {{
                    "Question": "Question {i}",
                    "Options": {{ "A": "first", "B": "second", "C": "third" }},
                    "Answer": ["A", "C"]
                }}"#
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{entries}}}")
}

fn create_exam(count: usize) -> Exam {
    let mut exam = Exam::new(ExamConfig::default()).unwrap();
    exam.import_json(Some("bank.json"), &document(count)).unwrap();
    exam
}

#[test]
fn full_attempt_with_review_and_submit() {
    let mut exam = create_exam(6);
    let session = exam.start_with_rng(4, fastrand::Rng::with_seed(1)).unwrap();

    // Answer the first two correctly, the third partially, skip the last.
    session.toggle_current_answer("A").unwrap();
    session.toggle_current_answer("C").unwrap();
    session.next().unwrap();
    session.toggle_current_answer("C").unwrap();
    session.toggle_current_answer("A").unwrap();
    session.toggle_current_mark().unwrap();
    session.next().unwrap();
    session.toggle_current_answer("A").unwrap();
    session.next().unwrap();
    assert!(session.is_last_question());
    assert!(!session.next().unwrap());

    let review = ReviewScreen::from_session(session);
    assert_eq!(review.marked, vec![1]);
    assert_eq!(review.unanswered, vec![3]);
    assert_eq!(review.stats.answered(), 3);

    session.jump_from_review(3).unwrap();
    let screen = QuestionScreen::from_session(session).unwrap();
    assert!(screen.from_review);
    assert!(screen.is_last);
    assert_eq!(screen.progress.percentage, 100);

    let report = exam.submit().unwrap().clone();
    assert_eq!(report.correct, 2);
    assert_eq!(report.percentage, 50);
    assert_eq!(
        report.wrong_answers.iter().map(|w| w.number).collect::<Vec<_>>(),
        vec![3, 4]
    );
    assert_eq!(report.wrong_answers[0].user_answer_text(), "A. first");
    assert!(report.wrong_answers[1].is_unanswered());

    let message = ExamView::from(ResultScreen::from(&report)).to_message();
    assert!(message.contains("\"score\":50"));

    let session = exam.session_mut().unwrap();
    assert_eq!(session.phase(), Phase::Scored);
    assert_eq!(
        session.toggle_current_answer("B"),
        Err(Error::State(StateError::AlreadyScored))
    );
}

#[test]
fn unanswered_exam_scores_zero() {
    let mut exam = create_exam(4);
    exam.start(4).unwrap();
    let report = exam.submit().unwrap();
    assert_eq!(report.percentage, 0);
    assert_eq!(report.wrong_answers.len(), 4);
    assert!(report.wrong_answers.iter().all(|w| w.user_answer.is_empty()));
}

#[test]
fn partial_selections_never_score() {
    let mut exam = create_exam(3);
    let session = exam.start(3).unwrap();
    session.toggle_current_answer("A").unwrap();
    session.next().unwrap();
    for key in ["A", "B", "C"] {
        session.toggle_current_answer(key).unwrap();
    }
    session.next().unwrap();
    session.toggle_current_answer("C").unwrap();

    assert_eq!(exam.submit().unwrap().correct, 0);
}

#[test]
fn restart_draws_a_fresh_session() {
    let mut exam = create_exam(20);
    let first: Vec<usize> = exam
        .start_with_rng(20, fastrand::Rng::with_seed(2))
        .unwrap()
        .sequence()
        .to_vec();
    let second: Vec<usize> = exam
        .start_with_rng(20, fastrand::Rng::with_seed(3))
        .unwrap()
        .sequence()
        .to_vec();

    assert_ne!(first, second);
    assert_eq!(
        first.iter().collect::<HashSet<_>>(),
        second.iter().collect::<HashSet<_>>()
    );
    assert_eq!(exam.session().unwrap().unanswered_list().len(), 20);
}

#[test]
fn malformed_document_is_rejected_wholesale() {
    let mut exam = Exam::new(ExamConfig::default()).unwrap();
    let text = r#"{
        "Q1": { "Question": "ok", "Options": { "A": "a" }, "Answer": ["A"] },
        "Q2": { "Question": "bad", "Options": { "A": "a" }, "Answer": ["B"] }
    }"#;

    let error = exam.import_json(None, text).unwrap_err();
    assert!(matches!(error, Error::Format { ref key, .. } if key == "Q2"));
    assert!(exam.bank().is_err());
}
