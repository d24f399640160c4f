//! Exact-match grading and wrong-answer review
//!
//! A question counts as correct only when the selected option set equals the
//! correct set exactly. There is no partial credit.

use std::{collections::HashMap, time::Duration};

use indexmap::IndexSet;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    bank::{Question, QuestionId},
    constants::exam::{UNANSWERED_LABEL, USER_ANSWER_SEPARATOR},
    session::Selection,
};

/// Checks a selection against the correct keys with set equality
pub fn is_answer_correct(selected: &Selection, correct: &IndexSet<String>) -> bool {
    selected.len() == correct.len() && selected.iter().all(|key| correct.contains(key))
}

/// Percentage of correct answers, rounded half up
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct * 200 + total) / (total * 2)) as u32
}

/// An option row in a review listing, in original key order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOption {
    /// Letter of the option by its original position
    pub letter: String,
    /// Key of the option in the source document
    pub key: String,
    /// Option text
    pub text: String,
    /// Whether the option is part of the correct answer
    pub correct: bool,
    /// Whether the user selected the option
    pub selected: bool,
}

/// Review rows for every option of `question`
pub fn review_options(question: &Question, selection: &Selection) -> Vec<ReviewOption> {
    question
        .options()
        .iter()
        .enumerate()
        .map(|(index, (key, text))| ReviewOption {
            letter: crate::presenter::display_letter(index),
            key: key.clone(),
            text: text.clone(),
            correct: question.is_correct_key(key),
            selected: selection.contains(key),
        })
        .collect_vec()
}

/// Correct answer as `key. text` lines, in answer order
pub fn correct_answer_text(question: &Question) -> String {
    question
        .correct_keys()
        .iter()
        .map(|key| format!("{key}. {}", question.option_text(key).unwrap_or_default()))
        .join("\n")
}

/// User answer as `letter. text` entries, or the unanswered label
///
/// Letters follow the original option order so they line up with
/// [`review_options`].
pub fn user_answer_text(question: &Question, selection: &Selection) -> String {
    if selection.is_empty() {
        return UNANSWERED_LABEL.to_owned();
    }
    selection
        .iter()
        .map(|key| {
            format!(
                "{}. {}",
                question.source_letter(key).unwrap_or_default(),
                question.option_text(key).unwrap_or_default()
            )
        })
        .join(USER_ANSWER_SEPARATOR)
}

/// A question answered incorrectly or left unanswered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrongAnswer {
    /// 1-based position in the exam
    pub number: usize,
    /// The question as imported
    pub question: Question,
    /// What the user selected, possibly nothing
    pub user_answer: Selection,
}

impl WrongAnswer {
    /// Returns the id of the question in the bank
    pub fn original_id(&self) -> &QuestionId {
        self.question.id()
    }

    /// Checks whether the question was left unanswered
    pub fn is_unanswered(&self) -> bool {
        self.user_answer.is_empty()
    }

    /// Option rows flagging correct and selected options
    pub fn options(&self) -> Vec<ReviewOption> {
        review_options(&self.question, &self.user_answer)
    }

    /// Formatted correct answer
    pub fn correct_answer_text(&self) -> String {
        correct_answer_text(&self.question)
    }

    /// Formatted user answer
    pub fn user_answer_text(&self) -> String {
        user_answer_text(&self.question, &self.user_answer)
    }
}

/// Outcome of grading an exam
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    /// Score out of 100
    pub percentage: u32,
    /// Number of questions answered exactly right
    pub correct: usize,
    /// Number of questions in the exam
    pub total: usize,
    /// Incorrect and unanswered questions in exam order
    pub wrong_answers: Vec<WrongAnswer>,
    /// Time taken until submission
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub elapsed: Duration,
}

impl ScoreReport {
    /// Grades questions in exam order against the recorded answers
    ///
    /// Questions missing from `answers` count as unanswered and are listed
    /// among the wrong answers with an empty selection.
    pub fn grade<'a, I>(
        questions: I,
        answers: &HashMap<QuestionId, Selection>,
        elapsed: Duration,
    ) -> Self
    where
        I: IntoIterator<Item = &'a Question>,
    {
        let empty = Selection::new();
        let mut total = 0;
        let mut wrong_answers = Vec::new();

        for (position, question) in questions.into_iter().enumerate() {
            total += 1;
            let selection = answers.get(question.id()).unwrap_or(&empty);
            if !is_answer_correct(selection, question.correct_keys()) {
                wrong_answers.push(WrongAnswer {
                    number: position + 1,
                    question: question.clone(),
                    user_answer: selection.clone(),
                });
            }
        }

        let correct = total - wrong_answers.len();
        Self {
            percentage: percentage(correct, total),
            correct,
            total,
            wrong_answers,
            elapsed,
        }
    }

    /// Checks whether every question was answered correctly
    pub fn is_perfect(&self) -> bool {
        self.wrong_answers.is_empty()
    }
}
