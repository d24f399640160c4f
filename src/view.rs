//! Messages handed to the presentation layer
//!
//! Each screen of the exam is rendered from one of these snapshots. They are
//! plain serializable data, so a browser shell can receive them as JSON.

use itertools::Itertools;
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::{
    error::Result,
    scoring::{ReviewOption, ScoreReport},
    session::{AnswerStats, ExamSession, Progress},
    timer::format_elapsed,
};

/// Snapshot of one exam screen
///
/// Snapshots are rebuilt from the session after every event rather than
/// patched, so a client that reconnects only needs the latest one.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum ExamView {
    /// A question being answered
    Question(QuestionScreen),
    /// The overview before submitting
    Review(ReviewScreen),
    /// The graded result
    Result(ResultScreen),
}

impl ExamView {
    /// Converts the view to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// An option on the question screen
#[derive(Debug, Serialize, Clone)]
pub struct OptionView {
    /// Display letter
    pub letter: String,
    /// Key to send back when the option is toggled
    pub original_key: String,
    /// Option text
    pub text: String,
    /// Whether the option is currently selected
    pub selected: bool,
}

/// The question screen
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub struct QuestionScreen {
    /// Exam title, if the bank has one
    pub title: Option<String>,
    /// Id of the question in the bank
    pub question_id: String,
    /// Question text
    pub question: String,
    /// Options in display order
    pub options: Vec<OptionView>,
    /// Position within the exam
    pub progress: Progress,
    /// Whether the previous button is enabled
    pub can_go_previous: bool,
    /// Whether the next button should lead to the review screen
    pub is_last: bool,
    /// Whether a shortcut back to the review screen should be shown
    pub from_review: bool,
    /// Whether the question is marked for review
    pub marked: bool,
    /// Elapsed time as `MM:SS`
    pub elapsed: String,
}

impl QuestionScreen {
    /// Builds the screen for the current question
    ///
    /// # Errors
    ///
    /// See [`ExamSession::present_question`].
    pub fn from_session(session: &mut ExamSession) -> Result<Self> {
        let presented = session.present_question()?.clone();
        let options = presented
            .options()
            .iter()
            .map(|option| OptionView {
                letter: option.letter.clone(),
                original_key: option.original_key.clone(),
                text: option.text.clone(),
                selected: session.is_selected(presented.id(), &option.original_key),
            })
            .collect_vec();

        Ok(Self {
            title: session.bank().title().map(str::to_owned),
            question_id: presented.id().to_string(),
            question: presented.text().to_owned(),
            options,
            progress: session.progress(),
            can_go_previous: session.can_go_previous(),
            is_last: session.is_last_question(),
            from_review: session.is_from_review(),
            marked: session.is_current_marked(),
            elapsed: session.clock().display(),
        })
    }
}

/// The overview shown before submitting
#[derive(Debug, Serialize, Clone)]
pub struct ReviewScreen {
    /// Positions of marked questions
    pub marked: Vec<usize>,
    /// Positions of unanswered questions
    pub unanswered: Vec<usize>,
    /// Answered and unanswered counts
    pub stats: AnswerStats,
}

impl ReviewScreen {
    /// Builds the overview from the session
    pub fn from_session(session: &ExamSession) -> Self {
        Self {
            marked: session.marked_list(),
            unanswered: session.unanswered_list(),
            stats: session.answer_stats(),
        }
    }
}

/// A wrong answer as listed on the result screen
#[derive(Debug, Serialize, Clone)]
pub struct WrongAnswerView {
    /// 1-based number in the exam
    pub number: usize,
    /// Id of the question in the bank
    pub original_id: String,
    /// Question text
    pub question: String,
    /// Options in original order
    pub options: Vec<ReviewOption>,
    /// Formatted correct answer
    pub correct_answer: String,
    /// Formatted user answer
    pub user_answer: String,
    /// Whether the question was left unanswered
    pub unanswered: bool,
}

/// The graded result
#[derive(Debug, Serialize, Clone)]
pub struct ResultScreen {
    /// Score out of 100
    pub score: u32,
    /// Number of correct answers
    pub correct: usize,
    /// Number of questions
    pub total: usize,
    /// Time taken as `MM:SS`
    pub elapsed: String,
    /// Incorrect and unanswered questions
    pub wrong_answers: Vec<WrongAnswerView>,
}

impl From<&ScoreReport> for ResultScreen {
    fn from(report: &ScoreReport) -> Self {
        Self {
            score: report.percentage,
            correct: report.correct,
            total: report.total,
            elapsed: format_elapsed(report.elapsed),
            wrong_answers: report
                .wrong_answers
                .iter()
                .map(|wrong| WrongAnswerView {
                    number: wrong.number,
                    original_id: wrong.original_id().to_string(),
                    question: wrong.question.text().to_owned(),
                    options: wrong.options(),
                    correct_answer: wrong.correct_answer_text(),
                    user_answer: wrong.user_answer_text(),
                    unanswered: wrong.is_unanswered(),
                })
                .collect_vec(),
        }
    }
}
