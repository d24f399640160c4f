//! Exam controller
//!
//! [`Exam`] is the single entry point a presentation layer drives. It owns
//! the imported bank and the current session, if any:
//!
//! * no session: nothing started yet, or the last one was cancelled or
//!   released by housekeeping
//! * a session in [`Phase::Active`](crate::session::Phase::Active)
//! * a session in [`Phase::Scored`](crate::session::Phase::Scored)
//!
//! Starting a new exam always replaces the previous session, cache included.

use std::{ops::RangeInclusive, sync::Arc};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    bank::{LoaderConfig, Question, QuestionBank, exam_title_from_file_name},
    error::{Error, Result, StateError},
    scoring::{ReviewOption, ScoreReport, correct_answer_text, review_options},
    session::{ExamSession, Selection},
};

/// Settings for an [`Exam`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ExamConfig {
    /// Smallest bank accepted on import and smallest exam offered
    #[garde(range(min = 1))]
    pub min_questions: usize,
    /// Number of option shuffles kept per session
    #[garde(range(min = 1))]
    pub cache_capacity: usize,
    /// Question count suggested before the user picks one
    #[garde(range(min = 1))]
    pub default_question_count: usize,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            min_questions: crate::constants::exam::MIN_QUESTION_COUNT,
            cache_capacity: crate::constants::cache::CAPACITY,
            default_question_count: crate::constants::exam::DEFAULT_QUESTION_COUNT,
        }
    }
}

/// A bank question laid out for study, with its answer revealed
#[derive(Debug, Clone, Serialize)]
pub struct BankReviewItem<'a> {
    /// 1-based number in bank order
    pub number: usize,
    /// The question
    pub question: &'a Question,
    /// Options in original order, correct ones flagged
    pub options: Vec<ReviewOption>,
    /// Formatted correct answer
    pub correct_answer: String,
}

/// Owner of the imported bank and the current exam session
#[derive(Debug)]
pub struct Exam {
    config: ExamConfig,
    bank: Option<Arc<QuestionBank>>,
    session: Option<ExamSession>,
}

impl Exam {
    /// Creates an exam controller with no bank loaded
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `config` fails validation.
    pub fn new(config: ExamConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|report| Error::Config(report.to_string()))?;
        Ok(Self {
            config,
            bank: None,
            session: None,
        })
    }

    /// Returns the active configuration
    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    /// Replaces the bank with one parsed from a JSON document
    ///
    /// When `file_name` is given, its stem becomes the bank title. A failed
    /// import leaves the previous bank in place.
    ///
    /// # Errors
    ///
    /// See [`QuestionBank::from_json`].
    pub fn import_json(&mut self, file_name: Option<&str>, text: &str) -> Result<&QuestionBank> {
        let loader = LoaderConfig {
            min_questions: self.config.min_questions,
        };
        let mut bank = QuestionBank::from_json(text, &loader)?;
        if let Some(file_name) = file_name {
            bank = bank.with_title(exam_title_from_file_name(file_name));
        }
        self.import(bank)
    }

    /// Replaces the bank with an already loaded one
    ///
    /// The bank was validated when it was loaded, but possibly against a
    /// different minimum, so the size is checked again against this exam's
    /// configuration. A running session keeps the bank it was started from.
    ///
    /// # Errors
    ///
    /// Returns `Error::InsufficientQuestions` if the bank holds fewer than
    /// `min_questions` questions. The previous bank stays in place.
    pub fn import(&mut self, bank: QuestionBank) -> Result<&QuestionBank> {
        if bank.len() < self.config.min_questions {
            return Err(Error::InsufficientQuestions {
                required: self.config.min_questions,
                actual: bank.len(),
            });
        }
        Ok(self.bank.insert(Arc::new(bank)))
    }

    /// Returns the imported bank
    ///
    /// # Errors
    ///
    /// Returns `StateError::NoQuestionBank` before any import.
    pub fn bank(&self) -> Result<&QuestionBank> {
        self.bank
            .as_deref()
            .ok_or_else(|| StateError::NoQuestionBank.into())
    }

    /// Allowed question counts for a new exam
    ///
    /// # Errors
    ///
    /// Returns `StateError::NoQuestionBank` before any import.
    pub fn count_range(&self) -> Result<RangeInclusive<usize>> {
        let max = self.bank()?.len();
        Ok(self.config.min_questions.min(max)..=max)
    }

    /// The configured default count clamped into [`Exam::count_range`]
    ///
    /// # Errors
    ///
    /// Returns `StateError::NoQuestionBank` before any import.
    pub fn suggested_count(&self) -> Result<usize> {
        let range = self.count_range()?;
        Ok(self
            .config
            .default_question_count
            .clamp(*range.start(), *range.end()))
    }

    /// Starts a new exam of `count` questions
    ///
    /// # Errors
    ///
    /// Returns `StateError::NoQuestionBank` before any import, or
    /// `Error::InvalidCount` if `count` is outside [`Exam::count_range`].
    pub fn start(&mut self, count: usize) -> Result<&mut ExamSession> {
        self.start_with_rng(count, fastrand::Rng::new())
    }

    /// Starts a new exam drawing randomness from `rng`
    ///
    /// Any previous session is dropped together with its option shuffles,
    /// answers and marks. Passing a seeded `Rng` makes the drawn questions
    /// and option orders reproducible.
    ///
    /// # Errors
    ///
    /// See [`Exam::start`].
    pub fn start_with_rng(&mut self, count: usize, rng: fastrand::Rng) -> Result<&mut ExamSession> {
        let range = self.count_range()?;
        if !range.contains(&count) {
            return Err(Error::InvalidCount {
                requested: count,
                min: *range.start(),
                max: *range.end(),
            });
        }
        let bank = self.bank.clone().ok_or(StateError::NoQuestionBank)?;
        let session = ExamSession::start_with(bank, count, self.config.cache_capacity, rng)?;
        Ok(self.session.insert(session))
    }

    /// Returns the current session
    ///
    /// # Errors
    ///
    /// Returns `StateError::NoSession` if no exam is running.
    pub fn session(&self) -> Result<&ExamSession> {
        self.session
            .as_ref()
            .ok_or_else(|| StateError::NoSession.into())
    }

    /// Returns the current session mutably
    ///
    /// # Errors
    ///
    /// Returns `StateError::NoSession` if no exam is running.
    pub fn session_mut(&mut self) -> Result<&mut ExamSession> {
        self.session
            .as_mut()
            .ok_or_else(|| StateError::NoSession.into())
    }

    /// Submits the current exam for grading
    ///
    /// # Errors
    ///
    /// Returns `StateError::NoSession` if no exam is running, or any error
    /// from [`ExamSession::score`].
    pub fn submit(&mut self) -> Result<&ScoreReport> {
        self.session_mut()?.score()
    }

    /// Abandons the current exam without grading
    ///
    /// # Returns
    ///
    /// `true` if a session was dropped
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.session.take().is_some();
        if cancelled {
            log::info!("exam cancelled");
        }
        cancelled
    }

    /// Releases a session whose clock is no longer running
    ///
    /// Whether a session is finished depends only on its clock having been
    /// stopped, never on wall time, so the check takes no time argument.
    /// Meant to run every [`crate::constants::housekeeping::INTERVAL`] once
    /// the user has left the exam screens. A running exam is never touched.
    ///
    /// # Returns
    ///
    /// `true` if a session was released
    pub fn housekeeping(&mut self) -> bool {
        let finished = self
            .session
            .as_ref()
            .is_some_and(|session| !session.clock().is_running());
        if let Some(session) = finished.then(|| self.session.take()).flatten() {
            log::warn!("releasing finished session {}", session.id());
        }
        finished
    }

    /// Lists every bank question with its answer, in bank order
    ///
    /// # Errors
    ///
    /// Returns `StateError::NoQuestionBank` before any import.
    pub fn review_bank(&self) -> Result<Vec<BankReviewItem<'_>>> {
        let empty = Selection::new();
        Ok(self
            .bank()?
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| BankReviewItem {
                number: index + 1,
                question,
                options: review_options(question, &empty),
                correct_answer: correct_answer_text(question),
            })
            .collect_vec())
    }
}
