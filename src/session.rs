//! Exam session state
//!
//! An [`ExamSession`] is one attempt over a random subset of a question
//! bank. It tracks the current position, the selected options per question,
//! the questions marked for review, and the elapsed time. Scoring moves the
//! session from `Active` to `Scored`; after that only read access and the
//! score itself remain available.

use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    str::FromStr,
    sync::Arc,
};

use enum_map::{Enum, EnumMap};
use indexmap::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;

use crate::{
    bank::{Question, QuestionBank, QuestionId},
    cache::BoundedCache,
    error::{Error, Result, StateError},
    presenter::PresentedQuestion,
    scoring::ScoreReport,
    timer::ExamClock,
};

/// Option keys selected for one question, in the order they were picked
pub type Selection = IndexSet<String>;

/// A unique identifier for an exam session
///
/// Every call to [`ExamSession::start`] mints a fresh id, so log lines and
/// client messages from a replaced session can never be confused with the
/// one that superseded it.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    /// Creates a new random session ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    /// Formats the session ID as a hyphenated UUID
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    /// Parses a session ID from its UUID string form
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Lifecycle phase of a session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Accepting answers, navigation and marks
    #[default]
    Active,
    /// Submitted and graded
    Scored,
}

/// Whether a question in the exam has a non-empty selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum AnswerStatus {
    /// At least one option selected
    Answered,
    /// Nothing selected
    Unanswered,
}

/// Answered and unanswered question counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerStats(EnumMap<AnswerStatus, usize>);

impl AnswerStats {
    /// Number of answered questions
    pub fn answered(&self) -> usize {
        self.0[AnswerStatus::Answered]
    }

    /// Number of unanswered questions
    pub fn unanswered(&self) -> usize {
        self.0[AnswerStatus::Unanswered]
    }

    /// Number of questions in the exam
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Where the user is within the exam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 1-based number of the current question
    pub number: usize,
    /// Number of questions in the exam
    pub total: usize,
    /// `number / total` as a rounded percentage
    pub percentage: u32,
}

/// One attempt at an exam
pub struct ExamSession {
    id: SessionId,
    bank: Arc<QuestionBank>,
    /// Bank indices in presentation order
    sequence: Vec<usize>,
    position: usize,
    answers: HashMap<QuestionId, Selection>,
    /// Bank indices, in the order they were marked
    marked: IndexSet<usize>,
    from_review: bool,
    clock: ExamClock,
    phase: Phase,
    report: Option<ScoreReport>,
    presented: BoundedCache<QuestionId, PresentedQuestion>,
    rng: fastrand::Rng,
}

impl Debug for ExamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamSession")
            .field("id", &self.id)
            .field("sequence", &self.sequence)
            .field("position", &self.position)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl ExamSession {
    /// Starts a session of `count` random questions from `bank`
    ///
    /// The questions are drawn without replacement and the clock starts
    /// immediately. The session holds its own handle on the bank, so a later
    /// import does not affect it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCount` unless `1 <= count <= bank.len()`.
    pub fn start(bank: Arc<QuestionBank>, count: usize) -> Result<Self> {
        Self::start_with(
            bank,
            count,
            crate::constants::cache::CAPACITY,
            fastrand::Rng::new(),
        )
    }

    /// Starts a session with an explicit cache capacity and random source
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCount` unless `1 <= count <= bank.len()`.
    pub fn start_with(
        bank: Arc<QuestionBank>,
        count: usize,
        cache_capacity: usize,
        mut rng: fastrand::Rng,
    ) -> Result<Self> {
        if !(1..=bank.len()).contains(&count) {
            return Err(Error::InvalidCount {
                requested: count,
                min: 1,
                max: bank.len(),
            });
        }

        let sequence = crate::sequence::random_sequence(&mut rng, bank.len(), count);
        let session = Self {
            id: SessionId::new(),
            bank,
            sequence,
            position: 0,
            answers: HashMap::new(),
            marked: IndexSet::new(),
            from_review: false,
            clock: ExamClock::start_now(),
            phase: Phase::Active,
            report: None,
            presented: BoundedCache::new(cache_capacity),
            rng,
        };

        log::info!(
            "started session {} with {count} of {} questions",
            session.id,
            session.bank.len()
        );

        Ok(session)
    }

    /// Returns the session id
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the bank this session draws from
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Returns the bank indices in presentation order
    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    /// Returns the number of questions in the exam
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Sessions always hold at least one question
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Returns the current sequence position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the elapsed time clock
    pub fn clock(&self) -> &ExamClock {
        &self.clock
    }

    fn ensure_active(&self) -> Result<()> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::Scored => Err(StateError::AlreadyScored.into()),
        }
    }

    fn check_position(&self, position: usize) -> Result<()> {
        if position < self.sequence.len() {
            Ok(())
        } else {
            Err(Error::InvalidNavigation {
                position,
                len: self.sequence.len(),
            })
        }
    }

    /// Returns the question at a sequence position
    ///
    /// # Errors
    ///
    /// Returns `StateError::QuestionUnavailable` if the position or the bank
    /// index it refers to does not resolve.
    pub fn question_at(&self, position: usize) -> Result<&Question> {
        self.sequence
            .get(position)
            .and_then(|&index| self.bank.get(index))
            .ok_or_else(|| StateError::QuestionUnavailable { position }.into())
    }

    /// Returns the question at the current position
    ///
    /// # Errors
    ///
    /// See [`ExamSession::question_at`].
    pub fn current_question(&self) -> Result<&Question> {
        self.question_at(self.position)
    }

    /// Returns the current question with its shuffled options
    ///
    /// The shuffle is generated on first access and cached for the rest of
    /// the session.
    ///
    /// # Errors
    ///
    /// See [`ExamSession::question_at`].
    pub fn present_question(&mut self) -> Result<&PresentedQuestion> {
        let index = self
            .sequence
            .get(self.position)
            .copied()
            .ok_or(StateError::QuestionUnavailable {
                position: self.position,
            })?;
        let question = self.bank.get(index).ok_or(StateError::QuestionUnavailable {
            position: self.position,
        })?;

        let rng = &mut self.rng;
        Ok(self
            .presented
            .get_or_insert_with(question.id().clone(), || {
                PresentedQuestion::prepare(question, rng)
            }))
    }

    /// Drops every cached option shuffle
    ///
    /// Questions presented afterwards get a new shuffle, so only call this
    /// once the user has left the exam screens.
    pub fn clear_presented(&mut self) {
        self.presented.clear();
    }

    /// Returns how many option shuffles are cached
    pub fn presented_count(&self) -> usize {
        self.presented.len()
    }

    fn position_of_question(&self, question_id: &QuestionId) -> Option<usize> {
        self.sequence.iter().position(|&index| {
            self.bank
                .get(index)
                .is_some_and(|question| question.id() == question_id)
        })
    }

    /// Adds `option_key` to the selection for a question, or removes it if
    /// already selected
    ///
    /// # Errors
    ///
    /// Returns `StateError::AlreadyScored` after submission,
    /// `StateError::UnknownQuestion` for a question outside this exam, or
    /// `StateError::UnknownOption` for a key that is not one of its options.
    pub fn toggle_answer(&mut self, question_id: &QuestionId, option_key: &str) -> Result<()> {
        self.ensure_active()?;

        let position = self
            .position_of_question(question_id)
            .ok_or_else(|| StateError::UnknownQuestion {
                id: question_id.to_string(),
            })?;
        if !self.question_at(position)?.has_option(option_key) {
            return Err(StateError::UnknownOption {
                question: question_id.to_string(),
                key: option_key.to_owned(),
            }
            .into());
        }

        let selection = self.answers.entry(question_id.clone()).or_default();
        if !selection.shift_remove(option_key) {
            selection.insert(option_key.to_owned());
        }
        if selection.is_empty() {
            self.answers.remove(question_id);
        }

        Ok(())
    }

    /// Toggles an option of the current question
    ///
    /// # Errors
    ///
    /// See [`ExamSession::toggle_answer`].
    pub fn toggle_current_answer(&mut self, option_key: &str) -> Result<()> {
        let question_id = self.current_question()?.id().clone();
        self.toggle_answer(&question_id, option_key)
    }

    /// Returns the recorded selection for a question
    pub fn selection(&self, question_id: &QuestionId) -> Option<&Selection> {
        self.answers.get(question_id)
    }

    /// Checks whether an option is selected
    pub fn is_selected(&self, question_id: &QuestionId, option_key: &str) -> bool {
        self.answers
            .get(question_id)
            .is_some_and(|selection| selection.contains(option_key))
    }

    /// Checks whether a question has a non-empty selection
    pub fn has_answer(&self, question_id: &QuestionId) -> bool {
        self.answers
            .get(question_id)
            .is_some_and(|selection| !selection.is_empty())
    }

    /// Moves to a sequence position
    ///
    /// Positions index the exam sequence, not the bank. Moving never touches
    /// answers or marks, and a rejected move leaves the position unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StateError::AlreadyScored` after submission, or
    /// `Error::InvalidNavigation` if `position` is out of bounds.
    pub fn go_to(&mut self, position: usize) -> Result<()> {
        self.ensure_active()?;
        self.check_position(position)?;
        log::debug!("session {} moved to position {position}", self.id);
        self.position = position;
        Ok(())
    }

    /// Moves to a position picked from the review screen
    ///
    /// # Errors
    ///
    /// See [`ExamSession::go_to`].
    pub fn jump_from_review(&mut self, position: usize) -> Result<()> {
        self.go_to(position)?;
        self.from_review = true;
        Ok(())
    }

    /// Advances one question; stays put on the last one
    ///
    /// # Returns
    ///
    /// `true` if the position changed
    ///
    /// # Errors
    ///
    /// Returns `StateError::AlreadyScored` after submission.
    pub fn next(&mut self) -> Result<bool> {
        self.ensure_active()?;
        if self.is_last_question() {
            return Ok(false);
        }
        self.go_to(self.position + 1)?;
        Ok(true)
    }

    /// Goes back one question; stays put on the first one
    ///
    /// # Returns
    ///
    /// `true` if the position changed
    ///
    /// # Errors
    ///
    /// Returns `StateError::AlreadyScored` after submission.
    pub fn previous(&mut self) -> Result<bool> {
        self.ensure_active()?;
        if !self.can_go_previous() {
            return Ok(false);
        }
        self.go_to(self.position - 1)?;
        Ok(true)
    }

    /// Checks whether there is a question before the current one
    pub fn can_go_previous(&self) -> bool {
        self.position > 0
    }

    /// Checks whether the current question is the last one
    pub fn is_last_question(&self) -> bool {
        self.position + 1 == self.sequence.len()
    }

    /// Checks whether the user arrived here from the review screen
    pub fn is_from_review(&self) -> bool {
        self.from_review
    }

    /// Flags or unflags a bank index for review
    ///
    /// Any bank index is accepted, including ones outside this exam's
    /// sequence; those simply never show up in [`ExamSession::marked_list`].
    ///
    /// # Returns
    ///
    /// `true` if the index is now marked
    ///
    /// # Errors
    ///
    /// Returns `StateError::AlreadyScored` after submission, or
    /// `Error::InvalidNavigation` if `bank_index` is outside the bank.
    pub fn toggle_mark(&mut self, bank_index: usize) -> Result<bool> {
        self.ensure_active()?;
        if bank_index >= self.bank.len() {
            return Err(Error::InvalidNavigation {
                position: bank_index,
                len: self.bank.len(),
            });
        }
        if self.marked.shift_remove(&bank_index) {
            Ok(false)
        } else {
            self.marked.insert(bank_index);
            Ok(true)
        }
    }

    /// Flags or unflags the current question
    ///
    /// # Errors
    ///
    /// See [`ExamSession::toggle_mark`].
    pub fn toggle_current_mark(&mut self) -> Result<bool> {
        let index = self.current_bank_index()?;
        self.toggle_mark(index)
    }

    /// Checks whether a bank index is marked
    pub fn is_marked(&self, bank_index: usize) -> bool {
        self.marked.contains(&bank_index)
    }

    /// Checks whether the current question is marked
    pub fn is_current_marked(&self) -> bool {
        self.current_bank_index()
            .is_ok_and(|index| self.is_marked(index))
    }

    fn current_bank_index(&self) -> Result<usize> {
        self.sequence
            .get(self.position)
            .copied()
            .ok_or_else(|| {
                StateError::QuestionUnavailable {
                    position: self.position,
                }
                .into()
            })
    }

    /// Positions of the questions without a selection, ascending
    pub fn unanswered_list(&self) -> Vec<usize> {
        self.sequence
            .iter()
            .enumerate()
            .filter(|&(_, &index)| {
                self.bank
                    .get(index)
                    .is_none_or(|question| !self.has_answer(question.id()))
            })
            .map(|(position, _)| position)
            .collect_vec()
    }

    /// Positions of the marked questions, in marking order
    ///
    /// Marks are stored by bank index so they survive independently of the
    /// sequence. Marks on bank indices that are not part of this exam are
    /// skipped with a warning.
    pub fn marked_list(&self) -> Vec<usize> {
        self.marked
            .iter()
            .filter_map(|index| {
                let position = self.sequence.iter().position(|i| i == index);
                if position.is_none() {
                    log::warn!("marked question {index} is not part of session {}", self.id);
                }
                position
            })
            .collect_vec()
    }

    /// Counts answered and unanswered questions
    pub fn answer_stats(&self) -> AnswerStats {
        let unanswered = self.unanswered_list().len();
        let mut counts = EnumMap::default();
        counts[AnswerStatus::Answered] = self.sequence.len() - unanswered;
        counts[AnswerStatus::Unanswered] = unanswered;
        AnswerStats(counts)
    }

    /// Returns the 1-based position and completion percentage
    pub fn progress(&self) -> Progress {
        let number = self.position + 1;
        let total = self.sequence.len();
        Progress {
            number,
            total,
            percentage: crate::scoring::percentage(number, total),
        }
    }

    /// Grades the exam and stops the clock
    ///
    /// The first call moves the session to `Scored`; later calls return the
    /// same report.
    ///
    /// # Errors
    ///
    /// Returns `StateError::QuestionUnavailable` if a sequence entry does not
    /// resolve to a question.
    pub fn score(&mut self) -> Result<&ScoreReport> {
        if self.report.is_none() {
            let questions = self
                .sequence
                .iter()
                .enumerate()
                .map(|(position, &index)| {
                    self.bank
                        .get(index)
                        .ok_or(StateError::QuestionUnavailable { position })
                })
                .collect::<Result<Vec<_>, _>>()?;

            self.clock.stop();
            let report = ScoreReport::grade(questions, &self.answers, self.clock.elapsed());
            log::info!(
                "session {} scored {}% ({} of {} correct)",
                self.id,
                report.percentage,
                report.correct,
                report.total
            );

            self.report = Some(report);
            self.phase = Phase::Scored;
        }

        self.report()
    }

    /// Returns the grading outcome
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotScored` before submission.
    pub fn report(&self) -> Result<&ScoreReport> {
        self.report.as_ref().ok_or_else(|| StateError::NotScored.into())
    }
}
