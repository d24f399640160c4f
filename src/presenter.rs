//! Per-session option shuffling
//!
//! Each question is shown with its options in a random order labelled
//! `A`, `B`, `C`, ... by position. The permutation is generated once per
//! question per session and then served from the session cache, so the
//! letters a user sees never change while they navigate.

use itertools::Itertools;
use serde::Serialize;

use crate::bank::{Question, QuestionId};

/// Label for the option at `index`: `A`..`Z`, then `AA`, `AB`, ...
pub fn display_letter(index: usize) -> String {
    let mut label = Vec::new();
    let mut remaining = index + 1;
    while remaining > 0 {
        remaining -= 1;
        label.push(char::from(b'A' + (remaining % 26) as u8));
        remaining /= 26;
    }
    label.into_iter().rev().collect()
}

/// One option as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedOption {
    /// Display letter assigned by shuffled position
    pub letter: String,
    /// Key of the option in the source document
    pub original_key: String,
    /// Option text
    pub text: String,
}

/// A question with its options in shuffled display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedQuestion {
    id: QuestionId,
    text: String,
    options: Vec<PresentedOption>,
}

impl PresentedQuestion {
    /// Shuffles the options of `question` and assigns display letters
    ///
    /// Letters follow the shuffled position, while each option keeps its
    /// original key so answers are always recorded against the source
    /// document rather than against what was on screen.
    pub fn prepare(question: &Question, rng: &mut fastrand::Rng) -> Self {
        let mut keys = question.option_keys().collect_vec();
        crate::sequence::shuffle(rng, &mut keys);

        let options = keys
            .into_iter()
            .enumerate()
            .map(|(index, key)| PresentedOption {
                letter: display_letter(index),
                original_key: key.to_owned(),
                text: question.option_text(key).unwrap_or_default().to_owned(),
            })
            .collect_vec();

        Self {
            id: question.id().clone(),
            text: question.text().to_owned(),
            options,
        }
    }

    /// Returns the question id
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Returns the question text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the options in display letter order
    pub fn options(&self) -> &[PresentedOption] {
        &self.options
    }

    /// Resolves a display letter to the original option key
    pub fn original_key(&self, letter: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.letter == letter)
            .map(|o| o.original_key.as_str())
    }

    /// Finds the display letter currently assigned to an original key
    pub fn letter_of(&self, original_key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.original_key == original_key)
            .map(|o| o.letter.as_str())
    }
}
