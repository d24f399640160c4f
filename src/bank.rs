//! Question bank import and validation
//!
//! A bank is built from a document mapping question keys to entries of the
//! form `{ "Question": ..., "Options": { key: text, ... }, "Answer": [key, ...] }`.
//! Every entry is validated before the bank exists; a single malformed entry
//! rejects the whole document so no partial bank is ever produced.

use std::fmt::Display;

use garde::Validate;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a question, its key in the source document (e.g. `Q12`)
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::From,
)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates an id from any string-like key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestionId {
    /// Creates an id from a borrowed key (same as `new()`)
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl Display for QuestionId {
    /// Formats the id as its source document key
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A question entry exactly as it appears in the source document
///
/// Missing fields deserialize to empty values so that they are reported by
/// validation rather than by the parser.
#[serde_with::serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RawQuestion {
    /// The question text
    #[serde(rename = "Question", default)]
    #[garde(length(min = 1))]
    pub question: String,
    /// Option key and text pairs in document order
    #[serde(rename = "Options", default)]
    #[serde_as(as = "serde_with::Map<_, _>")]
    #[garde(length(min = 1))]
    pub options: Vec<(String, String)>,
    /// Keys of the correct options
    #[serde(rename = "Answer", default)]
    #[garde(length(min = 1))]
    pub answer: Vec<String>,
}

/// Settings applied when importing a bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LoaderConfig {
    /// Smallest bank accepted by the import
    #[garde(range(min = 1))]
    pub min_questions: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            min_questions: crate::constants::exam::MIN_QUESTION_COUNT,
        }
    }
}

/// A validated, immutable question
///
/// The only way to obtain one is [`Question::from_raw`], so every question
/// has text, at least one option, and a correct set drawn from its options.
/// It serializes for display but never deserializes, which would bypass
/// that validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    /// Options keyed by their original key, in document order
    options: IndexMap<String, String>,
    /// Correct option keys, in the order the answer listed them
    correct: IndexSet<String>,
}

impl Question {
    /// Validates a raw entry and turns it into a question
    ///
    /// # Errors
    ///
    /// Returns `Error::Format` naming `key` if the text is empty, there are no
    /// options or answers, an option key repeats, or an answer key is not one
    /// of the options.
    pub fn from_raw(key: &str, raw: RawQuestion) -> Result<Self> {
        let format_error = |reason: String| Error::Format {
            key: key.to_owned(),
            reason,
        };

        raw.validate()
            .map_err(|report| format_error(report.to_string()))?;

        let option_count = raw.options.len();
        let options: IndexMap<String, String> = raw.options.into_iter().collect();
        if options.len() != option_count {
            return Err(format_error("option keys must be unique".to_owned()));
        }

        if let Some(missing) = raw.answer.iter().find(|a| !options.contains_key(*a)) {
            return Err(format_error(format!("answer {missing} is not an option")));
        }

        Ok(Self {
            id: QuestionId::new(key),
            text: raw.question,
            options,
            correct: raw.answer.into_iter().unique().collect(),
        })
    }

    /// Returns the question id
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Returns the question text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the options in their original order
    pub fn options(&self) -> &IndexMap<String, String> {
        &self.options
    }

    /// Returns the option keys in their original order
    pub fn option_keys(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    /// Returns the text of an option by its original key
    pub fn option_text(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Checks whether `key` is one of the options
    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Returns the correct option keys in answer order
    pub fn correct_keys(&self) -> &IndexSet<String> {
        &self.correct
    }

    /// Checks whether `key` is a correct option
    pub fn is_correct_key(&self, key: &str) -> bool {
        self.correct.contains(key)
    }

    /// Letter of an option by its position in the original key order
    pub fn source_letter(&self, key: &str) -> Option<String> {
        self.options
            .get_index_of(key)
            .map(crate::presenter::display_letter)
    }
}

/// An ordered, immutable collection of questions
///
/// Built only through [`QuestionBank::load`] or [`QuestionBank::from_json`],
/// which guarantee unique question ids and the configured minimum size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    title: Option<String>,
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Builds a bank from key and entry pairs
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an invalid `config`, `Error::Format` for
    /// the first malformed entry, or `Error::InsufficientQuestions` when fewer
    /// than `config.min_questions` entries are present.
    pub fn load<I, K>(entries: I, config: &LoaderConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (K, RawQuestion)>,
        K: AsRef<str>,
    {
        config
            .validate()
            .map_err(|report| Error::Config(report.to_string()))?;

        let questions = entries
            .into_iter()
            .map(|(key, raw)| Question::from_raw(key.as_ref(), raw))
            .collect::<Result<Vec<_>>>()?;

        if let Some(repeated) = questions.iter().map(Question::id).duplicates().next() {
            return Err(Error::Format {
                key: repeated.to_string(),
                reason: "question key appears more than once".to_owned(),
            });
        }

        if questions.len() < config.min_questions {
            return Err(Error::InsufficientQuestions {
                required: config.min_questions,
                actual: questions.len(),
            });
        }

        log::info!("imported {}", pluralize_questions(questions.len()));

        Ok(Self {
            title: None,
            questions,
        })
    }

    /// Parses a JSON document and builds a bank from it
    ///
    /// # Errors
    ///
    /// Returns `Error::Document` if the text is not a JSON object, and
    /// otherwise the same errors as [`QuestionBank::load`]. An entry whose
    /// fields have the wrong types is reported as `Error::Format`.
    pub fn from_json(text: &str, config: &LoaderConfig) -> Result<Self> {
        let document: serde_json::Value =
            serde_json::from_str(text).map_err(|e| Error::Document(e.to_string()))?;
        let serde_json::Value::Object(entries) = document else {
            return Err(Error::Document(
                "expected an object of question entries".to_owned(),
            ));
        };

        let entries = entries
            .into_iter()
            .map(|(key, value)| match serde_json::from_value(value) {
                Ok(raw) => Ok((key, raw)),
                Err(e) => Err(Error::Format {
                    key,
                    reason: e.to_string(),
                }),
            })
            .collect::<Result<Vec<(String, RawQuestion)>>>()?;

        Self::load(entries, config)
    }

    /// Attaches a display title to the bank
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns the display title, if any
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the number of questions
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Checks if the bank contains any questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns the question at a bank index
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Returns all questions in bank order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Human readable import summary, e.g. `12 questions`
    pub fn summary(&self) -> String {
        pluralize_questions(self.len())
    }
}

fn pluralize_questions(count: usize) -> String {
    pluralizer::pluralize("question", count as isize, true)
}

/// Derives an exam title from an uploaded file name by dropping its extension
pub fn exam_title_from_file_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, extension)) if !extension.is_empty() && !extension.contains('/') => {
            stem.to_owned()
        }
        _ => file_name.to_owned(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn raw(question: &str, options: &[(&str, &str)], answer: &[&str]) -> RawQuestion {
        RawQuestion {
            question: question.to_string(),
            options: options
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            answer: answer.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Bank of `count` questions `Q1..`, each with options A-D and answer A
    pub(crate) fn create_test_bank(count: usize) -> QuestionBank {
        QuestionBank::load(
            (1..=count).map(|i| {
                (
                    format!("Q{i}"),
                    raw(
                        &format!("Question {i}"),
                        &[("A", "one"), ("B", "two"), ("C", "three"), ("D", "four")],
                        &["A"],
                    ),
                )
            }),
            &LoaderConfig::default(),
        )
        .unwrap()
    }

    const DOCUMENT: &str = r#"{
        "Q1": {
            "Question": "Which are primes?",
            "Options": { "D": "4", "B": "3", "A": "2", "C": "9" },
            "Answer": ["B", "A"]
        },
        "Q2": {
            "Question": "Capital of France?",
            "Options": { "A": "Paris", "B": "Rome" },
            "Answer": ["A"]
        }
    }"#;

    #[test]
    fn test_from_json_preserves_order() {
        let bank = QuestionBank::from_json(DOCUMENT, &LoaderConfig::default()).unwrap();

        assert_eq!(bank.len(), 2);
        let first = bank.get(0).unwrap();
        assert_eq!(first.id().as_str(), "Q1");
        assert_eq!(first.option_keys().collect_vec(), vec!["D", "B", "A", "C"]);
        assert_eq!(
            first.correct_keys().iter().collect_vec(),
            vec!["B", "A"]
        );
        assert_eq!(bank.get(1).unwrap().text(), "Capital of France?");
    }

    #[test]
    fn test_correct_keys_are_options() {
        let bank = QuestionBank::from_json(DOCUMENT, &LoaderConfig::default()).unwrap();
        for question in bank.questions() {
            assert!(question.correct_keys().iter().all(|k| question.has_option(k)));
        }
    }

    #[test]
    fn test_answer_not_in_options() {
        let result = QuestionBank::load(
            [("Q3", raw("text", &[("A", "a")], &["A", "Z"]))],
            &LoaderConfig::default(),
        );
        assert_eq!(
            result,
            Err(Error::Format {
                key: "Q3".to_string(),
                reason: "answer Z is not an option".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_fields_are_format_errors() {
        for document in [
            r#"{"Q1": {"Options": {"A": "a"}, "Answer": ["A"]}}"#,
            r#"{"Q1": {"Question": "q", "Answer": ["A"]}}"#,
            r#"{"Q1": {"Question": "q", "Options": {"A": "a"}}}"#,
            r#"{"Q1": {"Question": "q", "Options": {}, "Answer": ["A"]}}"#,
            r#"{"Q1": {"Question": "q", "Options": {"A": "a"}, "Answer": []}}"#,
            r#"{"Q1": {"Question": "q", "Options": "A", "Answer": ["A"]}}"#,
            r#"{"Q1": null}"#,
        ] {
            let result = QuestionBank::from_json(document, &LoaderConfig::default());
            assert!(
                matches!(&result, Err(Error::Format { key, .. }) if key == "Q1"),
                "{document} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_malformed_entry_aborts_whole_import() {
        let result = QuestionBank::load(
            [
                ("Q1", raw("ok", &[("A", "a")], &["A"])),
                ("Q2", raw("", &[("A", "a")], &["A"])),
                ("Q3", raw("ok", &[("A", "a")], &["A"])),
            ],
            &LoaderConfig::default(),
        );
        assert!(matches!(result, Err(Error::Format { key, .. }) if key == "Q2"));
    }

    #[test]
    fn test_document_must_be_object() {
        assert!(matches!(
            QuestionBank::from_json("[1, 2]", &LoaderConfig::default()),
            Err(Error::Document(_))
        ));
        assert!(matches!(
            QuestionBank::from_json("{not json", &LoaderConfig::default()),
            Err(Error::Document(_))
        ));
    }

    #[test]
    fn test_insufficient_questions() {
        let result = QuestionBank::from_json(DOCUMENT, &LoaderConfig { min_questions: 3 });
        assert_eq!(
            result,
            Err(Error::InsufficientQuestions {
                required: 3,
                actual: 2,
            })
        );

        let empty = QuestionBank::from_json("{}", &LoaderConfig::default());
        assert_eq!(
            empty,
            Err(Error::InsufficientQuestions {
                required: 1,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_invalid_loader_config() {
        let result = QuestionBank::from_json(DOCUMENT, &LoaderConfig { min_questions: 0 });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_option_keys_rejected() {
        let result = QuestionBank::load(
            [("Q1", raw("q", &[("A", "a"), ("A", "b")], &["A"]))],
            &LoaderConfig::default(),
        );
        assert!(matches!(result, Err(Error::Format { .. })));
    }

    #[test]
    fn test_duplicate_question_keys_name_the_key() {
        let result = QuestionBank::load(
            [
                ("Q1", raw("first", &[("A", "a")], &["A"])),
                ("Q2", raw("second", &[("A", "a")], &["A"])),
                ("Q1", raw("again", &[("B", "b")], &["B"])),
            ],
            &LoaderConfig::default(),
        );
        assert_eq!(
            result,
            Err(Error::Format {
                key: "Q1".to_string(),
                reason: "question key appears more than once".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_answers_collapse() {
        let bank = QuestionBank::load(
            [("Q1", raw("q", &[("A", "a"), ("B", "b")], &["B", "A", "B"]))],
            &LoaderConfig::default(),
        )
        .unwrap();
        assert_eq!(
            bank.get(0).unwrap().correct_keys().iter().collect_vec(),
            vec!["B", "A"]
        );
    }

    #[test]
    fn test_source_letter() {
        let bank = QuestionBank::from_json(DOCUMENT, &LoaderConfig::default()).unwrap();
        let question = bank.get(0).unwrap();
        assert_eq!(question.source_letter("D").as_deref(), Some("A"));
        assert_eq!(question.source_letter("C").as_deref(), Some("D"));
        assert_eq!(question.source_letter("Z"), None);
    }

    #[test]
    fn test_summary_and_title() {
        let bank = create_test_bank(12).with_title("Networking");
        assert_eq!(bank.summary(), "12 questions");
        assert_eq!(bank.title(), Some("Networking"));
        assert_eq!(create_test_bank(1).summary(), "1 question");
    }

    #[test]
    fn test_exam_title_from_file_name() {
        assert_eq!(exam_title_from_file_name("aws-saa.json"), "aws-saa");
        assert_eq!(exam_title_from_file_name("bank.v2.json"), "bank.v2");
        assert_eq!(exam_title_from_file_name("questions"), "questions");
        assert_eq!(exam_title_from_file_name("trailing."), "trailing.");
    }
}
