//! Errors surfaced by the exam engine
//!
//! Every engine operation validates its input before touching any state, so
//! an `Err` always leaves the bank and session exactly as they were.

use serde::Serialize;
use thiserror::Error;

/// Result type used by every fallible engine operation
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while importing a bank or driving a session
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The document is not a mapping of question entries
    #[error("question document is malformed: {0}")]
    Document(String),
    /// A question entry is malformed; the whole import is rejected
    #[error("question {key} is malformed: {reason}")]
    Format {
        /// Key of the offending entry in the source document
        key: String,
        /// What is wrong with it
        reason: String,
    },
    /// The bank holds fewer questions than required
    #[error("not enough questions: at least {required} required, found {actual}")]
    InsufficientQuestions {
        /// Minimum number of questions
        required: usize,
        /// Number of questions found
        actual: usize,
    },
    /// The requested session size is outside the allowed range
    #[error("question count {requested} is outside of [{min},{max}]")]
    InvalidCount {
        /// Requested number of questions
        requested: usize,
        /// Smallest allowed count
        min: usize,
        /// Largest allowed count
        max: usize,
    },
    /// A position or index is out of bounds
    #[error("position {position} is outside of [0,{len})")]
    InvalidNavigation {
        /// Requested position
        position: usize,
        /// Number of valid positions
        len: usize,
    },
    /// The operation is not valid in the current lifecycle state
    #[error(transparent)]
    State(#[from] StateError),
}

/// Lifecycle violations
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// No question bank has been imported
    #[error("no question bank has been imported")]
    NoQuestionBank,
    /// No exam session is running
    #[error("no exam session has been started")]
    NoSession,
    /// The session has already been scored
    #[error("the exam has already been submitted")]
    AlreadyScored,
    /// The session has not been scored yet
    #[error("the exam has not been submitted yet")]
    NotScored,
    /// The question at a position cannot be resolved
    #[error("no question is available at position {position}")]
    QuestionUnavailable {
        /// Sequence position that failed to resolve
        position: usize,
    },
    /// The question is not part of the session
    #[error("question {id} is not part of this exam")]
    UnknownQuestion {
        /// Offending question id
        id: String,
    },
    /// The option does not belong to the question
    #[error("question {question} has no option {key}")]
    UnknownOption {
        /// Question id
        question: String,
        /// Offending option key
        key: String,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_names_question() {
        let error = Error::Format {
            key: "Q12".to_string(),
            reason: "answer Z is not an option".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "question Q12 is malformed: answer Z is not an option"
        );
    }

    #[test]
    fn test_insufficient_questions_message() {
        let error = Error::InsufficientQuestions {
            required: 10,
            actual: 3,
        };
        assert!(error.to_string().contains("10"));
        assert!(error.to_string().contains('3'));
    }

    #[test]
    fn test_state_error_is_transparent() {
        let error: Error = StateError::NoSession.into();
        assert_eq!(error.to_string(), StateError::NoSession.to_string());
        assert_eq!(error, Error::State(StateError::NoSession));
    }

    #[test]
    fn test_error_serializes() {
        let error = Error::InvalidNavigation {
            position: 7,
            len: 5,
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("InvalidNavigation"));
        assert!(json.contains('7'));
    }
}
