//! # Exam Engine
//!
//! This library provides the session logic behind a multiple-choice exam
//! runner. It imports and validates a question bank, draws a random subset
//! of questions for each attempt, shuffles options per question, records
//! multi-select answers and review marks, and grades the attempt with
//! exact-match scoring.
//!
//! The engine owns no I/O and no rendering. A presentation layer feeds it
//! already-read documents and user events, and renders the snapshots in
//! [`view`].
//!
//! ```
//! use exam_engine::{Exam, ExamConfig};
//!
//! let mut exam = Exam::new(ExamConfig::default())?;
//! exam.import_json(
//!     Some("sample.json"),
//!     r#"{"Q1": {"Question": "2 + 2?", "Options": {"A": "3", "B": "4"}, "Answer": ["B"]}}"#,
//! )?;
//!
//! let session = exam.start(1)?;
//! session.toggle_current_answer("B")?;
//! assert_eq!(exam.submit()?.percentage, 100);
//! # Ok::<(), exam_engine::Error>(())
//! ```

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]

pub mod bank;
pub mod cache;
pub mod constants;
pub mod error;
pub mod exam;
pub mod presenter;
pub mod scoring;
pub mod sequence;
pub mod session;
pub mod timer;
pub mod view;

pub use bank::{Question, QuestionBank, QuestionId};
pub use error::{Error, Result, StateError};
pub use exam::{Exam, ExamConfig};
pub use presenter::PresentedQuestion;
pub use scoring::{ScoreReport, WrongAnswer};
pub use session::{ExamSession, Phase, Selection};
pub use view::ExamView;
