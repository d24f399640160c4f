//! Configuration constants for the exam engine
//!
//! This module contains the default limits and timings used throughout
//! the engine. Runtime configuration structs take their defaults from here.

/// Question bank and session sizing constants
pub mod exam {
    /// Minimum number of questions an imported bank must contain
    pub const MIN_QUESTION_COUNT: usize = 1;
    /// Number of questions offered by default when starting an exam
    pub const DEFAULT_QUESTION_COUNT: usize = 65;
    /// Label shown in place of an empty answer
    pub const UNANSWERED_LABEL: &str = "Unanswered";
    /// Separator between selected options in a formatted user answer
    pub const USER_ANSWER_SEPARATOR: &str = "、";
}

/// Presented question cache constants
pub mod cache {
    /// Maximum number of presented questions kept per session
    pub const CAPACITY: usize = 100;
}

/// Elapsed time clock constants
pub mod timer {
    use std::time::Duration;

    /// Period of the display refresh tick
    pub const TICK_PERIOD: Duration = Duration::from_secs(1);
}

/// Memory housekeeping constants
pub mod housekeeping {
    use std::time::Duration;

    /// Interval at which an idle, finished session may be released
    pub const INTERVAL: Duration = Duration::from_secs(300);
}
