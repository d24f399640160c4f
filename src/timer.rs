//! Elapsed exam time
//!
//! The clock only records when an attempt started and stopped. The display
//! layer polls it once per [`ExamClock::tick_period`]; the clock itself never
//! affects grading.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::SystemTime;

/// Start and stop instants of one exam attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamClock {
    started_at: Option<SystemTime>,
    stopped_at: Option<SystemTime>,
}

impl ExamClock {
    /// Creates a clock started at `now`
    pub fn started_at(now: SystemTime) -> Self {
        Self {
            started_at: Some(now),
            stopped_at: None,
        }
    }

    /// Creates a clock started at the current time
    pub fn start_now() -> Self {
        Self::started_at(SystemTime::now())
    }

    /// Returns the start instant, if started
    pub fn start_time(&self) -> Option<SystemTime> {
        self.started_at
    }

    /// Checks whether the clock is counting
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    /// Stops the clock at `now`; stopping twice keeps the first instant
    pub fn stop_at(&mut self, now: SystemTime) {
        if self.is_running() {
            self.stopped_at = Some(now);
        }
    }

    /// Stops the clock at the current time
    pub fn stop(&mut self) {
        self.stop_at(SystemTime::now());
    }

    /// Time elapsed between the start and either the stop or `now`
    pub fn elapsed_at(&self, now: SystemTime) -> Duration {
        let Some(start) = self.started_at else {
            return Duration::ZERO;
        };
        self.stopped_at
            .unwrap_or(now)
            .duration_since(start)
            .unwrap_or_default()
    }

    /// Time elapsed up to the current time
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(SystemTime::now())
    }

    /// Elapsed time as `MM:SS` at `now`
    pub fn display_at(&self, now: SystemTime) -> String {
        format_elapsed(self.elapsed_at(now))
    }

    /// Elapsed time as `MM:SS`
    pub fn display(&self) -> String {
        self.display_at(SystemTime::now())
    }

    /// How often the display should refresh
    pub fn tick_period() -> Duration {
        crate::constants::timer::TICK_PERIOD
    }
}

/// Formats whole seconds as `MM:SS`; minutes grow past two digits as needed
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
