//! Scheduling abstractions for background tasks.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Result of checking whether a task should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCheck {
    /// Whether the task should run now
    pub should_run: bool,
    /// When to check again, if the schedule is not exhausted
    pub next_run: Option<DateTime<Utc>>,
}

impl ScheduleCheck {
    /// Run immediately with no future schedule.
    pub fn run_once() -> Self {
        Self {
            should_run: true,
            next_run: None,
        }
    }

    /// Do not run yet; check again at `next_run`.
    pub fn wait_until(next_run: DateTime<Utc>) -> Self {
        Self {
            should_run: false,
            next_run: Some(next_run),
        }
    }

    /// Run now and check again at `next_run`.
    pub fn run_and_schedule(next_run: DateTime<Utc>) -> Self {
        Self {
            should_run: true,
            next_run: Some(next_run),
        }
    }

    /// Schedule exhausted; never run again.
    pub fn done() -> Self {
        Self {
            should_run: false,
            next_run: None,
        }
    }
}

/// Determines when a recurring or one-shot task should execute.
pub trait Schedule {
    /// Check whether a task should run now given its last execution time.
    fn check(&self, last_run: Option<DateTime<Utc>>) -> ScheduleCheck;

    /// Next execution time after `after`, or `None` when exhausted.
    fn next_execution(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// Supported schedule shapes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ScheduleType {
    /// Fixed interval in seconds
    Interval {
        /// Interval duration in seconds
        seconds: u64,
    },
    /// One-time execution at a specific instant
    Once {
        /// Execution timestamp
        at: DateTime<Utc>,
    },
    /// Execute once, immediately on startup
    Immediate,
}

impl Schedule for ScheduleType {
    fn check(&self, last_run: Option<DateTime<Utc>>) -> ScheduleCheck {
        let now = Utc::now();

        match self {
            ScheduleType::Immediate => {
                if last_run.is_none() {
                    ScheduleCheck::run_once()
                } else {
                    ScheduleCheck::done()
                }
            }
            ScheduleType::Once { at } => match last_run {
                Some(_) => ScheduleCheck::done(),
                None if now >= *at => ScheduleCheck::run_once(),
                None => ScheduleCheck::wait_until(*at),
            },
            ScheduleType::Interval { seconds } => {
                let period = Duration::seconds(*seconds as i64);
                match last_run {
                    None => ScheduleCheck::run_and_schedule(now + period),
                    Some(last) if now - last >= period => {
                        ScheduleCheck::run_and_schedule(now + period)
                    }
                    Some(last) => ScheduleCheck::wait_until(last + period),
                }
            }
        }
    }

    fn next_execution(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ScheduleType::Immediate => None,
            ScheduleType::Once { at } => (*at > after).then_some(*at),
            ScheduleType::Interval { seconds } => {
                Some(after + Duration::seconds(*seconds as i64))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_runs_exactly_once() {
        let schedule = ScheduleType::Immediate;
        assert!(schedule.check(None).should_run);
        let second = schedule.check(Some(Utc::now()));
        assert!(!second.should_run);
        assert!(second.next_run.is_none());
    }

    #[test]
    fn once_waits_for_its_instant() {
        let at = Utc::now() + Duration::hours(1);
        let schedule = ScheduleType::Once { at };
        let check = schedule.check(None);
        assert!(!check.should_run);
        assert_eq!(check.next_run, Some(at));

        let past = ScheduleType::Once {
            at: Utc::now() - Duration::hours(1),
        };
        assert!(past.check(None).should_run);
    }

    #[test]
    fn interval_respects_period() {
        let schedule = ScheduleType::Interval { seconds: 60 };
        assert!(schedule.check(None).should_run);
        assert!(!schedule.check(Some(Utc::now())).should_run);
        assert!(
            schedule
                .check(Some(Utc::now() - Duration::seconds(61)))
                .should_run
        );
    }

    #[test]
    fn next_execution_advances_by_period() {
        let schedule = ScheduleType::Interval { seconds: 60 };
        let after = Utc::now();
        assert_eq!(
            schedule.next_execution(after),
            Some(after + Duration::seconds(60))
        );
    }
}
