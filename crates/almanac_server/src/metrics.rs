//! Metrics collection for bot and broker operations.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector shared between the gateway handler, the OAuth broker,
/// and the reminder scheduler.
#[derive(Debug, Clone)]
pub struct ServiceMetrics {
    inner: Arc<ServiceMetricsInner>,
}

#[derive(Debug)]
struct ServiceMetricsInner {
    started_at: Instant,
    commands: AtomicU64,
    command_failures: AtomicU64,
    events_created: AtomicU64,
    reminders_sent: AtomicU64,
    reminder_failures: AtomicU64,
    oauth_connects: AtomicU64,
    calendar_errors: AtomicU64,
}

/// Point-in-time view of the counters, served on `/metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Seconds since process start
    pub uptime_seconds: u64,
    /// Slash command invocations
    pub commands: u64,
    /// Slash commands that ended in an error reply
    pub command_failures: u64,
    /// Calendar events created through the bot
    pub events_created: u64,
    /// Reminder DMs delivered
    pub reminders_sent: u64,
    /// Reminder deliveries that failed
    pub reminder_failures: u64,
    /// Completed OAuth link flows
    pub oauth_connects: u64,
    /// Google Calendar API failures after retry
    pub calendar_errors: u64,
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ServiceMetricsInner {
                started_at: Instant::now(),
                commands: AtomicU64::new(0),
                command_failures: AtomicU64::new(0),
                events_created: AtomicU64::new(0),
                reminders_sent: AtomicU64::new(0),
                reminder_failures: AtomicU64::new(0),
                oauth_connects: AtomicU64::new(0),
                calendar_errors: AtomicU64::new(0),
            }),
        }
    }

    /// Records a slash command invocation.
    pub fn record_command(&self) {
        self.inner.commands.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a slash command that replied with an error.
    pub fn record_command_failure(&self) {
        self.inner.command_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a calendar event created through the bot.
    pub fn record_event_created(&self) {
        self.inner.events_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a delivered reminder.
    pub fn record_reminder_sent(&self) {
        self.inner.reminders_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed reminder delivery attempt.
    pub fn record_reminder_failure(&self) {
        self.inner.reminder_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed OAuth link.
    pub fn record_oauth_connect(&self) {
        self.inner.oauth_connects.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a Calendar API failure that survived retries.
    pub fn record_calendar_error(&self) {
        self.inner.calendar_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Captures the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_seconds: self.inner.started_at.elapsed().as_secs(),
            commands: self.inner.commands.load(Ordering::Relaxed),
            command_failures: self.inner.command_failures.load(Ordering::Relaxed),
            events_created: self.inner.events_created.load(Ordering::Relaxed),
            reminders_sent: self.inner.reminders_sent.load(Ordering::Relaxed),
            reminder_failures: self.inner.reminder_failures.load(Ordering::Relaxed),
            oauth_connects: self.inner.oauth_connects.load(Ordering::Relaxed),
            calendar_errors: self.inner.calendar_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = ServiceMetrics::new();
        metrics.record_command();
        metrics.record_command();
        metrics.record_command_failure();
        metrics.record_event_created();
        metrics.record_oauth_connect();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.commands, 2);
        assert_eq!(snapshot.command_failures, 1);
        assert_eq!(snapshot.events_created, 1);
        assert_eq!(snapshot.oauth_connects, 1);
        assert_eq!(snapshot.reminders_sent, 0);
    }

    #[test]
    fn clones_share_counters() {
        let metrics = ServiceMetrics::new();
        let clone = metrics.clone();
        clone.record_reminder_sent();
        assert_eq!(metrics.snapshot().reminders_sent, 1);
    }

    #[test]
    fn snapshot_serializes() {
        let snapshot = ServiceMetrics::new().snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("commands").is_some());
        assert!(json.get("uptime_seconds").is_some());
    }
}
