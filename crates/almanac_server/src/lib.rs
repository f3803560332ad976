//! HTTP surface and background workers for the Almanac calendar bot.
//!
//! This crate hosts three concerns:
//!
//! - the axum router serving health, readiness, metrics, and the OAuth
//!   broker routes ([`create_router`], [`serve`]);
//! - the in-memory OAuth state cache bridging Discord users into the
//!   Supabase-hosted Google consent flow ([`OAuthBroker`]);
//! - the reminder scheduler delivering event reminders over Discord DM
//!   ([`ReminderScheduler`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod metrics;
mod oauth;
mod routes;
mod schedule;
mod scheduler;

pub use metrics::{MetricsSnapshot, ServiceMetrics};
pub use oauth::OAuthBroker;
pub use routes::{create_router, serve, AppState};
pub use schedule::{Schedule, ScheduleCheck, ScheduleType};
pub use scheduler::ReminderScheduler;
