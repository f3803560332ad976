//! HTTP client for the Calendar v3 endpoints.

use crate::models::{FreeBusyRequest, FreeBusyResponse, GcalEvent, GcalEventList};
use crate::CalendarResult;
use almanac_error::{CalendarError, CalendarErrorKind};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_retry2::strategy::{jitter, ExponentialBackoff};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Typed client for the Calendar v3 REST API.
///
/// Holds only the HTTP connection pool; the per-user Bearer token is passed
/// into each call because tokens live encrypted in the database, one per
/// Discord user.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarClient {
    /// Create a client against the production API.
    pub fn new() -> Self {
        Self::with_base_url(API_BASE)
    }

    /// Create a client against an alternate base URL (test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Insert an event into the user's primary calendar.
    #[instrument(skip(self, access_token, body))]
    pub async fn insert_event(
        &self,
        access_token: &str,
        body: &GcalEvent,
    ) -> CalendarResult<GcalEvent> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        self.execute(|| {
            self.http
                .request(Method::POST, &url)
                .bearer_auth(access_token)
                .json(body)
        })
        .await
    }

    /// List upcoming events ordered by start time, recurring events
    /// expanded into instances.
    #[instrument(skip(self, access_token))]
    pub async fn list_events(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        max_results: u8,
    ) -> CalendarResult<Vec<GcalEvent>> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let list: GcalEventList = self
            .execute(|| {
                self.http
                    .request(Method::GET, &url)
                    .bearer_auth(access_token)
                    .query(&[
                        ("timeMin", time_min.as_str()),
                        ("maxResults", &max_results.to_string()),
                        ("singleEvents", "true"),
                        ("orderBy", "startTime"),
                    ])
            })
            .await?;
        Ok(list.items)
    }

    /// Free-text search over the user's events.
    #[instrument(skip(self, access_token))]
    pub async fn search_events(
        &self,
        access_token: &str,
        query: &str,
        max_results: u8,
    ) -> CalendarResult<Vec<GcalEvent>> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        let list: GcalEventList = self
            .execute(|| {
                self.http
                    .request(Method::GET, &url)
                    .bearer_auth(access_token)
                    .query(&[
                        ("q", query),
                        ("maxResults", &max_results.to_string()),
                        ("singleEvents", "true"),
                        ("orderBy", "startTime"),
                    ])
            })
            .await?;
        Ok(list.items)
    }

    /// Fetch a single event by id.
    #[instrument(skip(self, access_token))]
    pub async fn get_event(&self, access_token: &str, event_id: &str) -> CalendarResult<GcalEvent> {
        let url = format!("{}/calendars/primary/events/{event_id}", self.base_url);
        self.execute(|| self.http.request(Method::GET, &url).bearer_auth(access_token))
            .await
            .map_err(|e| not_found_as_event(e, event_id))
    }

    /// Apply a partial update to an event.
    #[instrument(skip(self, access_token, body))]
    pub async fn patch_event(
        &self,
        access_token: &str,
        event_id: &str,
        body: &GcalEvent,
    ) -> CalendarResult<GcalEvent> {
        let url = format!("{}/calendars/primary/events/{event_id}", self.base_url);
        self.execute(|| {
            self.http
                .request(Method::PATCH, &url)
                .bearer_auth(access_token)
                .json(body)
        })
        .await
        .map_err(|e| not_found_as_event(e, event_id))
    }

    /// Delete an event.
    #[instrument(skip(self, access_token))]
    pub async fn delete_event(&self, access_token: &str, event_id: &str) -> CalendarResult<()> {
        let url = format!("{}/calendars/primary/events/{event_id}", self.base_url);
        let builder = || {
            self.http
                .request(Method::DELETE, &url)
                .bearer_auth(access_token)
        };
        let retry_strategy = strategy();
        Retry::spawn(retry_strategy, || async {
            let response = builder().send().await.map_err(transport_error)?;
            // Delete answers 204; treat 410 Gone as already deleted.
            if response.status().is_success() || response.status() == StatusCode::GONE {
                return Ok(());
            }
            Err(status_error(response).await)
        })
        .await
        .map_err(|e| not_found_as_event(e, event_id))
    }

    /// Query free/busy over a window on the primary calendar.
    #[instrument(skip(self, access_token, request))]
    pub async fn free_busy(
        &self,
        access_token: &str,
        request: &FreeBusyRequest,
    ) -> CalendarResult<FreeBusyResponse> {
        let url = format!("{}/freeBusy", self.base_url);
        self.execute(|| {
            self.http
                .request(Method::POST, &url)
                .bearer_auth(access_token)
                .json(request)
        })
        .await
    }

    /// Send a request with retry, decoding the JSON response body.
    async fn execute<T, F>(&self, builder: F) -> CalendarResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let retry_strategy = strategy();
        Retry::spawn(retry_strategy, || async {
            let response = builder().send().await.map_err(transport_error)?;
            let status = response.status();
            if !status.is_success() {
                return Err(status_error(response).await);
            }
            debug!(%status, "calendar request succeeded");
            response.json::<T>().await.map_err(|e| {
                RetryError::Permanent(CalendarError::new(CalendarErrorKind::Decode(e.to_string())))
            })
        })
        .await
    }
}

/// 4 attempts, 500ms initial backoff doubling to a 5s cap, with jitter.
fn strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(500)
        .factor(2)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(3)
}

fn transport_error(e: reqwest::Error) -> RetryError<CalendarError> {
    warn!(error = %e, "calendar transport error, will retry");
    RetryError::Transient {
        err: CalendarError::new(CalendarErrorKind::Api(e.to_string())),
        retry_after: None,
    }
}

async fn status_error(response: reqwest::Response) -> RetryError<CalendarError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let kind = match status {
        StatusCode::UNAUTHORIZED => CalendarErrorKind::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => CalendarErrorKind::RateLimited,
        StatusCode::NOT_FOUND | StatusCode::GONE => {
            CalendarErrorKind::EventNotFound(String::new())
        }
        s if s.is_server_error() => CalendarErrorKind::Api(format!("status {s}: {body}")),
        s => CalendarErrorKind::Rejected(s.as_u16(), truncate(&body)),
    };
    let err = CalendarError::new(kind);
    if err.kind.is_retryable() {
        warn!(%status, "calendar request failed, will retry");
        RetryError::Transient {
            err,
            retry_after: None,
        }
    } else {
        warn!(%status, "calendar request rejected");
        RetryError::Permanent(err)
    }
}

/// Fill in the event id on a not-found error so replies can echo it.
fn not_found_as_event(e: CalendarError, event_id: &str) -> CalendarError {
    match e.kind {
        CalendarErrorKind::EventNotFound(_) => {
            CalendarError::new(CalendarErrorKind::EventNotFound(event_id.to_string()))
        }
        _ => e,
    }
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
