//! axum router for health, metrics, and the OAuth broker routes.

use crate::oauth::{self, OAuthBroker};
use crate::ServiceMetrics;
use almanac_database::UserRepository;
use almanac_error::{ServerError, ServerErrorKind};
use almanac_security::TokenCipher;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::get;
use axum::Router;
use diesel::pg::PgConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Shared state for the HTTP surface.
#[derive(Clone)]
pub struct AppState {
    /// User repository for token storage
    pub users: UserRepository,
    /// Raw connection handle for readiness pings
    pub conn: Arc<Mutex<PgConnection>>,
    /// Token encryption
    pub cipher: Arc<TokenCipher>,
    /// Pending OAuth states
    pub broker: Arc<OAuthBroker>,
    /// Shared counters
    pub metrics: ServiceMetrics,
    /// Public base URL of this service, no trailing slash
    pub base_url: String,
    /// Supabase project URL
    pub supabase_url: String,
    /// Supabase anon key, forwarded on the authorize URL when set
    pub supabase_anon_key: Option<String>,
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/connect/:discord_id", get(connect))
        .route("/oauth/callback", get(oauth_callback))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
///
/// # Errors
///
/// Returns `StartFailed` when the listener cannot bind.
pub async fn serve(router: Router, host: &str, port: u16) -> Result<(), ServerError> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::StartFailed(format!("{addr}: {e}"))))?;
    info!(%addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down http server");
        })
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::StartFailed(e.to_string())))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "almanac",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/healthz", "/readyz", "/metrics", "/connect/{discord_id}", "/oauth/callback"],
    }))
}

async fn healthz() -> impl IntoResponse {
    Json(json!({"status": "healthy", "ok": true}))
}

async fn readyz(State(state): State<AppState>) -> Response {
    let ready = {
        let mut conn = state.conn.lock().await;
        almanac_database::ping(&mut conn)
    };
    let status = if ready {
        StatusCode::OK
    } else {
        warn!("readiness probe failed database ping");
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(json!({"db": ready, "ok": ready}))).into_response()
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Entry point linked from the `/connect` Discord command.
async fn connect(State(state): State<AppState>, Path(discord_id): Path<u64>) -> Redirect {
    let oauth_state = state.broker.mint_state(discord_id);
    let redirect_to = format!("{}/oauth/callback", state.base_url);
    let url = oauth::authorize_url(
        &state.supabase_url,
        state.supabase_anon_key.as_deref(),
        &redirect_to,
        &oauth_state,
    );
    info!(discord_id, "redirecting to supabase authorize");
    Redirect::temporary(&url)
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    state: Option<String>,
    provider_token: Option<String>,
    provider_refresh_token: Option<String>,
    expires_at: Option<i64>,
}

/// Landing route for the Supabase redirect carrying provider tokens.
async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(oauth_state) = params.state else {
        return bad_request("missing state");
    };
    let discord_id = match state.broker.consume_state(&oauth_state) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "oauth callback with bad state");
            return bad_request("invalid or expired state");
        }
    };
    let token = match oauth::token_from_callback(
        params.provider_token,
        params.provider_refresh_token,
        params.expires_at,
    ) {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, discord_id, "oauth callback without provider token");
            return bad_request("missing provider token");
        }
    };

    let ciphertext = match state.cipher.seal_token(&token) {
        Ok(ciphertext) => ciphertext,
        Err(e) => {
            error!(error = %e, discord_id, "failed to seal provider token");
            return server_error();
        }
    };
    if let Err(e) = state
        .users
        .store_token(discord_id as i64, None, &ciphertext)
        .await
    {
        error!(error = %e, discord_id, "failed to store provider token");
        return server_error();
    }

    state.metrics.record_oauth_connect();
    info!(discord_id, "linked google calendar");
    Html(oauth::success_page(discord_id)).into_response()
}

fn bad_request(detail: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": detail}))).into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "internal error"})),
    )
        .into_response()
}
