use agent_market_core::checkout::CheckoutRequest;
use agent_market_core::error::MarketError;
use agent_market_core::seed::seed_with;
use agent_market_core::store::AgentRepository;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info, warn};

use crate::AppState;

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Checkout failures carry the message in a nested object.
fn checkout_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": { "message": message.into() } }))).into_response()
}

/// Run a store call on the blocking pool. `FileStore` touches the disk, so
/// it must stay off the async workers.
async fn on_store<T, F>(state: &AppState, f: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&dyn AgentRepository) -> Result<T, MarketError> + Send + 'static,
{
    let repo = state.repo.clone();
    match tokio::task::spawn_blocking(move || f(repo.as_ref())).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("store task failed: {e}")),
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_agents(State(state): State<AppState>) -> Response {
    match on_store(&state, |repo| repo.list()).await {
        Ok(agents) => (StatusCode::OK, Json(agents)).into_response(),
        Err(e) => {
            error!(error = %e, "listing agents failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch agents")
        }
    }
}

/// A non-numeric id can't name a record, so it's a plain 404.
pub async fn get_agent(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let Ok(id) = raw_id.parse::<u32>() else {
        return error_response(StatusCode::NOT_FOUND, "Agent not found");
    };
    match on_store(&state, move |repo| repo.get(id)).await {
        Ok(Some(agent)) => (StatusCode::OK, Json(agent)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Agent not found"),
        Err(e) => {
            error!(id, error = %e, "fetching agent failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch agent")
        }
    }
}

pub async fn seed(State(state): State<AppState>) -> Response {
    let records = state.seed_data.to_vec();
    match on_store(&state, move |repo| seed_with(repo, records)).await {
        Ok(count) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!("Database seeded with {count} agents"),
                "count": count,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "seeding failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Failed to seed database" })),
            )
                .into_response()
        }
    }
}

pub async fn create_checkout(
    State(state): State<AppState>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return checkout_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let checkout = match request.validate() {
        Ok(c) => c,
        Err(e) => return checkout_error(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let Some(gateway) = state.payments.as_ref() else {
        return checkout_error(StatusCode::SERVICE_UNAVAILABLE, "Payments are not configured");
    };

    match gateway.create_session(&checkout).await {
        Ok(session) => {
            info!(session_id = %session.session_id, name = %checkout.name, "checkout session created");
            (StatusCode::OK, Json(session)).into_response()
        }
        Err(e) => {
            error!(error = %e, "payment processor call failed");
            checkout_error(StatusCode::BAD_GATEWAY, "Failed to create checkout session")
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(provider) = state.identity.as_ref() else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Sign-in is not configured");
    };
    let Some(token) = bearer_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    match provider.lookup_session(token).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(json!({ "userId": user.id, "greeting": user.greeting() })),
        )
            .into_response(),
        Ok(None) => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Err(e) => {
            warn!(error = %e, "identity lookup failed");
            error_response(StatusCode::BAD_GATEWAY, "Failed to verify session")
        }
    }
}
