use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use sift_core::ports::SubscriberRegistry;
use sift_core::types::{SubscribedTheme, Subscriber};

use crate::error::{ApiResult, AppError};
use crate::state::{AppState, RequestId};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/subscribers",
            post(register_subscriber).get(list_subscribers),
        )
        .route("/subscribers/{id}/subscribe", post(subscribe))
        .route("/subscribers/{id}/unsubscribe", post(unsubscribe))
        .route("/subscribers/{id}/themes", patch(update_keywords))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ThemeRequest {
    theme: String,
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterSubscriberRequest {
    telegram_id: String,
    telegram_username: Option<String>,
    #[serde(default = "default_true")]
    is_subscribed: bool,
    #[serde(default)]
    subscribed_themes: Vec<ThemeRequest>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct RegisterSubscriberResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct SubscriberListResponse {
    items: Vec<Subscriber>,
}

async fn register_subscriber(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<RegisterSubscriberRequest>,
) -> ApiResult<(StatusCode, Json<RegisterSubscriberResponse>)> {
    if payload.telegram_id.trim().is_empty() {
        return Err(AppError::BadRequest("telegram_id required".to_string())
            .with_request_id(&request_id.0));
    }

    let subscriber = Subscriber {
        id: payload.telegram_id,
        username: payload.telegram_username,
        is_subscribed: payload.is_subscribed,
        subscribed_themes: payload
            .subscribed_themes
            .into_iter()
            .map(|entry| SubscribedTheme {
                theme: entry.theme,
                keywords: entry.keywords,
                last_notified_at: None,
            })
            .collect(),
    };

    let id = state
        .subscribers
        .register(&subscriber)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterSubscriberResponse { id }),
    ))
}

/// Returns every subscriber, whether currently subscribed or not.
async fn list_subscribers(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> ApiResult<Json<SubscriberListResponse>> {
    let mut items = state
        .subscribers
        .list(false)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;
    let subscribed = state
        .subscribers
        .list(true)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;
    items.extend(subscribed);

    Ok(Json(SubscriberListResponse { items }))
}

async fn subscribe(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .subscribers
        .set_subscribed(&id, true)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn unsubscribe(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .subscribers
        .set_subscribed(&id, false)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Upserts one theme entry: existing themes get their keyword list replaced,
/// new themes start with an unset watermark.
async fn update_keywords(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(payload): Json<ThemeRequest>,
) -> ApiResult<StatusCode> {
    state
        .subscribers
        .update_keywords(&id, &payload.theme, &payload.keywords)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;

    Ok(StatusCode::NO_CONTENT)
}
