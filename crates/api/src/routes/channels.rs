use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use sift_core::ports::ChannelRegistry;
use sift_core::types::Channel;

use crate::error::{ApiResult, AppError};
use crate::state::{AppState, RequestId};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/channels", post(register_channel).get(list_channels))
        .route("/channels/{id}/set-active", post(set_active))
        .route("/channels/{id}/set-inactive", post(set_inactive))
        .route("/channels/{id}/themes", patch(update_themes))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RegisterChannelRequest {
    channel_id: String,
    channel_name: String,
    themes: Vec<String>,
    offset_id: Option<i64>,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct RegisterChannelResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct ChannelListResponse {
    items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct UpdateThemesRequest {
    themes: Vec<String>,
}

/// Registering an id that already exists merges the incoming themes into the
/// stored channel instead of failing.
async fn register_channel(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<RegisterChannelRequest>,
) -> ApiResult<(StatusCode, Json<RegisterChannelResponse>)> {
    if payload.channel_id.trim().is_empty() || payload.channel_name.trim().is_empty() {
        return Err(
            AppError::BadRequest("channel_id and channel_name required".to_string())
                .with_request_id(&request_id.0),
        );
    }

    let channel = Channel {
        id: payload.channel_id,
        name: payload.channel_name,
        themes: payload.themes,
        offset_id: payload.offset_id,
        is_active: payload.is_active,
    };

    let id = state
        .channels
        .register(&channel)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;

    Ok((StatusCode::CREATED, Json(RegisterChannelResponse { id })))
}

async fn list_channels(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> ApiResult<Json<ChannelListResponse>> {
    let items = state
        .channels
        .list_all()
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;

    Ok(Json(ChannelListResponse { items }))
}

async fn set_active(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .channels
        .set_active(&id, true)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn set_inactive(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .channels
        .set_active(&id, false)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn update_themes(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateThemesRequest>,
) -> ApiResult<StatusCode> {
    state
        .channels
        .update_themes(&id, &payload.themes)
        .await
        .map_err(|err| AppError::from(err).with_request_id(&request_id.0))?;

    Ok(StatusCode::NO_CONTENT)
}
