pub mod channels;
pub mod health;
pub mod subscribers;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(channels::router(state.clone()))
        .merge(subscribers::router(state))
}

pub fn health_router() -> Router {
    health::router()
}
