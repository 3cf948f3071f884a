use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware::from_fn, Router};
use sift_core::config::Settings;
use sift_store::{ChannelIndex, SearchStore, SubscriberIndex};
use tokio::net::TcpListener;
use tracing::info;

mod error;
mod middleware;
mod routes;
mod state;

use crate::middleware::request_id::request_id;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let settings = Settings::from_env();

    let store = Arc::new(SearchStore::new(
        &settings.store_url,
        &settings.store_username,
        &settings.store_password,
        settings.store_insecure,
    )?);
    let state = AppState {
        channels: Arc::new(ChannelIndex::new(store.clone())),
        subscribers: Arc::new(SubscriberIndex::new(store)),
    };

    let app = Router::new()
        .merge(routes::health_router())
        .merge(routes::router(state))
        .layer(from_fn(request_id));

    let addr: SocketAddr = settings.api_bind.parse()?;
    info!(%addr, "starting api");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
