pub mod futures;
pub mod health;
pub mod portfolio;
pub mod prices;
pub mod valuation;

use crate::AppState;
use axum::Router;
use serde::Serialize;

/// Envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/portfolio", portfolio::router())
        .nest("/api/futures", futures::router())
        .nest("/api/prices", prices::router())
        .nest("/api/valuation", valuation::router())
}
