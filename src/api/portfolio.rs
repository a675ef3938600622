//! Portfolio API
//!
//! Read-only views of the latest published snapshot:
//! - GET /api/portfolio - Full snapshot
//! - GET /api/portfolio/summary - Aggregated totals
//! - GET /api/portfolio/risk - Risk metrics (422 when the last risk pass failed)
//! - GET /api/portfolio/positions - Marked positions
//! - GET /api/portfolio/cash - Cash balances

use axum::{extract::State, routing::get, Json, Router};

use crate::api::ApiResponse;
use crate::error::{EngineError, Result};
use crate::services::risk::total_position_value;
use crate::types::{CashBalance, PortfolioSnapshot, PortfolioSummary, Position, RiskMetrics};
use crate::AppState;

/// Create portfolio router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_snapshot))
        .route("/summary", get(get_summary))
        .route("/risk", get(get_risk))
        .route("/positions", get(get_positions))
        .route("/cash", get(get_cash))
}

async fn get_snapshot(State(state): State<AppState>) -> Json<ApiResponse<PortfolioSnapshot>> {
    let snapshot = state.store.latest();
    Json(ApiResponse {
        data: (*snapshot).clone(),
    })
}

async fn get_summary(State(state): State<AppState>) -> Json<ApiResponse<PortfolioSummary>> {
    Json(ApiResponse {
        data: state.store.latest().summary.clone(),
    })
}

async fn get_risk(State(state): State<AppState>) -> Result<Json<ApiResponse<RiskMetrics>>> {
    let snapshot = state.store.latest();
    match &snapshot.risk {
        Some(risk) => Ok(Json(ApiResponse { data: risk.clone() })),
        None => Err(EngineError::DegeneratePortfolio {
            total_value: total_position_value(&snapshot.positions),
        }
        .into()),
    }
}

async fn get_positions(State(state): State<AppState>) -> Json<ApiResponse<Vec<Position>>> {
    Json(ApiResponse {
        data: state.store.latest().positions.clone(),
    })
}

async fn get_cash(State(state): State<AppState>) -> Json<ApiResponse<Vec<CashBalance>>> {
    Json(ApiResponse {
        data: state.store.latest().cash_balances.clone(),
    })
}
