//! Valuation API
//!
//! - POST /api/valuation - Value a caller-supplied book against caller-supplied
//!   prices. Nothing is stored; a failed risk pass fails the request.
//!   Holding periods above the configured maximum are rejected.

use axum::{extract::State, routing::post, Json, Router};

use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::snapshot::value_book;
use crate::types::{ValuationRequest, ValuationResponse};
use crate::AppState;

/// Create valuation router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(value))
}

async fn value(
    State(state): State<AppState>,
    Json(request): Json<ValuationRequest>,
) -> Result<Json<ApiResponse<ValuationResponse>>> {
    let max_days = state.engine.config().max_holding_period_days;
    if let Some(position) = request
        .positions
        .iter()
        .find(|p| p.common().holding_period_days > max_days)
    {
        return Err(AppError::BadRequest(format!(
            "holdingPeriodDays for {} exceeds {}",
            position.symbol(),
            max_days
        )));
    }

    let response = value_book(
        &request.positions,
        &request.cash_balances,
        &request.prices,
        &state.engine,
        request.previous_timestamp,
    )?;
    Ok(Json(ApiResponse { data: response }))
}
