//! Futures API
//!
//! - GET /api/futures/contracts - Listed contracts
//! - GET /api/futures/contracts/:symbol - One contract
//! - GET /api/futures/positions - Contract positions (tick-valued)
//! - POST /api/futures/margin-check - Pre-trade margin check

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::futures::{check_margin, find_contract};
use crate::types::{ContractPosition, FuturesContract, MarginCheck, MarginCheckRequest};
use crate::AppState;

/// Create futures router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contracts", get(list_contracts))
        .route("/contracts/:symbol", get(get_contract))
        .route("/positions", get(list_positions))
        .route("/margin-check", post(margin_check))
}

async fn list_contracts(State(state): State<AppState>) -> Json<ApiResponse<Vec<FuturesContract>>> {
    Json(ApiResponse {
        data: state.store.latest().contracts.clone(),
    })
}

async fn get_contract(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<FuturesContract>>> {
    let snapshot = state.store.latest();
    let contract = find_contract(&snapshot.contracts, &symbol)?;
    Ok(Json(ApiResponse {
        data: contract.clone(),
    }))
}

async fn list_positions(State(state): State<AppState>) -> Json<ApiResponse<Vec<ContractPosition>>> {
    Json(ApiResponse {
        data: state.store.latest().contract_positions.clone(),
    })
}

/// Check the request against the latest snapshot's available margin.
async fn margin_check(
    State(state): State<AppState>,
    Json(request): Json<MarginCheckRequest>,
) -> Result<Json<ApiResponse<MarginCheck>>> {
    if !request.quantity.is_finite() || request.quantity <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "quantity must be positive, got {}",
            request.quantity
        )));
    }

    let snapshot = state.store.latest();
    let contract = find_contract(&snapshot.contracts, &request.symbol)?;
    let price = request.price.unwrap_or(contract.current_price);
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::BadRequest(format!("price must be positive, got {}", price)));
    }

    let check = check_margin(contract, request.quantity, price, snapshot.summary.available_margin);
    Ok(Json(ApiResponse { data: check }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{get, post_json, send, state};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_contracts() {
        let (status, body) = send(state(), get("/api/futures/contracts")).await;

        assert_eq!(status, StatusCode::OK);
        let symbols: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["symbol"].as_str().unwrap())
            .collect();
        assert_eq!(symbols, vec!["ES", "NQ", "CL", "GC"]);
        assert_eq!(body["data"][0]["lastPrice"], 4200.0);
        assert_eq!(body["data"][0]["currentPrice"], 4250.0);
    }

    #[tokio::test]
    async fn test_get_contract_case_insensitive() {
        let (status, body) = send(state(), get("/api/futures/contracts/gc")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["symbol"], "GC");
        assert_eq!(body["data"]["contractSize"], 100.0);
    }

    #[tokio::test]
    async fn test_get_unknown_contract() {
        let (status, body) = send(state(), get("/api/futures/contracts/ZB")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNKNOWN_CONTRACT");
    }

    #[tokio::test]
    async fn test_list_positions_tick_pnl() {
        let (_, body) = send(state(), get("/api/futures/positions")).await;

        // NQ long 15_800 -> 15_950: 600 ticks * $5
        assert_eq!(body["data"][0]["symbol"], "NQ");
        assert_eq!(body["data"][0]["unrealizedPnl"], 3000.0);
        // ES short 4280 -> 4250: 120 ticks * $12.50
        assert_eq!(body["data"][1]["unrealizedPnl"], 1500.0);
    }

    #[tokio::test]
    async fn test_margin_check() {
        let request = post_json(
            "/api/futures/margin-check",
            json!({ "symbol": "ES", "quantity": 1, "price": 4000.0 }),
        );
        let (status, body) = send(state(), request).await;

        assert_eq!(status, StatusCode::OK);
        let required = body["data"]["requiredMargin"].as_f64().unwrap();
        assert!((required - 12_000.0).abs() < 1e-6);
        assert_eq!(body["data"]["notional"], 200_000.0);
        assert_eq!(body["data"]["sufficient"], true);
    }

    #[tokio::test]
    async fn test_margin_check_insufficient_is_reported() {
        let request = post_json("/api/futures/margin-check", json!({ "symbol": "ES", "quantity": 50 }));
        let (status, body) = send(state(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["price"], 4250.0);
        assert_eq!(body["data"]["sufficient"], false);
    }

    #[tokio::test]
    async fn test_margin_check_unknown_contract() {
        let request = post_json("/api/futures/margin-check", json!({ "symbol": "ZB", "quantity": 1 }));
        let (status, body) = send(state(), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNKNOWN_CONTRACT");
    }

    #[tokio::test]
    async fn test_margin_check_rejects_bad_quantity() {
        let request = post_json("/api/futures/margin-check", json!({ "symbol": "ES", "quantity": 0 }));
        let (status, body) = send(state(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }
}
