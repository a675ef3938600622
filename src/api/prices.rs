//! Prices API
//!
//! - GET /api/prices - All quotes in the price book
//! - GET /api/prices/:symbol - One quote
//! - POST /api/prices - Push a quote; picked up by the next pipeline tick

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::debug;

use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::PriceQuote;
use crate::AppState;

/// Create prices router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_prices).post(update_price))
        .route("/:symbol", get(get_price))
}

async fn list_prices(State(state): State<AppState>) -> Json<ApiResponse<Vec<PriceQuote>>> {
    Json(ApiResponse {
        data: state.price_book.get_all_prices(),
    })
}

async fn get_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<PriceQuote>>> {
    let price = state
        .price_book
        .get_price(&symbol)
        .ok_or_else(|| AppError::NotFound(format!("No price for {}", symbol)))?;

    Ok(Json(ApiResponse {
        data: PriceQuote {
            symbol: symbol.to_uppercase(),
            price,
        },
    }))
}

async fn update_price(
    State(state): State<AppState>,
    Json(quote): Json<PriceQuote>,
) -> Result<Json<ApiResponse<PriceQuote>>> {
    if quote.symbol.trim().is_empty() {
        return Err(AppError::BadRequest("symbol is required".to_string()));
    }
    if !state.price_book.update_price(&quote.symbol, quote.price) {
        return Err(AppError::BadRequest(format!(
            "price must be positive and finite, got {}",
            quote.price
        )));
    }

    debug!("Accepted quote {} @ {}", quote.symbol, quote.price);
    Ok(Json(ApiResponse {
        data: PriceQuote {
            symbol: quote.symbol.trim().to_uppercase(),
            price: quote.price,
        },
    }))
}
