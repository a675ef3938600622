use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Valuation and risk engine errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Risk statistics are meaningless against zero (or negative) capital.
    #[error("Degenerate portfolio: total position value is {total_value}")]
    DegeneratePortfolio { total_value: f64 },

    #[error("Unknown futures contract: {0}")]
    UnknownContract(String),
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Engine(EngineError::DegeneratePortfolio { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "DEGENERATE_PORTFOLIO")
            }
            AppError::Engine(EngineError::UnknownContract(_)) => {
                (StatusCode::NOT_FOUND, "UNKNOWN_CONTRACT")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(json!({
            "error": self.to_string(),
            "code": code,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
