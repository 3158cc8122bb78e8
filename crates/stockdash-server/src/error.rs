use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stockdash_core::DashboardError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] clickhouse::error::Error),

    #[error("Data error: {0}")]
    Data(#[from] DashboardError),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Data(DashboardError::Io(_)) => (StatusCode::SERVICE_UNAVAILABLE, "DATA_UNAVAILABLE"),
            AppError::Data(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DATA_ERROR"),
            AppError::InvalidParam(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAM"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, error_code = code, "Database error occurred");
            }
            AppError::Data(e) => {
                tracing::error!(error = %e, error_code = code, "Dataset could not be loaded");
            }
            AppError::InvalidParam(param) => {
                tracing::warn!(param = %param, error_code = code, "Invalid parameter");
            }
            AppError::Internal(msg) => {
                tracing::error!(message = %msg, error_code = code, "Internal error occurred");
            }
        }

        tracing::debug!(
            status_code = %status.as_u16(),
            error_code = %code,
            error_message = %self.to_string(),
            "Returning error response"
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_maps_to_bad_request() {
        let response = AppError::InvalidParam("n=0".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_csv_maps_to_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "sectorwise_data.csv");
        let err = AppError::from(DashboardError::from(io));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::SERVICE_UNAVAILABLE, "DATA_UNAVAILABLE")
        );
    }

    #[test]
    fn test_bad_csv_date_maps_to_unprocessable() {
        let err = AppError::from(DashboardError::InvalidDate("31/01/2024".to_string()));
        assert_eq!(err.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
