use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bet_etf_core::errors::CoreError;
use serde_json::json;

/// A `CoreError` rendered as an HTTP response with a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CoreError::ValidationError(_) => StatusCode::BAD_REQUEST,
            CoreError::SymbolNotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Api { .. }
            | CoreError::Network(_)
            | CoreError::Parse { .. }
            | CoreError::NoProvider(_) => StatusCode::BAD_GATEWAY,
            CoreError::InvalidFileFormat(_)
            | CoreError::Serialization(_)
            | CoreError::Deserialization(_)
            | CoreError::FileIO(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
