use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ecdn_core::EcdnError;

/// HTTP face of [`EcdnError`]. Bodies carry only a generic message; the
/// detailed error is logged where it happens.
#[derive(Debug)]
pub struct ApiError(pub EcdnError);

impl From<EcdnError> for ApiError {
    fn from(e: EcdnError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            EcdnError::Unauthorized => StatusCode::UNAUTHORIZED,
            EcdnError::NotFound(_) => StatusCode::NOT_FOUND,
            EcdnError::BadInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self.0 {
            EcdnError::Unauthorized => "invalid API key",
            EcdnError::NotFound(_) => "file not found",
            EcdnError::BadInput(_) => "invalid file name",
            _ => "internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_message() });
        (self.status(), Json(body)).into_response()
    }
}
