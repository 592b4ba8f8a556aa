use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hexlight_app::HexlightError;
use tokio::task::JoinError;

/// Request failure rendered as a plain text response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<HexlightError> for ApiError {
    fn from(err: HexlightError) -> Self {
        let status = match &err {
            HexlightError::InvalidColor(_)
            | HexlightError::InvalidHue(_)
            | HexlightError::InvalidBrightness(_) => StatusCode::BAD_REQUEST,
            HexlightError::InvalidHexagon(_) | HexlightError::HexagonOutOfRange { .. } => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("request handler has failed: {err}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::error!("{}", self.message);
        } else {
            log::debug!("Rejected request: {}", self.message);
        }
        (self.status, self.message).into_response()
    }
}
