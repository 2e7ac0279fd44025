use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use plaza_booking::BookingError;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Booking(err) => {
                let status = match &err {
                    BookingError::Empty | BookingError::TooMany { .. } => StatusCode::BAD_REQUEST,
                    BookingError::PartiallyUnavailable { .. } | BookingError::Conflict(_) => {
                        StatusCode::CONFLICT
                    }
                    BookingError::NotFound(_) => StatusCode::NOT_FOUND,
                    BookingError::Unauthorized => StatusCode::FORBIDDEN,
                };
                // Conflicting unit ids ride along so clients can re-render
                // availability without a second request.
                let body = match &err {
                    BookingError::PartiallyUnavailable { units } => {
                        json!({ "error": err.to_string(), "units": units })
                    }
                    _ => json!({ "error": err.to_string() }),
                };
                (status, Json(body)).into_response()
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        Self::Booking(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
