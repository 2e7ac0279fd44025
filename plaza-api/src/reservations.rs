use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use plaza_booking::{Reservation, ReservationStatus};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub container_id: Uuid,
    pub unit_ids: Vec<String>,
    pub requester_id: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmReservationRequest {
    pub requester_id: String,
    pub payment_token: Option<String>, // Mock
}

#[derive(Debug, Deserialize)]
pub struct CancelReservationRequest {
    pub requester_id: String,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub requester_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub reservation_id: Uuid,
    pub container_id: Uuid,
    pub status: ReservationStatus,
    pub unit_ids: Vec<String>,
    pub total_amount: i32,
    pub currency: String,
    pub fulfillment_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            reservation_id: r.id,
            container_id: r.container_id,
            status: r.status,
            unit_ids: r.unit_ids,
            total_amount: r.total_amount,
            currency: r.currency,
            fulfillment_code: r.fulfillment_code,
            created_at: r.created_at,
            expires_at: r.expires_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", post(create_reservation))
        .route(
            "/v1/reservations/{id}",
            get(get_reservation).delete(cancel_reservation),
        )
        .route("/v1/reservations/{id}/confirm", post(confirm_reservation))
}

/// POST /v1/reservations
/// Hold a set of units. All-or-nothing: a 409 names the contested units.
async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state
        .booking
        .reserve(req.container_id, req.unit_ids, req.requester_id, req.metadata)
        .await?;
    Ok(Json(reservation.into()))
}

/// GET /v1/reservations/{id}?requester_id=...
async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.booking.get(id, &query.requester_id).await?;
    Ok(Json(reservation.into()))
}

/// POST /v1/reservations/{id}/confirm
/// Finalize a hold. Payment itself is mocked; the token is only logged.
async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmReservationRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    debug!(reservation_id = %id, has_payment_token = req.payment_token.is_some(), "confirming");
    let reservation = state.booking.confirm(id, &req.requester_id).await?;
    Ok(Json(reservation.into()))
}

/// DELETE /v1/reservations/{id}
async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CancelReservationRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.booking.cancel(id, &req.requester_id).await?;
    Ok(Json(reservation.into()))
}
