use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use plaza_booking::AvailabilityView;
use plaza_catalog::{ContainerKind, Unit};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ContainerSummary {
    pub id: Uuid,
    pub kind: ContainerKind,
    pub name: String,
    pub venue: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub available: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ContainerDetail {
    pub id: Uuid,
    pub kind: ContainerKind,
    pub name: String,
    pub venue: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub units: Vec<Unit>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/containers", get(list_containers))
        .route("/v1/containers/{id}", get(container_detail))
        .route("/v1/containers/{id}/availability", get(container_availability))
}

/// GET /v1/containers
/// Every container with availability counts derived from a fresh snapshot.
async fn list_containers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContainerSummary>>, AppError> {
    let mut summaries = Vec::new();
    for container in state.catalog.containers() {
        let view = state.booking.snapshot(container.id).await?;
        summaries.push(ContainerSummary {
            id: container.id,
            kind: container.kind,
            name: container.name.clone(),
            venue: container.venue.clone(),
            event_date: container.event_date,
            available: view.available,
            total: view.total,
        });
    }
    Ok(Json(summaries))
}

/// GET /v1/containers/{id}
async fn container_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContainerDetail>, AppError> {
    let container = state
        .catalog
        .container(id)
        .ok_or_else(|| plaza_booking::BookingError::NotFound(format!("container {}", id)))?;
    Ok(Json(ContainerDetail {
        id: container.id,
        kind: container.kind,
        name: container.name.clone(),
        venue: container.venue.clone(),
        event_date: container.event_date,
        description: container.description.clone(),
        units: container.units.clone(),
    }))
}

/// GET /v1/containers/{id}/availability
async fn container_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AvailabilityView>, AppError> {
    let view = state.booking.snapshot(id).await?;
    Ok(Json(view))
}
