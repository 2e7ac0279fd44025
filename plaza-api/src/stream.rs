use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/containers/{id}/stream", get(stream_container))
}

/// GET /v1/containers/{id}/stream
/// Server-sent events for one container: every hold, confirmation,
/// cancellation and expiry, so clients refresh availability without polling.
async fn stream_container(
    Path(container_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.container_id == container_id => {
                match serde_json::to_string(&event) {
                    Ok(payload) => Some(Ok(Event::default().event(event.kind.as_str()).data(payload))),
                    Err(_) => None,
                }
            }
            // Other containers' events and lagged receivers are skipped.
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
