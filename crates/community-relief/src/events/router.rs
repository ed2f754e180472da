use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use super::hub::{EventHub, Room};
use crate::envelope::failure;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StreamQuery {
    #[serde(default)]
    room: Option<String>,
}

/// `GET /api/events?room=admin|volunteer-<id>` as a Server-Sent Event stream.
pub fn events_router(hub: EventHub) -> Router {
    Router::new()
        .route("/api/events", get(stream_handler))
        .with_state(hub)
}

pub(crate) async fn stream_handler(
    State(hub): State<EventHub>,
    Query(query): Query<StreamQuery>,
) -> Response {
    let room = match query.room.as_deref().unwrap_or_default().parse::<Room>() {
        Ok(room) => room,
        Err(reason) => return failure(StatusCode::BAD_REQUEST, reason),
    };
    tracing::info!(%room, "dashboard stream opened");

    let connected = stream::once({
        let room = room.to_string();
        async move { Ok::<_, Infallible>(Event::default().event("connected").data(room)) }
    });

    let events = BroadcastStream::new(hub.subscribe()).filter_map(move |result| {
        let room = room.clone();
        async move {
            match result {
                Ok(event) if room.accepts(&event.audience) => Event::default()
                    .event(event.kind.label())
                    .json_data(&event.payload)
                    .ok()
                    .map(Ok),
                Ok(_) => None,
                Err(BroadcastStreamRecvError::Lagged(missed)) => Event::default()
                    .event("lagged")
                    .json_data(serde_json::json!({ "missed": missed }))
                    .ok()
                    .map(Ok),
            }
        }
    });

    Sse::new(connected.chain(events))
        .keep_alive(KeepAlive::default())
        .into_response()
}
