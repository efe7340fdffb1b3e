use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tracing::debug;

use crate::infra::app_state::AppState;
use crate::infra::fanout::SubscriptionGuard;

/// Viewer push channel.
///
/// The hub seeds the channel with the current device snapshot and latest
/// scan before any live event, so a freshly connected viewer renders
/// without waiting. The variant tag inside the JSON payload matches the
/// SSE event name. The guard captured by the stream unregisters the
/// viewer as soon as the connection drops.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let (viewer_id, receiver) = state.hub.subscribe();
    let guard = SubscriptionGuard::new(state.hub.clone(), viewer_id);
    debug!(viewer = %viewer_id, "SSE stream opened");

    let stream = ReceiverStream::new(receiver).filter_map(move |event| {
        let _live = &guard;
        match serde_json::to_string(&event) {
            Ok(data) => Some(Ok(Event::default().event(event.event_name()).data(data))),
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(default_keep_alive())
}

fn default_keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(Duration::from_secs(15))
        .text("keep-alive")
}
