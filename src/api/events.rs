use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;

use super::{error::ApiError, AppState};
use crate::services::events::Table;

// GET /events/{table} - Server-sent change notifications for one table
pub(super) async fn table_events_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let table: Table = table
        .parse()
        .map_err(|_| ApiError::NotFound(format!("No change feed for '{}'", table)))?;

    // The receiver lives inside the stream; it is dropped when the client goes away.
    let rx = state.hub.subscribe();
    tracing::info!(
        "Change feed opened for {} ({} open feeds)",
        table,
        state.hub.subscriber_count()
    );
    let stream = stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(change) if change.table == table => {
                    let json = serde_json::to_string(&change).unwrap_or_default();
                    return Some((Ok(Event::default().event("change").data(json)), rx));
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    tracing::warn!("Change feed for {} lagged by {} messages", table, count);
                    return Some((Ok(Event::default().event("lagged").data(count.to_string())), rx));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
