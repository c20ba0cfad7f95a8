use crate::extractors::authenticated_user::AuthenticatedUser;
use async_stream::stream;
use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{AppendHeaders, IntoResponse};
use log::*;
use service::AppState;
use std::convert::Infallible;
use tokio::sync::mpsc;

/// SSE handler that establishes a long-lived connection for real-time notifications.
/// One connection per authenticated user; a newer connection replaces an older one.
///
/// Every frame is `data: <json>\n\n`, starting with the `connected` handshake.
/// Keep-alive comments are interleaved so a vanished peer is noticed on the
/// next write.
pub(crate) async fn sse_handler(
    AuthenticatedUser(session): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    debug!("Establishing SSE connection for user {}", session.user_id);

    let (tx, mut rx) = mpsc::unbounded_channel();

    // The guard deregisters this connection when the stream is dropped, which
    // happens when the peer disconnects or the stream ends.
    let guard = app_state
        .sse_manager
        .open_connection(session.user_id, tx);

    let stream = stream! {
        let guard = guard;

        while let Some(frame) = rx.recv().await {
            yield Ok::<Event, Infallible>(Event::default().data(frame.into_data()));
        }

        // The registry dropped our sink (replaced or swept), so the stream ends here.
        debug!(
            "SSE connection {} closed for user {}",
            guard.connection_id().as_str(),
            guard.user_id()
        );
    };

    (
        AppendHeaders([(header::CONNECTION, "keep-alive")]),
        Sse::new(stream).keep_alive(KeepAlive::new().interval(app_state.config.sse_keep_alive())),
    )
}
