use crate::controller::ApiResponse;
use crate::Error;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use events::DomainEvent;
use service::AppState;

use log::*;

/// POST a domain event emitted by a business operation
///
/// The body is a tagged event such as
/// `{"type": "post_liked", "post_id": "p1", "liked_by": "u2", "author_id": "u1"}`.
/// The owner of the affected record is notified if connected.
#[utoipa::path(
    post,
    path = "/events",
    request_body(
        content = Object,
        description = "Domain event tagged by `type`",
        content_type = "application/json"
    ),
    responses(
        (status = 202, description = "Event accepted"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Unknown or malformed event"),
        (status = 503, description = "Publishing is not configured")
    ),
    security(
        ("publisher_key" = [])
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(event): Json<DomainEvent>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST domain event: {event:?}");

    app_state.event_publisher.publish(event).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::<()>::no_content(StatusCode::ACCEPTED.into())),
    ))
}
