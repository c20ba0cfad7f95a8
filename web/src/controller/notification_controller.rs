use crate::controller::ApiResponse;
use crate::params::notification::{BroadcastParams, PublishParams};
use crate::response::notification::{BroadcastResult, PublishResult};
use crate::Error;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use service::AppState;

use log::*;

/// POST an event to one user's stream
///
/// Delivery is best effort: the answer is 202 whether or not the user is connected.
#[utoipa::path(
    post,
    path = "/notifications",
    request_body = PublishParams,
    responses(
        (status = 202, description = "Event accepted for delivery", body = PublishResult),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 503, description = "Publishing is not configured")
    ),
    security(
        ("publisher_key" = [])
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(params): Json<PublishParams>,
) -> Result<impl IntoResponse, Error> {
    params.validate()?;
    debug!(
        "POST notification {} for user {}",
        params.event.event_type, params.user_id
    );

    let delivery = app_state
        .sse_manager
        .publish(&params.user_id, &params.event);

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            StatusCode::ACCEPTED.into(),
            PublishResult {
                delivered: delivery.is_delivered(),
            },
        )),
    ))
}

/// POST an event to every open stream
#[utoipa::path(
    post,
    path = "/notifications/broadcast",
    request_body = BroadcastParams,
    responses(
        (status = 202, description = "Event accepted for delivery", body = BroadcastResult),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 503, description = "Publishing is not configured")
    ),
    security(
        ("publisher_key" = [])
    )
)]
pub async fn broadcast(
    State(app_state): State<AppState>,
    Json(params): Json<BroadcastParams>,
) -> Result<impl IntoResponse, Error> {
    params.validate()?;
    debug!("POST broadcast notification {}", params.event.event_type);

    let delivered_to = app_state.sse_manager.broadcast(&params.event);

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            StatusCode::ACCEPTED.into(),
            BroadcastResult { delivered_to },
        )),
    ))
}
