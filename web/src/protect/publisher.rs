//! This module contains middleware for protecting routes that publish notifications.
use crate::Error;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use log::*;
use service::error::{Error as ServiceError, ErrorKind};
use service::AppState;
use sha2::{Digest, Sha256};

/// Checks that the caller presents the configured publisher key as a Bearer token.
/// Answers 503 when no publisher key is configured.
/// Intended to be given to axum::middleware::from_fn_with_state in the router
pub(crate) async fn require_publisher_key(
    State(app_state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = app_state.config.publisher_api_key() else {
        return Error::from(ServiceError::new(ErrorKind::Config(
            "PUBLISHER_API_KEY is not set, publishing is disabled".to_string(),
        )))
        .into_response();
    };

    match bearer {
        Ok(TypedHeader(Authorization(bearer))) if keys_match(bearer.token(), expected) => {
            next.run(request).await
        }
        Ok(_) => {
            warn!("Rejected publish request with an invalid publisher key");
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response()
        }
        Err(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response(),
    }
}

// Compares fixed-size digests so the time taken does not depend on where the keys differ.
fn keys_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_only_identical_keys() {
        assert!(keys_match("producer-key", "producer-key"));
        assert!(!keys_match("producer-key", "producer-kez"));
        assert!(!keys_match("", "producer-key"));
    }
}
