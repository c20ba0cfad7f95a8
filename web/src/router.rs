use crate::{
    controller::{event_controller, health_check_controller, notification_controller},
    params, protect, response,
    sse::handler::sse_handler,
    AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "GDG AOU Notification API"
        ),
        paths(
            event_controller::create,
            health_check_controller::health_check,
            notification_controller::create,
            notification_controller::broadcast,
        ),
        components(
            schemas(
                params::notification::PublishParams,
                params::notification::BroadcastParams,
                response::notification::PublishResult,
                response::notification::BroadcastResult,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "gdg_aou_notify", description = "GDG AOU real-time notifications")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the two ways callers authenticate: browsers with their session cookie,
// backend producers with the publisher key.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    service::config::DEFAULT_SESSION_COOKIE_NAME,
                    "Session token issued by the web application at sign-in",
                ))),
            );
            components.add_security_scheme(
                "publisher_key",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(sse_routes(app_state.clone()))
        .merge(notification_routes(app_state.clone()))
        .merge(event_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sse", get(sse_handler))
        .with_state(app_state)
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications", post(notification_controller::create))
        .route(
            "/notifications/broadcast",
            post(notification_controller::broadcast),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::publisher::require_publisher_key,
        ))
        .with_state(app_state)
}

fn event_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/events", post(event_controller::create))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::publisher::require_publisher_key,
        ))
        .with_state(app_state)
}
