use config::Config;
use events::EventPublisher;
use session::SessionResolver;
use sse::domain_event_handler::SseDomainEventHandler;
use sse::Manager;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

// Service-level state shared by every request handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sse_manager: Arc<Manager>,
    pub event_publisher: EventPublisher,
    pub session_resolver: Arc<dyn SessionResolver>,
}

impl AppState {
    /// Wires the domain event publisher to the SSE manager so every published
    /// domain event becomes a notification.
    pub fn new(
        app_config: Config,
        sse_manager: &Arc<Manager>,
        session_resolver: Arc<dyn SessionResolver>,
    ) -> Self {
        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(SseDomainEventHandler::new(Arc::clone(sse_manager))));

        Self {
            config: app_config,
            sse_manager: Arc::clone(sse_manager),
            event_publisher,
            session_resolver,
        }
    }
}
