//! Shared fixtures for the web layer's tests.

use clap::Parser;
use service::config::{Config, DEFAULT_SESSION_COOKIE_NAME};
use service::session::{encode_session_token, JwtSessionResolver, SessionClaims};
use service::AppState;
use sse::Manager;
use std::sync::Arc;

pub(crate) const SESSION_SECRET: &str = "web-test-session-secret";
pub(crate) const PUBLISHER_KEY: &str = "web-test-publisher-key";

// Every value the tests rely on is pinned here so that variables set in the
// environment running the tests cannot change it.
fn config() -> Config {
    let mut config = Config::parse_from(["gdg_aou_notify"])
        .set_session_secret(SESSION_SECRET.to_string())
        .clear_publisher_api_key();
    config.session_cookie_name = DEFAULT_SESSION_COOKIE_NAME.to_string();
    config.sse_keep_alive_secs = 15;
    config
}

fn state_with(config: Config) -> AppState {
    AppState::new(
        config,
        &Arc::new(Manager::new()),
        Arc::new(JwtSessionResolver::new(SESSION_SECRET)),
    )
}

/// Fresh state with its own registry, sessions signed by `SESSION_SECRET`
/// and publishing enabled with `PUBLISHER_KEY`.
pub(crate) fn app_state() -> AppState {
    state_with(config().set_publisher_api_key(PUBLISHER_KEY.to_string()))
}

pub(crate) fn app_state_without_publisher() -> AppState {
    state_with(config())
}

pub(crate) fn session_token_for(user_id: &str) -> String {
    encode_session_token(SESSION_SECRET, &SessionClaims::new(user_id, 3600)).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_without_publisher_has_no_key() {
        assert_eq!(app_state_without_publisher().config.publisher_api_key(), None);
        assert_eq!(app_state().config.publisher_api_key(), Some(PUBLISHER_KEY));
    }

    #[test]
    fn fixture_uses_default_session_cookie() {
        assert_eq!(app_state().config.session_cookie_name, "session_token");
    }
}
