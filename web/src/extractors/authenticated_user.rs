use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use log::*;
use service::session::Session;
use service::AppState;

pub(crate) struct AuthenticatedUser(pub Session);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = RejectionType;

    // Resolves the caller's session from an `Authorization: Bearer` header or, failing
    // that, from the session cookie. A missing, forged or expired token is Unauthorized.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts, state).await else {
            trace!("Request carries no session token");
            return Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()));
        };

        match state.session_resolver.resolve(&token).await {
            Ok(Some(session)) => Ok(AuthenticatedUser(session)),
            Ok(None) => Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string())),
            Err(e) => {
                error!("Failed to resolve session: {e}");
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL SERVER ERROR".to_string(),
                ))
            }
        }
    }
}

async fn session_token(parts: &mut Parts, state: &AppState) -> Option<String> {
    if let Ok(TypedHeader(Authorization(bearer))) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
    {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(&parts.headers)
        .get(&state.config.session_cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{app_state, session_token_for};
    use axum::http::{header, Request};

    async fn extract(request: Request<()>) -> Result<AuthenticatedUser, RejectionType> {
        let (mut parts, _) = request.into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &app_state()).await
    }

    #[tokio::test]
    async fn bearer_token_authenticates() {
        let request = Request::builder()
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", session_token_for("u1")),
            )
            .body(())
            .unwrap();

        let AuthenticatedUser(session) = extract(request).await.ok().unwrap();
        assert_eq!(session.user_id, "u1");
    }

    #[tokio::test]
    async fn session_cookie_authenticates() {
        let request = Request::builder()
            .header(
                header::COOKIE,
                format!("theme=dark; session_token={}", session_token_for("u2")),
            )
            .body(())
            .unwrap();

        let AuthenticatedUser(session) = extract(request).await.ok().unwrap();
        assert_eq!(session.user_id, "u2");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        let rejection = extract(request).await.err().unwrap();
        assert_eq!(rejection.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn forged_token_is_unauthorized() {
        let request = Request::builder()
            .header(header::COOKIE, "session_token=forged.token.value")
            .body(())
            .unwrap();
        let rejection = extract(request).await.err().unwrap();
        assert_eq!(rejection.0, StatusCode::UNAUTHORIZED);
    }
}
