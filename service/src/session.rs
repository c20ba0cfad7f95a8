//! Session resolution for authenticated streams.
//!
//! Sessions are issued by the web application's auth provider as HS256-signed
//! JWTs. This service never issues sessions for users; it only checks that a
//! presented token is genuine and unexpired and reads the user id from `sub`.

use crate::config::Config;
use crate::error::{Error, ErrorKind};
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// The signed-in user behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SessionClaims {
    /// Claims for `user_id` valid for `ttl_secs` from now.
    pub fn new(user_id: impl Into<String>, ttl_secs: u64) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            sub: user_id.into(),
            exp: now + ttl_secs,
            iat: Some(now),
            email: None,
            name: None,
        }
    }
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Session {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Looks up the session behind a presented token.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `Ok(None)` means the token does not identify anyone. `Err` is reserved
    /// for failures on the service side.
    async fn resolve(&self, token: &str) -> Result<Option<Session>, Error>;
}

pub struct JwtSessionResolver {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionResolver {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let secret = config.session_secret().ok_or_else(|| {
            warn!("Failed to get session secret from config");
            Error::new(ErrorKind::Config(
                "SESSION_SECRET must be set to authenticate streams".to_string(),
            ))
        })?;
        Ok(Self::new(secret))
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, token: &str) -> Result<Option<Session>, Error> {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) if data.claims.sub.is_empty() => {
                debug!("Rejected session token without a subject");
                Ok(None)
            }
            Ok(data) => Ok(Some(data.claims.into())),
            Err(e) => {
                let err = Error::from(e);
                if err.is_unauthenticated() {
                    debug!("Rejected session token: {err}");
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// Sign `claims` the way the web application signs its session tokens.
/// Used by development tooling and tests.
pub fn encode_session_token(secret: &str, claims: &SessionClaims) -> Result<String, Error> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}
