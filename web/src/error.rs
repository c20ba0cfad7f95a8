use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use service::error::{Error as ServiceError, ErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(ServiceError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            ErrorKind::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response()
            }
            ErrorKind::Invalid(reason) => {
                debug!("Rejecting invalid request: {reason}");
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
            }
            ErrorKind::Config(reason) => {
                warn!("Request needs missing configuration: {reason}");
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE UNAVAILABLE").into_response()
            }
            ErrorKind::Other(reason) => {
                error!("Internal error: {reason}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<ServiceError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(kind: ErrorKind) -> StatusCode {
        Error::from(ServiceError::new(kind)).into_response().status()
    }

    #[test]
    fn error_kinds_map_to_status_codes() {
        assert_eq!(status_of(ErrorKind::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ErrorKind::Invalid("missing type".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ErrorKind::Config("no key".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ErrorKind::Other("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
