use serde::Deserialize;
use service::error::{Error, ErrorKind};
use sse::message::Event;
use utoipa::ToSchema;

/// Body of `POST /notifications`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct PublishParams {
    /// The user whose stream receives the event.
    #[schema(example = "65f1c0ffee0ddba11c0ffee0")]
    pub(crate) user_id: String,
    /// Any JSON object with a non-empty `type` field.
    #[schema(value_type = Object, example = json!({"type": "like", "payload": {"postId": "p1"}}))]
    pub(crate) event: Event,
}

/// Body of `POST /notifications/broadcast`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct BroadcastParams {
    #[schema(value_type = Object, example = json!({"type": "announcement", "payload": {"title": "DevFest"}}))]
    pub(crate) event: Event,
}

pub(crate) fn validate_event(event: &Event) -> Result<(), Error> {
    if event.event_type.trim().is_empty() {
        return Err(Error::new(ErrorKind::Invalid(
            "event type must not be empty".to_string(),
        )));
    }
    Ok(())
}

impl PublishParams {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.user_id.trim().is_empty() {
            return Err(Error::new(ErrorKind::Invalid(
                "user_id must not be empty".to_string(),
            )));
        }
        validate_event(&self.event)
    }
}

impl BroadcastParams {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        validate_event(&self.event)
    }
}
