use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Event type sent as the first frame of every new stream.
pub const CONNECTED_EVENT_TYPE: &str = "connected";

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &str;
}

/// A notification as the client sees it: a JSON object with a `type`
/// discriminator and whatever other fields that type carries.
///
/// ```json
/// {"type": "like", "payload": {"postId": "p1"}}
/// ```
///
/// Nothing beyond the presence of `type` is enforced; clients interpret the
/// remaining fields per `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            fields: Map::new(),
        }
    }

    /// The handshake event written when a stream opens.
    pub fn connected() -> Self {
        Self::new(CONNECTED_EVENT_TYPE).with_field("message", "SSE connected")
    }

    pub fn with_payload(self, payload: impl Into<Value>) -> Self {
        self.with_field("payload", payload)
    }

    /// Adds a top-level field. `type` is reserved for the discriminator and is ignored here.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "type" {
            self.fields.insert(key, value.into());
        }
        self
    }

    pub fn payload(&self) -> Option<&Value> {
        self.fields.get("payload")
    }
}

impl EventType for Event {
    fn event_type(&self) -> &str {
        &self.event_type
    }
}

/// One serialized event, ready to be written to a stream.
///
/// Its text-event-stream encoding is `"data: " + JSON(event) + "\n\n"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: String,
}

impl Frame {
    pub fn from_event(event: &Event) -> Result<Self, serde_json::Error> {
        Ok(Self {
            data: serde_json::to_string(event)?,
        })
    }

    /// The JSON text carried by the frame's `data:` field.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn into_data(self) -> String {
        self.data
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data: {}\n\n", self.data)
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub event: Event,
    pub scope: MessageScope,
}

#[derive(Debug, Clone)]
pub enum MessageScope {
    /// Send to the connection of a specific user
    User { user_id: String },
    /// Send to all connected users
    Broadcast,
}
