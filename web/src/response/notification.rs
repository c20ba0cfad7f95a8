//! Response DTOs for the notification publishing endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Result of publishing to one user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublishResult {
    /// Whether the user had an open stream and the frame was written to it.
    /// `false` is a normal outcome: the user was simply not connected.
    pub delivered: bool,
}

/// Result of a broadcast.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BroadcastResult {
    /// Number of open streams the frame was written to.
    pub delivered_to: usize,
}
