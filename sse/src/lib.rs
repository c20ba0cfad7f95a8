//! Server-Sent Events (SSE) infrastructure for real-time notifications.
//!
//! This crate pushes notifications (likes, comments, paper downloads,
//! announcements) from the backend to the one open stream of each signed-in user.
//!
//! # Architecture
//!
//! - **One stream per user**: the registry maps a user id to a single sink.
//!   A new connection for the same user replaces the previous one.
//! - **Concurrent registry**: a DashMap keyed by user id; every register,
//!   unregister, lookup and send is atomic with respect to other tasks.
//! - **Ephemeral messages**: events are delivered at most once. If a user is
//!   offline the event is lost; the client sees fresh data on next page load.
//! - **Best effort**: publishing never fails or blocks the business
//!   operation that triggered it.
//!
//! # Message Flow
//!
//! 1. Frontend opens the `/sse` stream with its session token
//! 2. The web layer resolves the session to a user id
//! 3. `Manager::open_connection` queues the `connected` handshake and registers the sink
//! 4. A producer (download, like, comment handler) calls `Manager::publish`
//!    or emits a `DomainEvent` handled by `SseDomainEventHandler`
//! 5. The frame `data: <json>\n\n` is written to the user's stream
//! 6. When the peer goes away the stream is dropped and its `ConnectionGuard`
//!    deregisters it
//!
//! # Example: Sending an event
//!
//! ```rust,ignore
//! use sse::message::Event;
//! use serde_json::json;
//!
//! // In a handler after persisting a like
//! app_state.sse_manager.publish(
//!     &post.author_id,
//!     &Event::new("like").with_payload(json!({ "postId": post.id })),
//! );
//! ```
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry, Sink, ConnectionGuard and delivery outcomes
//! - `manager`: publishing, connection lifecycle and the sweep for vanished peers
//! - `message`: wire event, frame and scope definitions
//! - `domain_event_handler`: bridges `events::DomainEvent` to SSE notifications

pub mod connection;
pub mod domain_event_handler;
pub mod manager;
pub mod message;

pub use connection::Delivery;
pub use manager::Manager;
