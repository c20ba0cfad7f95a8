//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the `/sse` endpoint.
//! The core SSE infrastructure (Manager, ConnectionRegistry, Event and Frame)
//! lives in the `sse` crate so producers can publish without depending on `web`.

pub(crate) mod handler;
