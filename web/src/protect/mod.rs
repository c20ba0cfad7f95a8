//! This module provides protection mechanisms for the endpoints that are not
//! called by signed-in users.
//!
//! Browser-facing routes authenticate through the `AuthenticatedUser` extractor.
//! Routes called by other backend services are guarded by the middleware here.

pub(crate) mod publisher;
