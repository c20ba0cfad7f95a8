//! This module holds typed parameters for endpoint inputs.
//!
//! Each parameter type is a struct deserialized from the request, with a
//! `validate` step for the rules the type system cannot express.

pub(crate) mod notification;
