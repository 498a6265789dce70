//! Request gating.
//!
//! Incoming events are decoded, validated against the request schema and
//! reduced to either a CORS preflight or a bounded [`Claim`] before any
//! external service is touched.

mod gate;
mod schema;

pub use gate::{parse_event, Claim, GateError, Request, MAX_CLAIM_CHARS, MIN_CLAIM_CHARS};
