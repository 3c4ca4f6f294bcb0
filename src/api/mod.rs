//! Profile API wire conventions
//!
//! - Response envelope shared by every endpoint

pub mod envelope;

pub use envelope::{Ack, Envelope};
