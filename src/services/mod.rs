//! Service layer modules for external integrations.
//!
//! Contains the profile API client.

pub mod profile_client;

pub use profile_client::{ProfileApi, ProfileClient, Scope};
