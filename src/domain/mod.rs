//! Domain types and DTOs
//!
//! Editable profile shapes, the wire records they map to, and gallery items.

pub mod gallery;
pub mod profiles;
pub mod wire;

// Re-export commonly used types
pub use gallery::*;
pub use profiles::*;

// Wire types are accessed via crate::domain::wire:: to keep them apart from domain shapes
