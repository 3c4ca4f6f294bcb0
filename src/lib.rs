//! Editable profile synchronization for the job board client.
//!
//! Loads a remote profile aggregate, lets a single user edit a draft copy of
//! it, and saves the draft back while keeping server ids of existing items and
//! asking the server to create new ones.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod editors;
pub mod error;
pub mod gallery;
pub mod logging;
pub mod mapping;
pub mod notice;
pub mod services;
pub mod store;

pub use error::{EditorError, FetchError, MappingError, SaveError, StoreError};
pub use gallery::GalleryLoader;
pub use services::{ProfileApi, ProfileClient, Scope};
pub use store::{EditMode, ProfileStore};
