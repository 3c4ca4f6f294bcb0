//! Error taxonomy for the profile synchronization layer.
//!
//! Network-origin failures (`FetchError`, `SaveError`) are recoverable and end up
//! as user-facing notices. Mapping, editor and scope errors are caller bugs.

use thiserror::Error;

/// Wire record could not be turned into (or out of) a domain aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("Wire record has no profile id")]
    MissingProfileId,

    #[error("Invalid date in {field}: {value:?}")]
    InvalidDate { field: &'static str, value: String },
}

/// Read-side failure (profile or gallery).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Profile service unavailable: {0}")]
    Transport(String),

    #[error("Profile service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid profile service response: {0}")]
    Decode(String),

    #[error("Session expired")]
    SessionExpired,
}

/// Write-side failure for `save_profile`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("Session expired")]
    SessionExpired,

    #[error("Save rejected: {0}")]
    Rejected(String),

    #[error("Profile service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Profile service unavailable: {0}")]
    Transport(String),

    #[error("Invalid profile service response: {0}")]
    Decode(String),
}

impl SaveError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Collection editor contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Public scope requires a target profile id")]
    MissingTarget,
}

/// Everything the store's public API can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("No profile loaded")]
    NotLoaded,

    #[error("Not in editing mode")]
    NotEditing,

    #[error("Already editing")]
    AlreadyEditing,

    #[error("A save is already in flight")]
    SaveInFlight,

    #[error("A profile load is already in flight")]
    LoadInFlight,

    #[error("Profile is read-only for this viewer")]
    ReadOnlyScope,

    #[error("Saved profile has new items without server ids; reload it before editing")]
    StaleProfile,
}

impl StoreError {
    /// True for failures that indicate a caller bug rather than a remote problem.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Self::Fetch(_) | Self::Save(_) | Self::StaleProfile => false,
            // Date rejection is a user-fixable validation issue
            Self::Mapping(MappingError::InvalidDate { .. }) => false,
            Self::Mapping(MappingError::MissingProfileId) => true,
            Self::Editor(_)
            | Self::NotLoaded
            | Self::NotEditing
            | Self::AlreadyEditing
            | Self::SaveInFlight
            | Self::LoadInFlight
            | Self::ReadOnlyScope => true,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            Self::Save(SaveError::SessionExpired) | Self::Fetch(FetchError::SessionExpired)
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_failures_are_not_contract_violations() {
        assert!(!StoreError::Save(SaveError::Rejected("bad".into())).is_contract_violation());
        assert!(!StoreError::Fetch(FetchError::Transport("down".into())).is_contract_violation());
        assert!(StoreError::NotEditing.is_contract_violation());
        assert!(StoreError::Editor(EditorError::IndexOutOfRange { index: 3, len: 1 })
            .is_contract_violation());
    }

    #[test]
    fn session_expiry_is_detected_on_both_paths() {
        assert!(StoreError::Save(SaveError::SessionExpired).is_session_expired());
        assert!(StoreError::Fetch(FetchError::SessionExpired).is_session_expired());
        assert!(!StoreError::SaveInFlight.is_session_expired());
    }
}
