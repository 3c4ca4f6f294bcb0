//! Profile API client.
//!
//! Provides typed, single-shot calls for:
//! - Owner and public profile reads
//! - Profile saves (always authenticated)
//! - Gallery reads (posts or jobs) with the same owner/public scoping
//!
//! Failures are reported once; there is no retry. A 401 on an authenticated
//! call notifies the [`AuthSession`] and comes back as `SessionExpired`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::api::{Ack, Envelope};
use crate::auth::{bearer, AuthSession};
use crate::domain::gallery::{GalleryFeed, GalleryKind, JobPosting, Post};
use crate::domain::profiles::ProfileId;
use crate::domain::wire::WireProfile;
use crate::error::{FetchError, SaveError, ScopeError};

/// Addressing mode shared by every read: the caller's own record, or a
/// public read of someone else's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Owner,
    Public(ProfileId),
}

impl Scope {
    /// Resolves the page-level "is this my profile?" flag plus optional target.
    pub fn for_viewer(viewer_is_owner: bool, target: Option<ProfileId>) -> Result<Self, ScopeError> {
        match (viewer_is_owner, target) {
            (true, _) => Ok(Self::Owner),
            (false, Some(id)) => Ok(Self::Public(id)),
            (false, None) => {
                error!("Public profile read requested without a target id");
                Err(ScopeError::MissingTarget)
            }
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }
}

/// Network boundary consumed by the store and the gallery loader.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn load_profile(&self, scope: Scope) -> Result<WireProfile, FetchError>;

    async fn save_profile(&self, record: &WireProfile) -> Result<Ack, SaveError>;

    async fn load_gallery(&self, kind: GalleryKind, scope: Scope) -> Result<GalleryFeed, FetchError>;
}

/// Endpoint paths relative to the API base URL.
pub mod paths {
    use super::Scope;
    use crate::domain::gallery::GalleryKind;

    pub const SAVE_PROFILE: &str = "/profile/update";

    pub fn profile(scope: Scope) -> String {
        match scope {
            Scope::Owner => "/profile/me".to_string(),
            Scope::Public(id) => format!("/profile/public/{}", id),
        }
    }

    pub fn gallery(kind: GalleryKind, scope: Scope) -> String {
        match scope {
            Scope::Owner => format!("/{}/me", kind),
            Scope::Public(id) => format!("/{}/user/{}", kind, id),
        }
    }
}

/// Error types a profile service call can be reported as.
trait ServiceError {
    fn transport(message: String) -> Self;
    fn status(status: u16, message: String) -> Self;
    fn decode(message: String) -> Self;
    fn session_expired() -> Self;
}

impl ServiceError for FetchError {
    fn transport(message: String) -> Self {
        Self::Transport(message)
    }

    fn status(status: u16, message: String) -> Self {
        Self::Status { status, message }
    }

    fn decode(message: String) -> Self {
        Self::Decode(message)
    }

    fn session_expired() -> Self {
        Self::SessionExpired
    }
}

impl ServiceError for SaveError {
    fn transport(message: String) -> Self {
        Self::Transport(message)
    }

    fn status(status: u16, message: String) -> Self {
        Self::Status { status, message }
    }

    fn decode(message: String) -> Self {
        Self::Decode(message)
    }

    fn session_expired() -> Self {
        Self::SessionExpired
    }
}

/// HTTP implementation of [`ProfileApi`].
#[derive(Clone)]
pub struct ProfileClient {
    client: Client,
    base_url: String,
    session: Arc<dyn AuthSession>,
}

impl ProfileClient {
    /// Create a new profile API client.
    pub fn new(base_url: &str, session: Arc<dyn AuthSession>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "Profile client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the bearer credential, or `None` when the session has none.
    fn authorize(&self, req: RequestBuilder) -> Option<RequestBuilder> {
        let token = self.session.token()?;
        Some(req.header(reqwest::header::AUTHORIZATION, bearer(&token)))
    }

    /// GET an enveloped payload. Owner scope is authenticated, public scope is not.
    async fn get<T: DeserializeOwned>(&self, path: &str, scope: Scope) -> Result<T, FetchError> {
        let url = self.url(path);
        let request_id = Uuid::new_v4().to_string();

        let mut req = self.client.get(&url).header("x-request-id", &request_id);

        if scope.is_owner() {
            req = match self.authorize(req) {
                Some(req) => req,
                None => {
                    warn!(url = %url, "No credential available for owner read");
                    return Err(FetchError::SessionExpired);
                }
            };
        }

        debug!(url = %url, request_id = %request_id, "Profile service request");

        let envelope = self
            .send::<T, FetchError>(req, &request_id, scope.is_owner())
            .await?;
        envelope.into_data().map_err(FetchError::Rejected)
    }

    /// Send a request and decode its envelope, mapping failures into `E`.
    ///
    /// A 401 counts as session expiry only for authenticated calls. Non-2xx
    /// statuses carry the envelope message when the body has one.
    async fn send<T, E>(
        &self,
        req: RequestBuilder,
        request_id: &str,
        authenticated: bool,
    ) -> Result<Envelope<T>, E>
    where
        T: DeserializeOwned,
        E: ServiceError,
    {
        let response = req.send().await.map_err(|e| {
            error!(error = %e, request_id = %request_id, "Profile service request failed");
            E::transport(e.to_string())
        })?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && authenticated {
            self.session.on_expired();
            return Err(E::session_expired());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| E::transport(e.to_string()))?;
        let envelope = serde_json::from_slice::<Envelope<T>>(&body);

        if !status.is_success() {
            let message = envelope
                .map(|env| env.message_or(&status.to_string()))
                .unwrap_or_else(|_| status.to_string());
            warn!(status = %status, message = %message, request_id = %request_id, "Profile service error");
            return Err(E::status(status.as_u16(), message));
        }

        envelope.map_err(|e| {
            error!(error = %e, request_id = %request_id, "Failed to parse profile service response");
            E::decode(e.to_string())
        })
    }

    /// Check that the API answers at all.
    pub async fn health_check(&self) -> Result<()> {
        self.client
            .get(self.url("/health"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Profile service health check failed")?
            .error_for_status()
            .context("Profile service unhealthy")?;

        Ok(())
    }
}

#[async_trait]
impl ProfileApi for ProfileClient {
    #[instrument(skip(self))]
    async fn load_profile(&self, scope: Scope) -> Result<WireProfile, FetchError> {
        self.get(&paths::profile(scope), scope).await
    }

    #[instrument(skip(self, record), fields(profile_id = ?record.id))]
    async fn save_profile(&self, record: &WireProfile) -> Result<Ack, SaveError> {
        let url = self.url(paths::SAVE_PROFILE);
        let request_id = Uuid::new_v4().to_string();

        let req = self
            .client
            .post(&url)
            .header("x-request-id", &request_id)
            .json(record);

        let Some(req) = self.authorize(req) else {
            warn!("No credential available for profile save");
            return Err(SaveError::SessionExpired);
        };

        debug!(url = %url, request_id = %request_id, "Profile save request");

        let envelope = self
            .send::<serde_json::Value, SaveError>(req, &request_id, true)
            .await?;

        if !envelope.is_success() {
            return Err(SaveError::Rejected(envelope.message_or("Profile update failed")));
        }

        Ok(Ack {
            message: envelope.message,
        })
    }

    #[instrument(skip(self))]
    async fn load_gallery(&self, kind: GalleryKind, scope: Scope) -> Result<GalleryFeed, FetchError> {
        let path = paths::gallery(kind, scope);
        let feed = match kind {
            GalleryKind::Posts => GalleryFeed::Posts(self.get::<Vec<Post>>(&path, scope).await?),
            GalleryKind::Jobs => GalleryFeed::Jobs(self.get::<Vec<JobPosting>>(&path, scope).await?),
        };
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_resolution() {
        assert_eq!(Scope::for_viewer(true, None), Ok(Scope::Owner));
        assert_eq!(Scope::for_viewer(true, Some(3)), Ok(Scope::Owner));
        assert_eq!(Scope::for_viewer(false, Some(3)), Ok(Scope::Public(3)));
        assert_eq!(Scope::for_viewer(false, None), Err(ScopeError::MissingTarget));
    }

    #[test]
    fn gallery_paths_share_scoping() {
        assert_eq!(paths::gallery(GalleryKind::Posts, Scope::Owner), "/posts/me");
        assert_eq!(paths::gallery(GalleryKind::Jobs, Scope::Public(9)), "/jobs/user/9");
        assert_eq!(paths::profile(Scope::Public(9)), "/profile/public/9");
    }
}
