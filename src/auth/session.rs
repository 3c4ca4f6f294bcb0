use parking_lot::RwLock;

use crate::domain::profiles::ProfileId;

/// Login session handed to the profile client.
///
/// The login flow owns the credential. The profile layer only reads it and
/// reports expiry through `on_expired`.
pub trait AuthSession: Send + Sync {
    /// Current bearer token, if logged in
    fn token(&self) -> Option<String>;

    /// Identity of the logged-in user
    fn user_id(&self) -> Option<ProfileId>;

    /// Called once per request rejected with 401
    fn on_expired(&self);
}

/// Session backed by an in-memory token, cleared on expiry.
#[derive(Debug, Default)]
pub struct TokenSession {
    inner: RwLock<SessionInner>,
}

#[derive(Debug, Default)]
struct SessionInner {
    token: Option<String>,
    user_id: Option<ProfileId>,
    expired: bool,
}

impl TokenSession {
    pub fn new(token: impl Into<String>, user_id: Option<ProfileId>) -> Self {
        Self {
            inner: RwLock::new(SessionInner {
                token: Some(token.into()),
                user_id,
                expired: false,
            }),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_expired(&self) -> bool {
        self.inner.read().expired
    }
}

impl AuthSession for TokenSession {
    fn token(&self) -> Option<String> {
        self.inner.read().token.clone()
    }

    fn user_id(&self) -> Option<ProfileId> {
        self.inner.read().user_id
    }

    fn on_expired(&self) {
        let mut inner = self.inner.write();
        inner.token = None;
        inner.expired = true;
        tracing::warn!(user_id = ?inner.user_id, "Session expired, credential cleared");
    }
}

/// `Authorization` header value for a token
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_clears_token() {
        let session = TokenSession::new("abc", Some(7));
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.on_expired();

        assert_eq!(session.token(), None);
        assert!(session.is_expired());
        assert_eq!(session.user_id(), Some(7));
    }

    #[test]
    fn bearer_header_format() {
        assert_eq!(bearer("t0k"), "Bearer t0k");
    }
}
