use anyhow::{Context, Result};
use std::env;
use url::Url;

use crate::domain::profiles::ProfileId;
use crate::mapping::DatePolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,

    // Profile API
    pub api_base_url: String,
    pub api_timeout_seconds: u64,

    // Session bootstrap (normally handed over by the login flow)
    pub api_token: Option<String>,

    // Which profile the binary reads; owner profile when unset
    pub target_profile_id: Option<ProfileId>,

    // Mapping
    pub date_policy: DatePolicy,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));

        // Profile API
        let raw_url = env::var("PROFILE_API_URL").context("PROFILE_API_URL must be set")?;
        let api_base_url = normalize_base_url(&raw_url)?;
        let api_timeout_seconds = env::var("PROFILE_API_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let api_token = env::var("PROFILE_API_TOKEN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let target_profile_id = match env::var("PROFILE_TARGET_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<ProfileId>()
                    .context("PROFILE_TARGET_ID must be an integer")?,
            ),
            _ => None,
        };

        let date_policy = DatePolicy::from_str(
            &env::var("UNPARSEABLE_DATE_POLICY").unwrap_or_else(|_| "now".to_string()),
        );

        Ok(Settings {
            env,
            api_base_url,
            api_timeout_seconds,
            api_token,
            target_profile_id,
            date_policy,
        })
    }
}

/// Validates the base URL and strips the trailing slash so paths can be appended.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid profile API URL: {}", raw))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}
