use anyhow::Result;
use std::sync::Arc;

use jobboard_profile::auth::{AuthSession, TokenSession};
use jobboard_profile::domain::GalleryKind;
use jobboard_profile::{config, logging, GalleryLoader, ProfileClient, ProfileStore, Scope};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env)?;

    tracing::info!(
        env = ?settings.env,
        api = %settings.api_base_url,
        "Starting profile sync"
    );

    let session: Arc<dyn AuthSession> = Arc::new(match &settings.api_token {
        Some(token) => TokenSession::new(token.clone(), None),
        None => TokenSession::anonymous(),
    });

    let client = ProfileClient::new(
        &settings.api_base_url,
        session,
        settings.api_timeout_seconds,
    )?;

    if let Err(e) = client.health_check().await {
        tracing::warn!(error = %e, "Profile service health check failed - trying anyway");
    }

    let scope = Scope::for_viewer(
        settings.target_profile_id.is_none(),
        settings.target_profile_id,
    )?;

    let api = Arc::new(client);
    let store = ProfileStore::new(api.clone()).with_date_policy(settings.date_policy);
    store.load(scope).await?;

    if let Some(profile) = store.confirmed() {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    }

    let gallery = GalleryLoader::new(api, scope);
    for kind in [GalleryKind::Posts, GalleryKind::Jobs] {
        gallery.select(kind).await;
        if let Some(notice) = gallery.notice() {
            tracing::warn!(%kind, message = %notice.message, "Gallery unavailable");
            gallery.dismiss_notice();
        } else {
            tracing::info!(%kind, items = gallery.items(kind).len(), "Gallery loaded");
        }
    }

    Ok(())
}
