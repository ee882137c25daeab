use crate::services::host::{AssetUpload, DesignHost, HostError};
use crate::services::kv::{KeyValueStore, KvError};

/// Persisted flag marking that the page background has been applied.
pub const BACKGROUND_FLAG_KEY: &str = "backgroundImageSet";

/// Apply the panel background once per persisted store.
///
/// Returns `Ok(true)` when the background was set by this call and
/// `Ok(false)` when the flag says it was already done.
pub async fn ensure_page_background(
    host: &dyn DesignHost,
    store: &dyn KeyValueStore,
    background_url: &str,
) -> Result<bool, BackgroundError> {
    if store.get(BACKGROUND_FLAG_KEY).as_deref() == Some("true") {
        tracing::debug!("Page background already set");
        return Ok(false);
    }

    let fonts = host.find_fonts().await?;
    tracing::debug!(font_count = fonts.len(), "Fonts available");

    let selected = host.request_font_selection().await?;
    tracing::debug!(font = ?selected.as_ref().map(|f| f.name.as_str()), "Font selection returned");

    let asset = host
        .upload_asset(AssetUpload::generated_image(background_url, "image/png"))
        .await?;

    host.set_page_background(asset).await?;
    store.set(BACKGROUND_FLAG_KEY, "true").await?;

    tracing::info!(background_url = %background_url, "Page background set");
    Ok(true)
}

#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("Host operation failed: {0}")]
    Host(#[from] HostError),

    #[error("Could not persist background flag: {0}")]
    Store(#[from] KvError),
}
