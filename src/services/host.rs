//! Contract of the design host the panel runs inside.
//!
//! The host owns the canvas, the asset library and font selection. The crate
//! only describes the calls it makes; embedding code provides the bridge.

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
}

/// Provenance tag attached to uploaded assets.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AiDisclosure {
    AppGenerated,
    None,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AssetUpload {
    pub kind: AssetKind,
    pub mime_type: String,
    pub url: String,
    pub thumbnail_url: String,
    pub ai_disclosure: AiDisclosure,
}

impl AssetUpload {
    /// App-generated image whose thumbnail is the image itself.
    pub fn generated_image(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            kind: AssetKind::Image,
            mime_type: mime_type.into(),
            thumbnail_url: url.clone(),
            url,
            ai_disclosure: AiDisclosure::AppGenerated,
        }
    }
}

/// Opaque reference to an uploaded host asset.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AssetRef(pub String);

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum Element {
    Image {
        asset: AssetRef,
        alt_text: String,
        width: f64,
        /// `None` lets the host keep the aspect ratio
        height: Option<f64>,
        top: f64,
        left: f64,
    },
    Text {
        text: String,
        width: f64,
        top: f64,
        left: f64,
        font_size: f64,
        color: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FontRef {
    pub name: String,
}

#[async_trait]
pub trait DesignHost: Send + Sync {
    async fn upload_asset(&self, upload: AssetUpload) -> Result<AssetRef, HostError>;

    /// Adds the elements as one group on the current page.
    async fn add_element_group(&self, elements: Vec<Element>) -> Result<(), HostError>;

    /// `None` when the current design has no fixed dimensions.
    async fn page_dimensions(&self) -> Result<Option<PageDimensions>, HostError>;

    async fn set_page_background(&self, asset: AssetRef) -> Result<(), HostError>;

    async fn find_fonts(&self) -> Result<Vec<FontRef>, HostError>;

    async fn request_font_selection(&self) -> Result<Option<FontRef>, HostError>;
}

/// Failures reported by the design host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("permission denied by design host")]
    PermissionDenied,

    #[error("user is offline")]
    Offline,

    #[error("design host request timed out")]
    Timeout,

    #[error("design host error: {0}")]
    Unknown(String),
}

impl HostError {
    /// Build from the host's error code string.
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        match code {
            "permission_denied" => HostError::PermissionDenied,
            "user_offline" => HostError::Offline,
            "timeout" => HostError::Timeout,
            _ => HostError::Unknown(message.into()),
        }
    }

    /// Diagnostic log entry; host failures never drive recovery.
    pub fn log(&self, operation: &str) {
        match self {
            HostError::PermissionDenied => {
                tracing::warn!(operation, "Host request denied: missing permission")
            }
            HostError::Offline => {
                tracing::warn!(operation, "Host request failed: network unavailable")
            }
            HostError::Timeout => tracing::warn!(operation, "Host request timed out"),
            HostError::Unknown(detail) => {
                tracing::error!(operation, detail = %detail, "Unknown host error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(HostError::from_code("permission_denied", ""), HostError::PermissionDenied);
        assert_eq!(HostError::from_code("user_offline", ""), HostError::Offline);
        assert_eq!(HostError::from_code("timeout", ""), HostError::Timeout);
        assert_eq!(
            HostError::from_code("quota_exceeded", "too many assets"),
            HostError::Unknown("too many assets".to_string())
        );
    }

    #[test]
    fn test_generated_image_upload() {
        let upload = AssetUpload::generated_image("https://cdn.test/bg.png", "image/png");
        assert_eq!(upload.thumbnail_url, upload.url);
        assert_eq!(upload.ai_disclosure, AiDisclosure::AppGenerated);
        assert_eq!(upload.kind, AssetKind::Image);
    }
}
