use std::sync::Arc;

use crate::config::PlacementConfig;
use crate::services::host::{AssetRef, AssetUpload, DesignHost, Element, HostError, PageDimensions};
use crate::services::poller::ProcessedResult;

const PORTRAIT_SIZE: f64 = 500.0;
const PORTRAIT_TEXT_GAP: f64 = 60.0;
const CAPTION_INSET: f64 = 30.0;
const CAPTION_FONT_SIZE: f64 = 25.0;
const CAPTION_COLOR: &str = "#ffffff";

/// Result images the host accepts as assets.
pub const PLACEABLE_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    /// `None` keeps the asset's aspect ratio
    pub height: Option<f64>,
}

/// Positions of the three elements of the result group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupLayout {
    pub text_box: Rect,
    pub portrait: Rect,
    pub caption: Rect,
}

pub fn layout(page: PageDimensions) -> GroupLayout {
    GroupLayout {
        text_box: Rect {
            top: PORTRAIT_SIZE + PORTRAIT_TEXT_GAP / 2.0,
            left: 0.0,
            width: page.width + PORTRAIT_TEXT_GAP,
            height: None,
        },
        portrait: Rect {
            top: 0.0,
            left: (page.width - PORTRAIT_SIZE) / 2.0 + CAPTION_INSET,
            width: PORTRAIT_SIZE,
            height: Some(PORTRAIT_SIZE),
        },
        caption: Rect {
            top: PORTRAIT_SIZE + PORTRAIT_TEXT_GAP,
            left: CAPTION_INSET,
            width: page.width,
            height: None,
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Placed,
    /// The design has no fixed dimensions, nothing was added.
    SkippedNoDimensions,
}

/// Puts a processed result on the current page.
pub struct CanvasPlacer {
    host: Arc<dyn DesignHost>,
    config: PlacementConfig,
}

impl CanvasPlacer {
    pub fn new(host: Arc<dyn DesignHost>, config: PlacementConfig) -> Self {
        Self { host, config }
    }

    pub async fn place(&self, result: &ProcessedResult) -> Result<Placement, PlacementError> {
        let mime_type = result.content_type.as_deref().unwrap_or("image/jpeg");
        if !PLACEABLE_MIME_TYPES.contains(&mime_type) {
            return Err(PlacementError::UnsupportedMime(mime_type.to_string()));
        }

        let portrait = self
            .host
            .upload_asset(AssetUpload::generated_image(&result.url, mime_type))
            .await?;
        let text_box = self
            .host
            .upload_asset(AssetUpload::generated_image(
                &self.config.text_box_image_url,
                "image/png",
            ))
            .await?;

        let Some(page) = self.host.page_dimensions().await? else {
            tracing::warn!("Current design has no dimensions, skipping placement");
            return Ok(Placement::SkippedNoDimensions);
        };

        let elements = self.elements(layout(page), portrait, text_box);
        self.host.add_element_group(elements).await?;

        tracing::info!(result_url = %result.url, "Result placed on page");
        Ok(Placement::Placed)
    }

    fn elements(&self, layout: GroupLayout, portrait: AssetRef, text_box: AssetRef) -> Vec<Element> {
        vec![
            Element::Image {
                asset: text_box,
                alt_text: "Caption background".to_string(),
                width: layout.text_box.width,
                height: layout.text_box.height,
                top: layout.text_box.top,
                left: layout.text_box.left,
            },
            Element::Image {
                asset: portrait,
                alt_text: "Future self portrait".to_string(),
                width: layout.portrait.width,
                height: layout.portrait.height,
                top: layout.portrait.top,
                left: layout.portrait.left,
            },
            Element::Text {
                text: self.config.caption_text.clone(),
                width: layout.caption.width,
                top: layout.caption.top,
                left: layout.caption.left,
                font_size: CAPTION_FONT_SIZE,
                color: CAPTION_COLOR.to_string(),
            },
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("Unsupported result image type: {0}")]
    UnsupportedMime(String),

    #[error("Host operation failed: {0}")]
    Host(#[from] HostError),
}
