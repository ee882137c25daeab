use serde::Deserialize;
use std::time::Duration;
use strum::{Display, EnumString};

/// How the visible progress bar is driven while a task is in flight.
#[derive(Debug, Clone, Copy, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProgressMode {
    /// Linear estimate over `estimated_completion_ms`.
    SimulatedLinear,
    /// Fixed 10% steps every 500 ms (the panel's preview mode).
    FixedStep,
    /// Milestone values on every state transition, no timer.
    RealFeedback,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Base URL of the signed-URL issuing endpoint (the bucket name is appended)
    pub issuer_endpoint: String,

    /// Bucket the selfie is uploaded into
    pub bucket_name: String,

    /// Endpoint queried for the processed image
    pub result_endpoint: String,

    /// Background image applied once to a fresh page
    pub background_image_url: String,

    /// Decorative text box placed under the portrait
    pub text_box_image_url: String,

    /// Caption rendered on top of the text box
    #[serde(default = "default_caption")]
    pub caption_text: String,

    /// Lifetime of an issued upload URL
    #[serde(default = "default_url_expiration_secs")]
    pub url_expiration_secs: u32,

    #[serde(default = "default_estimated_completion_ms")]
    pub estimated_completion_ms: u64,

    #[serde(default = "default_progress_tick_ms")]
    pub progress_tick_ms: u64,

    #[serde(default = "default_progress_mode")]
    pub progress_mode: ProgressMode,

    #[serde(default = "default_polling_interval_ms")]
    pub polling_interval_ms: u64,

    /// 0 polls until the result shows up
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Sample result placed when fixed-step progress completes
    #[serde(default)]
    pub demo_result_url: Option<String>,

    #[serde(default = "default_notice_duration_ms")]
    pub notice_duration_ms: u64,

    #[serde(default = "default_compression_max_bytes")]
    pub compression_max_bytes: usize,

    #[serde(default = "default_compression_max_dimension")]
    pub compression_max_dimension: u32,

    /// Path of the JSON file backing the persisted panel flags
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

fn default_caption() -> String {
    "This is the future you have been working towards.".to_string()
}

fn default_url_expiration_secs() -> u32 {
    3600
}

fn default_estimated_completion_ms() -> u64 {
    10_000
}

fn default_progress_tick_ms() -> u64 {
    100
}

fn default_progress_mode() -> ProgressMode {
    ProgressMode::SimulatedLinear
}

fn default_polling_interval_ms() -> u64 {
    3000
}

fn default_max_poll_attempts() -> u32 {
    100
}

fn default_notice_duration_ms() -> u64 {
    2000
}

fn default_compression_max_bytes() -> usize {
    1024 * 1024
}

fn default_compression_max_dimension() -> u32 {
    1920
}

fn default_state_file() -> String {
    "future-self-state.json".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            url_expiration_secs: self.url_expiration_secs,
            estimated_completion: Duration::from_millis(self.estimated_completion_ms),
            progress_tick: Duration::from_millis(self.progress_tick_ms),
            progress_mode: self.progress_mode,
            polling_interval: Duration::from_millis(self.polling_interval_ms),
            max_poll_attempts: self.max_poll_attempts,
            demo_result_url: self.demo_result_url.clone(),
            notice_duration: Duration::from_millis(self.notice_duration_ms),
        }
    }

    pub fn compression(&self) -> CompressionConfig {
        CompressionConfig {
            max_bytes: self.compression_max_bytes,
            max_dimension: self.compression_max_dimension,
        }
    }

    pub fn placement(&self) -> PlacementConfig {
        PlacementConfig {
            text_box_image_url: self.text_box_image_url.clone(),
            caption_text: self.caption_text.clone(),
        }
    }
}

/// Timing and naming knobs injected into the upload orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub url_expiration_secs: u32,
    pub estimated_completion: Duration,
    pub progress_tick: Duration,
    pub progress_mode: ProgressMode,
    pub polling_interval: Duration,
    pub max_poll_attempts: u32,
    /// Placed on the page once fixed-step progress reaches 100
    pub demo_result_url: Option<String>,
    pub notice_duration: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            url_expiration_secs: default_url_expiration_secs(),
            estimated_completion: Duration::from_millis(default_estimated_completion_ms()),
            progress_tick: Duration::from_millis(default_progress_tick_ms()),
            progress_mode: default_progress_mode(),
            polling_interval: Duration::from_millis(default_polling_interval_ms()),
            max_poll_attempts: default_max_poll_attempts(),
            demo_result_url: None,
            notice_duration: Duration::from_millis(default_notice_duration_ms()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// Target upper bound for the encoded JPEG
    pub max_bytes: usize,
    /// Longest edge after downscaling
    pub max_dimension: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_compression_max_bytes(),
            max_dimension: default_compression_max_dimension(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacementConfig {
    pub text_box_image_url: String,
    pub caption_text: String,
}
