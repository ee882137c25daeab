use reqwest::Client;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::profession::CategoryJobIndex;
use crate::orchestrator::{Collaborators, EventSink, UploadOrchestrator};
use crate::services::{
    background::{self, BackgroundError},
    canvas::CanvasPlacer,
    compression::ImageCompressor,
    host::DesignHost,
    issuer::HttpUrlIssuer,
    kv::{FileStore, KeyValueStore, KvError},
    poller::HttpResultPoller,
    storage::HttpObjectStore,
};

/// Everything the panel needs, wired from configuration.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: UploadOrchestrator,
    pub host: Arc<dyn DesignHost>,
    pub store: Arc<dyn KeyValueStore>,
    pub professions: CategoryJobIndex,
    background_image_url: String,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        host: Arc<dyn DesignHost>,
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let http = Client::new();

        let services = Collaborators {
            compressor: Arc::new(ImageCompressor::new(config.compression())),
            issuer: Arc::new(HttpUrlIssuer::new(
                http.clone(),
                &config.issuer_endpoint,
                &config.bucket_name,
            )),
            store: Arc::new(HttpObjectStore::new(http.clone())),
            poller: Arc::new(HttpResultPoller::new(http, &config.result_endpoint)),
        };

        let placer = CanvasPlacer::new(Arc::clone(&host), config.placement());
        let orchestrator =
            UploadOrchestrator::with_placer(config.orchestrator(), services, placer, sink);

        Self {
            orchestrator,
            host,
            store,
            professions: CategoryJobIndex::new(),
            background_image_url: config.background_image_url.clone(),
        }
    }

    /// Like [`AppState::new`], persisting panel flags in `config.state_file`.
    pub fn from_config(
        config: &AppConfig,
        host: Arc<dyn DesignHost>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, KvError> {
        let store = FileStore::open(&config.state_file)?;
        Ok(Self::new(config, host, Arc::new(store), sink))
    }

    /// Apply the page background unless a previous session already did.
    pub async fn prepare_page(&self) -> Result<bool, BackgroundError> {
        background::ensure_page_background(
            self.host.as_ref(),
            self.store.as_ref(),
            &self.background_image_url,
        )
        .await
    }
}
