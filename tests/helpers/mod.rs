//! In-memory collaborators for orchestrator and panel tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use future_self::config::OrchestratorConfig;
use future_self::models::submission::{SourceImage, Submission};
use future_self::models::task::TaskSnapshot;
use future_self::orchestrator::{Collaborators, EventSink, TaskEvent, UploadOrchestrator};
use future_self::services::canvas::CanvasPlacer;
use future_self::services::compression::{CompressionError, Compressor};
use future_self::services::host::{
    AssetRef, AssetUpload, DesignHost, Element, FontRef, HostError, PageDimensions,
};
use future_self::services::issuer::{IssueError, UrlIssuer};
use future_self::services::poller::{PollError, PollOutcome, ProcessedResult, ResultPoller};
use future_self::services::storage::{ObjectStore, StorageError};

pub const RESULT_URL: &str = "https://cdn.example.test/previous-writer-result.jpg";

pub fn png_submission(profession: &str) -> Submission {
    Submission::new(
        profession,
        SourceImage::new("selfie.png", "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3]),
    )
}

/// Compressor that renames the payload, or fails on demand. When gated it
/// holds until released.
pub struct FakeCompressor {
    pub fail: bool,
    pub gate: Option<Arc<Notify>>,
}

#[async_trait]
impl Compressor for FakeCompressor {
    async fn compress(
        &self,
        _image: &SourceImage,
        object_name: &str,
    ) -> Result<SourceImage, CompressionError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(CompressionError::Empty);
        }
        Ok(SourceImage::new(object_name, "image/jpeg", b"compressed".to_vec()))
    }
}

#[derive(Default)]
pub struct FakeIssuer {
    pub url: Option<String>,
    /// (object name, content type) of every request
    pub requests: Mutex<Vec<(String, String)>>,
}

impl FakeIssuer {
    pub fn issuing(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlIssuer for FakeIssuer {
    async fn issue(
        &self,
        object_name: &str,
        content_type: &str,
        _expiration_secs: u32,
    ) -> Result<String, IssueError> {
        self.requests
            .lock()
            .unwrap()
            .push((object_name.to_string(), content_type.to_string()));
        self.url.clone().ok_or(IssueError::MissingUrl)
    }
}

/// Object store answering with a fixed status, optionally held until released.
pub struct FakeStore {
    pub status: u16,
    pub gate: Option<Arc<Notify>>,
    /// (url, body length, content type) of every PUT
    pub puts: Mutex<Vec<(String, usize, String)>>,
}

impl FakeStore {
    pub fn responding(status: u16) -> Self {
        Self {
            status,
            gate: None,
            puts: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            status: 200,
            gate: Some(gate),
            puts: Mutex::new(Vec::new()),
        }
    }

    pub fn puts(&self) -> Vec<(String, usize, String)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put(&self, url: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        self.puts
            .lock()
            .unwrap()
            .push((url.to_string(), bytes.len(), content_type.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.status == 200 {
            Ok(())
        } else {
            Err(StorageError::Rejected(self.status))
        }
    }
}

/// Poller that reports ready on the `ready_after`-th check (0 = never).
pub struct FakePoller {
    pub ready_after: u32,
    pub checks: AtomicU32,
}

impl FakePoller {
    pub fn ready_after(checks: u32) -> Self {
        Self {
            ready_after: checks,
            checks: AtomicU32::new(0),
        }
    }

    pub fn checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultPoller for FakePoller {
    async fn check(&self, _object_name: &str) -> Result<PollOutcome, PollError> {
        let n = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        if self.ready_after > 0 && n >= self.ready_after {
            Ok(PollOutcome::Ready(ProcessedResult {
                url: RESULT_URL.to_string(),
                content_type: Some("image/jpeg".to_string()),
            }))
        } else {
            Ok(PollOutcome::Pending)
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TaskEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TaskEvent::Alert { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: TaskEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Handles to every fake behind an orchestrator.
pub struct Harness {
    pub orchestrator: UploadOrchestrator,
    pub issuer: Arc<FakeIssuer>,
    pub store: Arc<FakeStore>,
    pub poller: Arc<FakePoller>,
    pub sink: Arc<RecordingSink>,
}

pub struct HarnessBuilder {
    pub config: OrchestratorConfig,
    pub compressor_fails: bool,
    pub compressor_gate: Option<Arc<Notify>>,
    pub issuer: FakeIssuer,
    pub store: FakeStore,
    pub poller: FakePoller,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            compressor_fails: false,
            compressor_gate: None,
            issuer: FakeIssuer::issuing("https://bucket.example.test/upload?sig=abc"),
            store: FakeStore::responding(200),
            poller: FakePoller::ready_after(2),
        }
    }
}

impl HarnessBuilder {
    pub fn build(self) -> Harness {
        self.build_with(|config, services, sink| UploadOrchestrator::new(config, services, sink))
    }

    pub fn build_with_placer(self, placer: CanvasPlacer) -> Harness {
        self.build_with(|config, services, sink| {
            UploadOrchestrator::with_placer(config, services, placer, sink)
        })
    }

    fn build_with(
        self,
        make: impl FnOnce(OrchestratorConfig, Collaborators, Arc<dyn EventSink>) -> UploadOrchestrator,
    ) -> Harness {
        let issuer = Arc::new(self.issuer);
        let store = Arc::new(self.store);
        let poller = Arc::new(self.poller);
        let sink = Arc::new(RecordingSink::default());
        let services = Collaborators {
            compressor: Arc::new(FakeCompressor {
                fail: self.compressor_fails,
                gate: self.compressor_gate,
            }),
            issuer: issuer.clone(),
            store: store.clone(),
            poller: poller.clone(),
        };
        let orchestrator = make(self.config, services, sink.clone());
        Harness {
            orchestrator,
            issuer,
            store,
            poller,
            sink,
        }
    }
}

/// Sleep in small steps until the snapshot satisfies `done`.
pub async fn wait_for(
    orchestrator: &UploadOrchestrator,
    done: impl Fn(&TaskSnapshot) -> bool,
) -> TaskSnapshot {
    for _ in 0..2000 {
        let snapshot = orchestrator.snapshot();
        if done(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached, last snapshot: {:?}", orchestrator.snapshot());
}

/// Design host recording every call.
#[derive(Default)]
pub struct FakeHost {
    pub dimensions: Option<PageDimensions>,
    pub fail_uploads: Option<HostError>,
    pub uploads: Mutex<Vec<AssetUpload>>,
    pub groups: Mutex<Vec<Vec<Element>>>,
    pub backgrounds: Mutex<Vec<AssetRef>>,
}

impl FakeHost {
    pub fn with_page(width: f64, height: f64) -> Self {
        Self {
            dimensions: Some(PageDimensions { width, height }),
            ..Default::default()
        }
    }

    pub fn uploads(&self) -> Vec<AssetUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn groups(&self) -> Vec<Vec<Element>> {
        self.groups.lock().unwrap().clone()
    }

    pub fn backgrounds(&self) -> Vec<AssetRef> {
        self.backgrounds.lock().unwrap().clone()
    }
}

#[async_trait]
impl DesignHost for FakeHost {
    async fn upload_asset(&self, upload: AssetUpload) -> Result<AssetRef, HostError> {
        if let Some(err) = &self.fail_uploads {
            return Err(err.clone());
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(upload);
        Ok(AssetRef(format!("asset-{}", uploads.len())))
    }

    async fn add_element_group(&self, elements: Vec<Element>) -> Result<(), HostError> {
        self.groups.lock().unwrap().push(elements);
        Ok(())
    }

    async fn page_dimensions(&self) -> Result<Option<PageDimensions>, HostError> {
        Ok(self.dimensions)
    }

    async fn set_page_background(&self, asset: AssetRef) -> Result<(), HostError> {
        self.backgrounds.lock().unwrap().push(asset);
        Ok(())
    }

    async fn find_fonts(&self) -> Result<Vec<FontRef>, HostError> {
        Ok(vec![FontRef {
            name: "Arial".to_string(),
        }])
    }

    async fn request_font_selection(&self) -> Result<Option<FontRef>, HostError> {
        Ok(None)
    }
}
