use std::path::Path;
use std::sync::Arc;

use alert_archive_core::archive::AlertArchive;
use alert_archive_core::config::ArchiveConfig;
use alert_archive_core::error::{CoreError, CoreResult};
use alert_archive_core::sns::ConfirmationPolicy;
use alert_archive_core::source::http::HttpAlertSource;
use alert_archive_core::source::AlertSource;
use alert_archive_core::store::fs::FsObjectStore;
use alert_archive_core::store::ObjectStore;
use tracing::info;

use super::error::ApiError;

pub type DynArchive = AlertArchive<Box<dyn ObjectStore>, Box<dyn AlertSource>>;

/// Shared by every handler through `State(Arc<AppState>)`.
pub struct AppState {
    pub archive: Arc<DynArchive>,
    /// Async client for the subscription handshake.
    pub http_client: reqwest::Client,
    pub confirmation_policy: ConfirmationPolicy,
}

impl AppState {
    pub fn new(archive: DynArchive) -> CoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(archive.config().request_timeout())
            .build()
            .map_err(|e| CoreError::InvalidInput(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            archive: Arc::new(archive),
            http_client,
            confirmation_policy: ConfirmationPolicy::default(),
        })
    }

    /// Directory-backed bucket under `bucket_dir` plus the HTTP alert source.
    pub fn open(config: ArchiveConfig, bucket_dir: &Path) -> CoreResult<Self> {
        let store: Box<dyn ObjectStore> = Box::new(FsObjectStore::open(bucket_dir)?);
        let source: Box<dyn AlertSource> = Box::new(HttpAlertSource::new(&config)?);
        info!(
            bucket = config.bucket(),
            dir = %bucket_dir.display(),
            source = %config.source_base_url(),
            "archive opened"
        );
        Self::new(AlertArchive::new(config, store, source))
    }

    /// Run a core operation on the blocking pool. Core calls do synchronous
    /// file and network I/O and must stay off the async workers.
    pub async fn run_blocking<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&DynArchive) -> CoreResult<T> + Send + 'static,
    {
        let archive = Arc::clone(&self.archive);
        tokio::task::spawn_blocking(move || op(&archive))
            .await
            .map_err(|e| ApiError::Unexpected(format!("blocking task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}
