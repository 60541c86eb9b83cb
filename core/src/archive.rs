use crate::config::ArchiveConfig;
use crate::error::CoreResult;
use crate::model::{AlertBatch, AlertRecord, ArchivedAlert};
use crate::normalizer;
use crate::pipeline::ArchivalPipeline;
use crate::query::RangeQueryEngine;
use crate::source::AlertSource;
use crate::store::ObjectStore;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchiveStatus {
    pub store: bool,
    pub source: bool,
}

impl ArchiveStatus {
    pub fn success(&self) -> bool {
        self.store && self.source
    }
}

/// Entry point used by the HTTP boundary: one store, one alert source and
/// the immutable configuration they were built from.
pub struct AlertArchive<S, A> {
    config: ArchiveConfig,
    store: S,
    source: A,
}

impl<S: ObjectStore, A: AlertSource> AlertArchive<S, A> {
    pub fn new(config: ArchiveConfig, store: S, source: A) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &A {
        &self.source
    }

    pub fn archive_batch(&self, batch: &AlertBatch) -> CoreResult<Vec<ArchivedAlert>> {
        ArchivalPipeline::new(&self.store, &self.source, self.config.prefix()).archive(batch)
    }

    /// Normalize a decoded webhook body, then archive it.
    pub fn archive_payload(&self, payload: &Value) -> CoreResult<Vec<ArchivedAlert>> {
        let batch = normalizer::normalize(payload)?;
        self.archive_batch(&batch)
    }

    pub fn query_by_range(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> CoreResult<Vec<AlertRecord>> {
        RangeQueryEngine::new(&self.store, self.config.prefix()).query_by_range(start, end)
    }

    pub fn get_by_id(&self, alert_id: &str) -> CoreResult<AlertRecord> {
        RangeQueryEngine::new(&self.store, self.config.prefix()).fetch_record(alert_id)
    }

    /// Both checks run, even when the store is down; the store's failure is
    /// reported first.
    pub fn status(&self) -> CoreResult<ArchiveStatus> {
        let store = self.store.probe();
        let source = self.source.probe();
        if let Err(e) = &source {
            warn!(error = %e, "alert source probe failed");
        }
        Ok(ArchiveStatus {
            store: store?,
            source: source?,
        })
    }
}
