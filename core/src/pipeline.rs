use crate::error::CoreResult;
use crate::keys;
use crate::model::{AlertBatch, AlertStub, ArchivedAlert};
use crate::source::AlertSource;
use crate::store::ObjectStore;
use tracing::{debug, warn};

/// Enriches each stub through the alert source and writes its webhook pointer
/// followed by its full record.
///
/// Stubs are processed one at a time in input order. The first failure aborts
/// the batch; writes already made stay in place. Every write is an idempotent
/// overwrite, so replaying the whole batch is safe.
pub struct ArchivalPipeline<'a, S: ?Sized, A: ?Sized> {
    store: &'a S,
    source: &'a A,
    prefix: Option<&'a str>,
}

impl<'a, S, A> ArchivalPipeline<'a, S, A>
where
    S: ObjectStore + ?Sized,
    A: AlertSource + ?Sized,
{
    pub fn new(store: &'a S, source: &'a A, prefix: Option<&'a str>) -> Self {
        Self {
            store,
            source,
            prefix,
        }
    }

    pub fn archive(&self, batch: &AlertBatch) -> CoreResult<Vec<ArchivedAlert>> {
        let mut archived = Vec::with_capacity(batch.alerts.len());
        for stub in &batch.alerts {
            archived.push(self.archive_one(stub)?);
        }
        Ok(archived)
    }

    fn archive_one(&self, stub: &AlertStub) -> CoreResult<ArchivedAlert> {
        // Keys first: an id or timestamp that cannot be stored never reaches
        // the source.
        let pointer_key = keys::webhook_pointer_key(&stub.id, stub.created_at, self.prefix)?;
        let record_key = keys::record_key(&stub.id, self.prefix)?;

        let record = self.source.fetch_by_id(&stub.id)?;
        if record.id() != Some(stub.id.as_str()) {
            warn!(
                alert_id = %stub.id,
                record_id = ?record.id(),
                "source record id differs from webhook id; storing under webhook id"
            );
        }

        self.store.put(&pointer_key, &serde_json::to_vec(stub)?)?;
        self.store.put(&record_key, &serde_json::to_vec(&record)?)?;
        debug!(alert_id = %stub.id, %pointer_key, %record_key, "alert archived");

        Ok(ArchivedAlert {
            alert_id: stub.id.clone(),
            pointer_key,
            record_key,
        })
    }
}
