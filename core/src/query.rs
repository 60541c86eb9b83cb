use crate::error::{CoreError, CoreResult};
use crate::keys;
use crate::model::AlertRecord;
use crate::store::ObjectStore;
use time::OffsetDateTime;
use tracing::debug;

/// Finds archived alerts by creation time through the webhook pointer tree.
pub struct RangeQueryEngine<'a, S: ?Sized> {
    store: &'a S,
    prefix: Option<&'a str>,
}

impl<'a, S: ObjectStore + ?Sized> RangeQueryEngine<'a, S> {
    pub fn new(store: &'a S, prefix: Option<&'a str>) -> Self {
        Self { store, prefix }
    }

    /// Records whose pointer minute `t` satisfies `start < t < end`, in
    /// listing order. Both bounds are exclusive.
    pub fn query_by_range(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> CoreResult<Vec<AlertRecord>> {
        let listing_prefix = format!("{}/", keys::webhooks_prefix(self.prefix));
        let pointer_keys = self.store.list(&listing_prefix)?;

        let mut alert_ids = Vec::new();
        for key in &pointer_keys {
            let pointer = keys::parse_pointer_key(key, self.prefix)?;
            if start < pointer.timestamp && pointer.timestamp < end {
                alert_ids.push(pointer.alert_id);
            }
        }
        debug!(
            listed = pointer_keys.len(),
            matched = alert_ids.len(),
            "range query pointers resolved"
        );

        alert_ids.iter().map(|id| self.fetch_record(id)).collect()
    }

    /// Record for `alert_id`; absence is an integrity fault.
    pub fn fetch_record(&self, alert_id: &str) -> CoreResult<AlertRecord> {
        let key = keys::record_key(alert_id, self.prefix)?;
        let bytes = self
            .store
            .get(&key)?
            .ok_or_else(|| CoreError::RecordNotFound(alert_id.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
