#![allow(dead_code)]

use alert_archive_core::error::{CoreError, CoreResult};
use alert_archive_core::model::AlertRecord;
use alert_archive_core::source::AlertSource;
use alert_archive_core::store::{ListPage, ObjectStore};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// Serves canned records and remembers lookup order.
#[derive(Default)]
pub struct FakeSource {
    pub records: BTreeMap<String, Value>,
    pub errors: BTreeMap<String, u16>,
    pub lookups: Mutex<Vec<String>>,
    pub health_checks: Mutex<usize>,
}

impl FakeSource {
    pub fn with_records(records: &[Value]) -> Self {
        let mut src = Self::default();
        for r in records {
            let id = r["id"].as_str().unwrap().to_string();
            src.records.insert(id, r.clone());
        }
        src
    }

    pub fn enriched(ids_and_times: &[(&str, i64)]) -> Self {
        let records: Vec<Value> = ids_and_times
            .iter()
            .map(|(id, ts)| json!({"id": id, "created_at": ts, "severity": "high"}))
            .collect();
        Self::with_records(&records)
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl AlertSource for FakeSource {
    fn fetch_by_id(&self, alert_id: &str) -> CoreResult<AlertRecord> {
        self.lookups.lock().unwrap().push(alert_id.to_string());
        if let Some(status) = self.errors.get(alert_id) {
            return Err(CoreError::SourceApi {
                status: *status,
                reason: "Not Found".to_string(),
                body: Some(json!({"errors": ["alert not found"]})),
            });
        }
        match self.records.get(alert_id) {
            Some(v) => Ok(AlertRecord::try_from(v.clone()).unwrap()),
            None => Err(CoreError::SourceUnavailable(format!(
                "no canned record for {}",
                alert_id
            ))),
        }
    }

    fn probe(&self) -> CoreResult<bool> {
        *self.health_checks.lock().unwrap() += 1;
        Ok(true)
    }
}

/// Wraps a store and fails the first put to each key in `fail_once`.
pub struct FlakyStore<S> {
    pub inner: S,
    pub fail_once: Mutex<HashSet<String>>,
    pub puts: Mutex<Vec<String>>,
}

impl<S: ObjectStore> FlakyStore<S> {
    pub fn new(inner: S, fail_once: &[&str]) -> Self {
        Self {
            inner,
            fail_once: Mutex::new(fail_once.iter().map(|k| k.to_string()).collect()),
            puts: Mutex::new(Vec::new()),
        }
    }

    pub fn puts(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }
}

impl<S: ObjectStore> ObjectStore for FlakyStore<S> {
    fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, body: &[u8]) -> CoreResult<()> {
        if self.fail_once.lock().unwrap().remove(key) {
            return Err(CoreError::StorageUnavailable(format!("injected failure on {}", key)));
        }
        self.puts.lock().unwrap().push(key.to_string());
        self.inner.put(key, body)
    }

    fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> CoreResult<ListPage> {
        self.inner.list_page(prefix, continuation_token, max_keys)
    }
}

/// Caps every listing page, forcing callers through continuation tokens.
pub struct SmallPages<S> {
    pub inner: S,
    pub page_size: usize,
    pub pages_served: Mutex<usize>,
}

impl<S: ObjectStore> ObjectStore for SmallPages<S> {
    fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, body: &[u8]) -> CoreResult<()> {
        self.inner.put(key, body)
    }

    fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> CoreResult<ListPage> {
        *self.pages_served.lock().unwrap() += 1;
        self.inner
            .list_page(prefix, continuation_token, max_keys.min(self.page_size))
    }
}

pub fn read_json<S: ObjectStore>(store: &S, key: &str) -> Value {
    let bytes = store
        .get(key)
        .unwrap()
        .unwrap_or_else(|| panic!("{} missing", key));
    serde_json::from_slice(&bytes).unwrap()
}
