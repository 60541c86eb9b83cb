use crate::error::{CoreError, CoreResult};
use crate::keys;
use crate::model::{AlertRecord, AlertStub};
use crate::store::ObjectStore;
use serde::{Deserialize, Serialize};

pub const CHK_KEY_FORMAT: &str = "CHK.POINTER.KEY_FORMAT";
pub const CHK_POINTER_BODY: &str = "CHK.POINTER.BODY";
pub const CHK_RECORD_PRESENT: &str = "CHK.RECORD.PRESENT";
pub const CHK_RECORD_BODY: &str = "CHK.RECORD.BODY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFailure {
    pub check_id: String,
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegritySummary {
    pub prefix: Option<String>,
    pub pointers_checked: usize,
    pub overall: String, // PASS|FAIL
    pub failures: Vec<CheckFailure>,
}

impl IntegritySummary {
    pub fn passed(&self) -> bool {
        self.overall == "PASS"
    }

    pub fn failures_for(&self, check_id: &str) -> Vec<&CheckFailure> {
        self.failures
            .iter()
            .filter(|f| f.check_id == check_id)
            .collect()
    }
}

/// Walk every webhook pointer and confirm it decodes and has its record.
/// Store failures abort the audit; data problems are collected.
pub fn audit_archive<S: ObjectStore + ?Sized>(
    store: &S,
    prefix: Option<&str>,
) -> CoreResult<IntegritySummary> {
    let listing_prefix = format!("{}/", keys::webhooks_prefix(prefix));
    let pointer_keys = store.list(&listing_prefix)?;
    let mut failures = Vec::new();
    let mut fail = |check_id: &str, key: &str, message: String| {
        failures.push(CheckFailure {
            check_id: check_id.to_string(),
            key: key.to_string(),
            message,
        })
    };

    for key in &pointer_keys {
        let pointer = match keys::parse_pointer_key(key, prefix) {
            Ok(p) => p,
            Err(e) => {
                fail(CHK_KEY_FORMAT, key, e.to_string());
                continue;
            }
        };

        match store.get(key)? {
            Some(bytes) => match serde_json::from_slice::<AlertStub>(&bytes) {
                Ok(stub) if stub.id == pointer.alert_id => {}
                Ok(stub) => fail(
                    CHK_POINTER_BODY,
                    key,
                    format!("pointer body names alert {}", stub.id),
                ),
                Err(e) => fail(CHK_POINTER_BODY, key, e.to_string()),
            },
            None => fail(CHK_POINTER_BODY, key, "listed pointer vanished".to_string()),
        }

        let record_key = match keys::record_key(&pointer.alert_id, prefix) {
            Ok(k) => k,
            Err(e) => {
                fail(CHK_KEY_FORMAT, key, e.to_string());
                continue;
            }
        };
        match store.get(&record_key)? {
            Some(bytes) => {
                if let Err(e) = serde_json::from_slice::<AlertRecord>(&bytes) {
                    fail(CHK_RECORD_BODY, &record_key, e.to_string());
                }
            }
            None => fail(
                CHK_RECORD_PRESENT,
                key,
                CoreError::RecordNotFound(pointer.alert_id.clone()).to_string(),
            ),
        }
    }

    let overall = if failures.is_empty() { "PASS" } else { "FAIL" };
    Ok(IntegritySummary {
        prefix: prefix.map(str::to_string),
        pointers_checked: pointer_keys.len(),
        overall: overall.to_string(),
        failures,
    })
}
