pub mod http;

use crate::error::CoreResult;
use crate::model::AlertRecord;

pub trait AlertSource: Send + Sync {
    fn fetch_by_id(&self, alert_id: &str) -> CoreResult<AlertRecord>;

    /// Fails with the same typed errors as a lookup when the API cannot be
    /// reached or rejects the credential.
    fn probe(&self) -> CoreResult<bool>;
}

impl<T: AlertSource + ?Sized> AlertSource for Box<T> {
    fn fetch_by_id(&self, alert_id: &str) -> CoreResult<AlertRecord> {
        (**self).fetch_by_id(alert_id)
    }

    fn probe(&self) -> CoreResult<bool> {
        (**self).probe()
    }
}
