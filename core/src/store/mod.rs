pub mod fs;

use crate::error::{CoreError, CoreResult};

/// Page size used by [`ObjectStore::list`] when walking a prefix.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Present while the listing is truncated.
    pub next_continuation_token: Option<String>,
}

pub trait ObjectStore: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>>;

    /// Overwrites any existing object.
    fn put(&self, key: &str, body: &[u8]) -> CoreResult<()>;

    /// Keys starting with `prefix`, in lexicographic order, resuming after
    /// `continuation_token`.
    fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> CoreResult<ListPage>;

    /// Every key under `prefix`, following continuation tokens until the
    /// store reports the listing complete.
    fn list(&self, prefix: &str) -> CoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.list_page(prefix, token.as_deref(), DEFAULT_PAGE_SIZE)?;
            keys.extend(page.keys);
            match page.next_continuation_token {
                Some(next) if token.as_deref() == Some(next.as_str()) => {
                    return Err(CoreError::StorageUnavailable(format!(
                        "listing {:?} did not advance past continuation token {:?}",
                        prefix, next
                    )));
                }
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(keys)
    }

    /// Connectivity check: a single one-key listing.
    fn probe(&self) -> CoreResult<bool> {
        self.list_page("", None, 1)?;
        Ok(true)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, body: &[u8]) -> CoreResult<()> {
        (**self).put(key, body)
    }

    fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> CoreResult<ListPage> {
        (**self).list_page(prefix, continuation_token, max_keys)
    }

    fn list(&self, prefix: &str) -> CoreResult<Vec<String>> {
        (**self).list(prefix)
    }

    fn probe(&self) -> CoreResult<bool> {
        (**self).probe()
    }
}
