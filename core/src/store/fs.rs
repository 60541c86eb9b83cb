use crate::error::{CoreError, CoreResult};
use crate::store::{ListPage, ObjectStore};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Bucket backed by a directory; each key is a relative file path.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn open(root: impl AsRef<Path>) -> CoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            CoreError::StorageUnavailable(format!("create bucket dir {}: {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
        validate_key(key)?;
        let mut path = self.root.clone();
        for segment in key.split('/') {
            path.push(segment);
        }
        Ok(path)
    }

    fn key_for(&self, path: &Path) -> CoreResult<String> {
        let rel = path.strip_prefix(&self.root).map_err(|_| {
            CoreError::StorageUnavailable(format!("{} escaped bucket root", path.display()))
        })?;
        let mut segments = Vec::new();
        for component in rel.components() {
            let segment = component.as_os_str().to_str().ok_or_else(|| {
                CoreError::StorageUnavailable(format!("non UTF-8 object path {}", path.display()))
            })?;
            segments.push(segment);
        }
        Ok(segments.join("/"))
    }

    /// Directory that contains every key starting with `prefix`.
    fn walk_root(&self, prefix: &str) -> PathBuf {
        let mut dir = self.root.clone();
        if let Some((parent, _)) = prefix.rsplit_once('/') {
            for segment in parent.split('/') {
                if segment.is_empty() || segment == "." || segment == ".." {
                    return self.root.clone();
                }
                dir.push(segment);
            }
        }
        dir
    }
}

fn validate_key(key: &str) -> CoreResult<()> {
    let bad_segment = key
        .split('/')
        .any(|s| s.is_empty() || s == "." || s == "..");
    if key.is_empty() || key.contains('\\') || bad_segment {
        return Err(CoreError::InvalidInput(format!(
            "object key {:?} is not a valid relative path",
            key
        )));
    }
    Ok(())
}

impl ObjectStore for FsObjectStore {
    fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::StorageUnavailable(format!("read {}: {}", key, e))),
        }
    }

    fn put(&self, key: &str, body: &[u8]) -> CoreResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CoreError::StorageUnavailable(format!("mkdir for {}: {}", key, e)))?;
        }
        fs::write(&path, body)
            .map_err(|e| CoreError::StorageUnavailable(format!("write {}: {}", key, e)))
    }

    fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> CoreResult<ListPage> {
        let walk_root = self.walk_root(prefix);
        if !walk_root.is_dir() {
            return Ok(ListPage::default());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&walk_root).min_depth(1) {
            let entry = entry.map_err(|e| {
                CoreError::StorageUnavailable(format!("list {:?}: {}", prefix, e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let key = self.key_for(entry.path())?;
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        keys.sort();

        let start = match continuation_token {
            Some(token) => keys.partition_point(|k| k.as_str() <= token),
            None => 0,
        };
        let end = start.saturating_add(max_keys.max(1)).min(keys.len());
        let next_continuation_token = if end < keys.len() {
            keys.get(end - 1).cloned()
        } else {
            None
        };
        Ok(ListPage {
            keys: keys[start..end].to_vec(),
            next_continuation_token,
        })
    }
}
