//! Small JSON documents (settings, scoreboard)
//!
//! Browser builds keep each document in LocalStorage under `orb_arena_<key>`.
//! Native builds write `<key>.json` into a data directory, taken from
//! `ORB_ARENA_DATA_DIR` or `.orb-arena` by default.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Environment variable overriding the native data directory
pub const DATA_DIR_ENV: &str = "ORB_ARENA_DATA_DIR";

#[derive(Debug, Clone)]
pub struct Store {
    #[cfg(not(target_arch = "wasm32"))]
    dir: std::path::PathBuf,
}

impl Store {
    /// The platform default location
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_default() -> Self {
        let dir = std::env::var_os(DATA_DIR_ENV)
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| std::path::PathBuf::from(".orb-arena"));
        Self { dir }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn open_default() -> Self {
        Self {}
    }

    /// Store rooted at an explicit directory
    #[cfg(not(target_arch = "wasm32"))]
    pub fn at(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read a document; `Ok(None)` when nothing was saved yet
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistError> {
        match self.read_raw(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Read a document, falling back to `T::default()` on any failure
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.load(key) {
            Ok(Some(value)) => {
                log::info!("Loaded {key}");
                value
            }
            Ok(None) => {
                log::info!("No saved {key}, using defaults");
                T::default()
            }
            Err(e) => {
                log::warn!("Could not load {key} ({e}), using defaults");
                T::default()
            }
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PersistError> {
        let json = serde_json::to_string(value)?;
        self.write_raw(key, &json)?;
        log::info!("Saved {key}");
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn path(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read_raw(&self, key: &str) -> Result<Option<String>, PersistError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn write_raw(&self, key: &str, json: &str) -> Result<(), PersistError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves half a document
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .ok_or_else(|| PersistError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|_| PersistError::Unavailable("localStorage access denied".into()))?
            .ok_or_else(|| PersistError::Unavailable("localStorage missing".into()))
    }

    #[cfg(target_arch = "wasm32")]
    fn read_raw(&self, key: &str) -> Result<Option<String>, PersistError> {
        Self::storage()?
            .get_item(&format!("orb_arena_{key}"))
            .map_err(|_| PersistError::Unavailable(format!("cannot read {key}")))
    }

    #[cfg(target_arch = "wasm32")]
    fn write_raw(&self, key: &str, json: &str) -> Result<(), PersistError> {
        Self::storage()?
            .set_item(&format!("orb_arena_{key}"), json)
            .map_err(|_| PersistError::Unavailable(format!("cannot write {key}")))
    }
}

/// Unique scratch directory for tests
#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) fn temp_store(tag: &str) -> Store {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "orb-arena-test-{tag}-{}-{n}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    Store::at(dir)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn test_missing_document_is_none() {
        let store = temp_store("missing");
        assert!(store.load::<Doc>("nothing").unwrap().is_none());
        assert_eq!(store.load_or_default::<Doc>("nothing"), Doc::default());
    }

    #[test]
    fn test_save_then_load() {
        let store = temp_store("save");
        let doc = Doc {
            name: "Ada".into(),
            count: 3,
        };
        store.save("doc", &doc).unwrap();
        assert_eq!(store.load::<Doc>("doc").unwrap(), Some(doc));
    }

    #[test]
    fn test_corrupt_document_falls_back() {
        let store = temp_store("corrupt");
        std::fs::create_dir_all(&store.dir).unwrap();
        std::fs::write(store.path("doc"), "{ nope").unwrap();
        assert!(matches!(store.load::<Doc>("doc"), Err(PersistError::Json(_))));
        assert_eq!(store.load_or_default::<Doc>("doc"), Doc::default());
    }
}
