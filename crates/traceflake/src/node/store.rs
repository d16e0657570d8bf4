use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// The storage key holding the persisted node id.
pub const NODE_ID_KEY: &str = "snowflake_machine_id";

/// Failure to read or write the node store.
///
/// Never surfaces past node resolution: it is logged and treated as "no
/// stored value".
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The host exposes no persistent storage.
    #[error("node store is unavailable")]
    Unavailable,

    /// The backing file could not be read or written.
    #[error("node store I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A minimal key/value store scoped to the running installation.
pub trait NodeStore {
    /// Reads the value under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: NodeStore + ?Sized> NodeStore for &S {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).save(key, value)
    }
}

impl<S: NodeStore + ?Sized> NodeStore for Arc<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).save(key, value)
    }
}

/// Stores each key as a file of the same name inside a directory.
#[derive(Clone, Debug)]
pub struct FileNodeStore {
    dir: PathBuf,
}

impl FileNodeStore {
    /// A store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The per-user default location: `traceflake` under the platform's
    /// local data directory (`$XDG_DATA_HOME` or `~/.local/share` on Linux,
    /// `~/Library/Application Support` on macOS, `%LOCALAPPDATA%` on
    /// Windows), else under the cache directory.
    ///
    /// Falls back to the working directory when the host reports no home.
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("traceflake")
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Default for FileNodeStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl NodeStore for FileNodeStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents.trim().to_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// An in-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryNodeStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `key = value`.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
        store
    }
}

impl NodeStore for MemoryNodeStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Unavailable)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// A store for hosts without persistence; every access fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStore;

impl NodeStore for NoStore {
    fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}
