use std::sync::OnceLock;

use crate::{
    FileNodeStore, NODE_ID_KEY, NoStore, NodeId, NodeStore, RandSource, Result, ThreadRandom,
};

/// Resolves the node id for this installation, persisting it when possible.
///
/// Resolution runs at most once per provider; later calls return the
/// cached id until [`reset`](Self::reset) is called.
///
/// ```
/// use traceflake::{MemoryNodeStore, NodeIdentityProvider};
///
/// let store = MemoryNodeStore::new();
/// let first = NodeIdentityProvider::new(&store).resolve();
/// // a fresh provider over the same store sees the persisted id
/// assert_eq!(NodeIdentityProvider::new(&store).resolve(), first);
/// ```
#[derive(Debug)]
pub struct NodeIdentityProvider<S = FileNodeStore, R = ThreadRandom>
where
    S: NodeStore,
    R: RandSource,
{
    explicit: Option<NodeId>,
    store: S,
    rng: R,
    cached: OnceLock<NodeId>,
}

impl<S: NodeStore> NodeIdentityProvider<S, ThreadRandom> {
    /// A provider backed by `store`, drawing fallback ids from the thread
    /// RNG.
    pub fn new(store: S) -> Self {
        Self::with_rng(store, ThreadRandom)
    }
}

impl NodeIdentityProvider<NoStore, ThreadRandom> {
    /// A provider that always yields `value` and never touches a store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`](crate::Error::InvalidNodeId) if
    /// `value` is outside `0..=1023`.
    pub fn explicit(value: i64) -> Result<Self> {
        let node_id = NodeId::new(value)?;
        Ok(Self {
            explicit: Some(node_id),
            store: NoStore,
            rng: ThreadRandom,
            cached: OnceLock::new(),
        })
    }
}

impl<S, R> NodeIdentityProvider<S, R>
where
    S: NodeStore,
    R: RandSource,
{
    /// A provider backed by `store` that draws fallback ids from `rng`.
    pub fn with_rng(store: S, rng: R) -> Self {
        Self {
            explicit: None,
            store,
            rng,
            cached: OnceLock::new(),
        }
    }

    /// Returns the node id, resolving it on first use.
    ///
    /// A stored value in range is reused. Anything else (missing, malformed,
    /// out of range, or an unreadable store) yields a fresh random id that
    /// is persisted on a best-effort basis. This never fails.
    pub fn resolve(&self) -> NodeId {
        *self.cached.get_or_init(|| self.resolve_uncached())
    }

    /// Forgets the cached id so the next [`resolve`](Self::resolve) consults
    /// the store again.
    pub fn reset(&mut self) {
        self.cached.take();
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn resolve_uncached(&self) -> NodeId {
        if let Some(node_id) = self.explicit {
            return node_id;
        }

        if let Some(node_id) = self.load_stored() {
            #[cfg(feature = "tracing")]
            tracing::debug!(node_id = node_id.get(), "reusing persisted node id");
            return node_id;
        }

        let node_id = NodeId::random(&self.rng);
        match self.store.save(NODE_ID_KEY, &node_id.to_string()) {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::info!(node_id = node_id.get(), "assigned new node id");
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    node_id = node_id.get(),
                    error = %_e,
                    "could not persist node id, using it for this run only"
                );
            }
        }
        node_id
    }

    fn load_stored(&self) -> Option<NodeId> {
        let raw = match self.store.load(NODE_ID_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_e, "node store unreadable");
                return None;
            }
        };

        match raw.parse::<i64>().map(NodeId::new) {
            Ok(Ok(node_id)) => Some(node_id),
            _ => {
                #[cfg(feature = "tracing")]
                tracing::warn!(stored = %raw, "ignoring malformed persisted node id");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::{Error, MemoryNodeStore, StoreError};

    struct FixedRand(u64);

    impl RandSource for FixedRand {
        fn rand(&self) -> u64 {
            self.0
        }
    }

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryNodeStore,
        loads: Cell<usize>,
        saves: Cell<usize>,
    }

    impl NodeStore for CountingStore {
        fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.loads.set(self.loads.get() + 1);
            self.inner.load(key)
        }

        fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.saves.set(self.saves.get() + 1);
            self.inner.save(key, value)
        }
    }

    #[test]
    fn stored_value_is_reused() {
        let store = MemoryNodeStore::with_entry(NODE_ID_KEY, "512");
        let provider = NodeIdentityProvider::with_rng(&store, FixedRand(3));
        assert_eq!(provider.resolve().get(), 512);
        assert_eq!(store.load(NODE_ID_KEY).unwrap().as_deref(), Some("512"));
    }

    #[test]
    fn missing_value_is_drawn_and_persisted() {
        let store = MemoryNodeStore::new();
        let provider = NodeIdentityProvider::with_rng(&store, FixedRand(1024 + 77));
        assert_eq!(provider.resolve().get(), 77);
        assert_eq!(store.load(NODE_ID_KEY).unwrap().as_deref(), Some("77"));

        let again = NodeIdentityProvider::with_rng(&store, FixedRand(5));
        assert_eq!(again.resolve().get(), 77);
    }

    #[test]
    fn malformed_or_out_of_range_values_are_replaced() {
        for bad in ["", "abc", "1024", "-1", "12.5", "99999999999999999999"] {
            let store = MemoryNodeStore::with_entry(NODE_ID_KEY, bad);
            let provider = NodeIdentityProvider::with_rng(&store, FixedRand(9));
            assert_eq!(provider.resolve().get(), 9, "stored {bad:?}");
            assert_eq!(store.load(NODE_ID_KEY).unwrap().as_deref(), Some("9"));
        }
    }

    #[test]
    fn unavailable_store_still_yields_an_id() {
        let provider = NodeIdentityProvider::with_rng(NoStore, FixedRand(u64::MAX));
        assert_eq!(provider.resolve().get(), 1023);

        let provider = NodeIdentityProvider::new(NoStore);
        let node_id = provider.resolve();
        assert!(node_id.get() <= NodeId::MAX);
        // cached for the lifetime of the provider even without persistence
        assert_eq!(provider.resolve(), node_id);
    }

    #[test]
    fn store_is_consulted_once_until_reset() {
        let mut provider = NodeIdentityProvider::with_rng(CountingStore::default(), FixedRand(4));
        for _ in 0..10 {
            assert_eq!(provider.resolve().get(), 4);
        }
        assert_eq!(provider.store().loads.get(), 1);
        assert_eq!(provider.store().saves.get(), 1);

        provider.reset();
        assert_eq!(provider.resolve().get(), 4);
        assert_eq!(provider.store().loads.get(), 2);
        // the persisted value was found, nothing new to save
        assert_eq!(provider.store().saves.get(), 1);
    }

    #[test]
    fn file_store_persists_across_providers() {
        let dir = tempfile::tempdir().unwrap();
        let first = NodeIdentityProvider::new(FileNodeStore::new(dir.path())).resolve();
        let second = NodeIdentityProvider::new(FileNodeStore::new(dir.path())).resolve();
        assert_eq!(first, second);
    }

    #[test]
    fn explicit_value_is_validated() {
        assert_eq!(NodeIdentityProvider::explicit(1023).unwrap().resolve().get(), 1023);
        assert_eq!(
            NodeIdentityProvider::explicit(1024).unwrap_err(),
            Error::InvalidNodeId { value: 1024 }
        );
        assert_eq!(
            NodeIdentityProvider::explicit(-1).unwrap_err(),
            Error::InvalidNodeId { value: -1 }
        );
    }
}
