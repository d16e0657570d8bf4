use core::time::Duration;
use std::path::PathBuf;

use crate::{
    BasicTraceIdGenerator, EPOCH, FileNodeStore, LockTraceIdGenerator, NodeId,
    NodeIdentityProvider, Result, SystemClock, ThreadRandom,
};

/// Where a generator's node id comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeSource {
    /// Assigned out of band, for deployments that coordinate node ids.
    Explicit(NodeId),
    /// Read from (or lazily written to) a [`FileNodeStore`] rooted at the
    /// given directory.
    Persisted(PathBuf),
    /// A fresh random id for this process only.
    Random,
}

/// Settings for building a generator over the system clock.
///
/// The default uses [`EPOCH`] and persists the node id under
/// [`FileNodeStore::default_dir`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Offset from the Unix epoch that timestamps count from.
    pub epoch: Duration,
    /// How the node id is chosen.
    pub node: NodeSource,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            epoch: EPOCH,
            node: NodeSource::Persisted(FileNodeStore::default_dir()),
        }
    }
}

impl GeneratorConfig {
    /// The default epoch with the given node source.
    pub fn with_node(node: NodeSource) -> Self {
        Self {
            node,
            ..Self::default()
        }
    }

    /// Resolves the node id. Never fails: storage problems fall back to a
    /// random id.
    pub fn resolve_node_id(&self) -> NodeId {
        match &self.node {
            NodeSource::Explicit(node_id) => *node_id,
            NodeSource::Persisted(dir) => {
                NodeIdentityProvider::new(FileNodeStore::new(dir)).resolve()
            }
            NodeSource::Random => NodeId::random(&ThreadRandom),
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`](crate::Error::ClockBeforeEpoch)
    /// if the system clock reads earlier than the configured epoch.
    pub fn clock(&self) -> Result<SystemClock> {
        SystemClock::with_epoch(self.epoch)
    }

    /// Builds a single-threaded generator.
    ///
    /// # Errors
    ///
    /// See [`clock`](Self::clock).
    pub fn build(&self) -> Result<BasicTraceIdGenerator<SystemClock>> {
        let clock = self.clock()?;
        let node_id = self.resolve_node_id();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            node_id = node_id.get(),
            epoch_ms = clock.epoch_millis(),
            "built generator"
        );
        Ok(BasicTraceIdGenerator::new(node_id, clock))
    }

    /// Builds a generator that can be cloned and shared across threads.
    ///
    /// # Errors
    ///
    /// See [`clock`](Self::clock).
    pub fn build_shared(&self) -> Result<LockTraceIdGenerator<SystemClock>> {
        let clock = self.clock()?;
        let node_id = self.resolve_node_id();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            node_id = node_id.get(),
            epoch_ms = clock.epoch_millis(),
            "built shared generator"
        );
        Ok(LockTraceIdGenerator::new(node_id, clock))
    }
}
