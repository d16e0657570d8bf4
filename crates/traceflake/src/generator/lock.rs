use core::fmt;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    NodeId, Poll, Result, TraceId, TraceIdGenerator,
    generator::{Mutex, step::advance},
    time::TimeSource,
};

/// A lock-based trace ID generator for instances shared across threads.
///
/// The state sits in an [`Arc<Mutex<_>>`]. Clones share the same state, so
/// every clone contributes to one strictly increasing stream.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Cheap to clone
///
/// ## See Also
/// - [`BasicTraceIdGenerator`] for single-threaded use
///
/// [`BasicTraceIdGenerator`]: crate::BasicTraceIdGenerator
pub struct LockTraceIdGenerator<T>
where
    T: TimeSource,
{
    state: Arc<Mutex<TraceId>>,
    node_id: NodeId,
    time: T,
}

impl<T> Clone for LockTraceIdGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            node_id: self.node_id,
            time: self.time.clone(),
        }
    }
}

impl<T> LockTraceIdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new generator for `node_id`, reading time from `time`.
    ///
    /// # Example
    /// ```
    /// use traceflake::{LockTraceIdGenerator, NodeId, SystemClock, TraceIdGenerator};
    ///
    /// let generator = LockTraceIdGenerator::new(NodeId::new(3).unwrap(), SystemClock::new().unwrap());
    /// let worker = generator.clone();
    ///
    /// let handle = std::thread::spawn(move || worker.next_id().unwrap());
    /// let a = generator.next_id().unwrap();
    /// let b = handle.join().unwrap();
    /// assert_ne!(a, b);
    /// ```
    pub fn new(node_id: NodeId, time: T) -> Self {
        Self::from_components(0, node_id, 0, time)
    }

    /// Creates a generator whose last-issued state is the given components.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` or `sequence` exceed their bit widths.
    pub fn from_components(timestamp: u64, node_id: NodeId, sequence: u64, time: T) -> Self {
        let id = TraceId::from_components(timestamp, node_id.into(), sequence);
        Self {
            state: Arc::new(Mutex::new(id)),
            node_id,
            time,
        }
    }

    /// The time source this generator reads.
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Attempts one step of the state machine.
    ///
    /// # Errors
    ///
    /// See [`TraceIdGenerator::poll_id`]. Additionally returns
    /// [`crate::Error::LockPoisoned`] if another thread panicked while
    /// holding the lock (std mutex only).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<Poll<TraceId>> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // Read under the lock: a `now` sampled before acquiring it could be
        // older than a timestamp another thread stored meanwhile.
        let now = self.time.current_millis();
        let poll = advance(*state, now)?;
        if let Poll::Ready { id } = poll {
            *state = id;
        }
        Ok(poll)
    }
}

// Leaves out the shared state so formatting never takes the lock.
impl<T> fmt::Debug for LockTraceIdGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockTraceIdGenerator")
            .field("node_id", &self.node_id)
            .finish_non_exhaustive()
    }
}

impl<T> TraceIdGenerator for LockTraceIdGenerator<T>
where
    T: TimeSource,
{
    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn poll_id(&self) -> Result<Poll<TraceId>> {
        self.poll_id()
    }
}
