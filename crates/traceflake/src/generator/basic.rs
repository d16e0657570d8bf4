use core::{cell::Cell, fmt};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    NodeId, Poll, Result, TraceId, TraceIdGenerator,
    generator::step::advance,
    time::TimeSource,
};

/// A non-concurrent trace ID generator for single-threaded use.
///
/// The state lives in a [`Cell`], so this type is `!Sync` and the compiler
/// refuses to share one instance between threads. This matches the usual
/// deployment: one generator per process, invoked synchronously.
///
/// ## Features
/// - ❌ Not thread-safe
/// - ✅ No locking on the hot path
///
/// ## See Also
/// - [`LockTraceIdGenerator`] for an instance shared across threads
///
/// [`LockTraceIdGenerator`]: crate::LockTraceIdGenerator
pub struct BasicTraceIdGenerator<T>
where
    T: TimeSource,
{
    state: Cell<TraceId>,
    time: T,
}

impl<T> BasicTraceIdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new generator for `node_id`, reading time from `time`.
    ///
    /// The last-used timestamp and sequence start at zero.
    ///
    /// # Example
    /// ```
    /// use traceflake::{BasicTraceIdGenerator, NodeId, SystemClock, TraceIdGenerator};
    ///
    /// let generator = BasicTraceIdGenerator::new(NodeId::new(7).unwrap(), SystemClock::new().unwrap());
    ///
    /// let id = generator.next_id().unwrap();
    /// assert_eq!(id.node_id(), 7);
    /// ```
    pub fn new(node_id: NodeId, time: T) -> Self {
        Self::from_components(0, node_id, 0, time)
    }

    /// Creates a generator whose last-issued state is the given components.
    ///
    /// Useful to restore state, or in tests to start at a chosen point of
    /// the state machine. Prefer [`Self::new`] otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` or `sequence` exceed their bit widths.
    pub fn from_components(timestamp: u64, node_id: NodeId, sequence: u64, time: T) -> Self {
        let id = TraceId::from_components(timestamp, node_id.into(), sequence);
        Self {
            state: Cell::new(id),
            time,
        }
    }

    /// The time source this generator reads.
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Attempts one step of the state machine.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: a new ID is available
    /// - `Ok(Poll::Pending { yield_for })`: the current millisecond is
    ///   exhausted
    /// - `Err(_)`: clock regression or timestamp overflow
    ///
    /// # Errors
    ///
    /// See [`TraceIdGenerator::poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<Poll<TraceId>> {
        let now = self.time.current_millis();
        let poll = advance(self.state.get(), now)?;
        if let Poll::Ready { id } = poll {
            self.state.set(id);
        }
        Ok(poll)
    }
}

impl<T> fmt::Debug for BasicTraceIdGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicTraceIdGenerator")
            .field("last", &self.state.get())
            .finish_non_exhaustive()
    }
}

impl<T> TraceIdGenerator for BasicTraceIdGenerator<T>
where
    T: TimeSource,
{
    fn node_id(&self) -> NodeId {
        NodeId::from_masked(self.state.get().node_id())
    }

    fn poll_id(&self) -> Result<Poll<TraceId>> {
        self.poll_id()
    }
}
