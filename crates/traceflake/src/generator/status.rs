/// The outcome of a single non-blocking generation step.
///
/// - [`Poll::Ready`] carries a freshly minted identifier.
/// - [`Poll::Pending`] means all 4096 sequence values of the current
///   millisecond are used. Wait roughly `yield_for` milliseconds (the clock
///   just has to move past the current tick) and poll again.
///
/// # Example
///
/// ```
/// use traceflake::{BasicTraceIdGenerator, NodeId, Poll, TimeSource, TraceId};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let node = NodeId::new(1).unwrap();
/// let generator =
///     BasicTraceIdGenerator::from_components(1, node, TraceId::max_sequence(), FixedTime);
/// match generator.poll_id().unwrap() {
///     Poll::Ready { id } => println!("ID: {id}"),
///     Poll::Pending { yield_for } => println!("Back off for {yield_for}ms"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<T> {
    /// A unique identifier was generated.
    Ready {
        /// The generated identifier.
        id: T,
    },
    /// The sequence is exhausted for the current millisecond.
    Pending {
        /// Milliseconds to wait before generating again.
        yield_for: u64,
    },
}

impl<T> Poll<T> {
    /// Returns `true` for [`Poll::Ready`].
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}
