use crate::{NodeId, Poll, Result, TraceId};

/// A minimal interface for generating trace identifiers.
pub trait TraceIdGenerator {
    /// The node id stamped into every identifier.
    fn node_id(&self) -> NodeId;

    /// Performs one step of the state machine without blocking.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::ClockRegression`] if the clock reads earlier than
    ///   the last issued timestamp
    /// - [`crate::Error::TimestampOverflow`] if the clock is past the 41-bit
    ///   range
    /// - [`crate::Error::LockPoisoned`] for a poisoned shared generator
    fn poll_id(&self) -> Result<Poll<TraceId>>;

    /// Generates the next identifier, calling `f(yield_for)` each time the
    /// current millisecond is exhausted.
    ///
    /// # Errors
    ///
    /// Same as [`Self::poll_id`]. A regression observed while waiting is
    /// reported, not waited out.
    fn next_id_with(&self, mut f: impl FnMut(u64)) -> Result<TraceId> {
        loop {
            match self.poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_for } => f(yield_for),
            }
        }
    }

    /// Generates the next identifier, busy-waiting through sequence
    /// exhaustion.
    ///
    /// The wait re-samples the clock in a tight loop with no sleep. With a
    /// healthy clock it lasts at most about one millisecond; with a stalled
    /// clock it does not end.
    ///
    /// # Errors
    ///
    /// Same as [`Self::poll_id`].
    fn next_id(&self) -> Result<TraceId> {
        self.next_id_with(|_| core::hint::spin_loop())
    }
}
