use core::fmt;

/// A result type defaulting to the crate [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `traceflake` can emit.
///
/// Generation only ever fails with [`Error::ClockRegression`],
/// [`Error::TimestampOverflow`] or [`Error::LockPoisoned`]. It never returns
/// a duplicate or decreasing identifier instead of failing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The clock reported a time earlier than the last issued timestamp.
    ///
    /// Never retried internally.
    #[error("clock moved backwards, refusing to generate id for {behind_ms} milliseconds")]
    ClockRegression {
        /// How far the clock is behind the last issued timestamp.
        behind_ms: u64,
    },

    /// An explicitly supplied node id is outside `0..=1023`.
    #[error("node id {value} is out of range (expected 0..=1023)")]
    InvalidNodeId {
        /// The rejected value.
        value: i64,
    },

    /// A string is not a well-formed identifier.
    #[error("invalid identifier: {reason}")]
    InvalidIdentifier {
        /// Why the input was rejected.
        reason: ParseErrorKind,
    },

    /// The system clock is earlier than the configured epoch.
    #[error("system clock is before the configured epoch")]
    ClockBeforeEpoch,

    /// The clock is past the last millisecond the 41-bit timestamp can hold.
    #[error("timestamp {millis} exceeds the 41-bit timestamp range")]
    TimestampOverflow {
        /// Milliseconds since the epoch reported by the clock.
        millis: u64,
    },

    /// The shared generator's mutex was poisoned by a panicking thread.
    ///
    /// Never produced with the `parking-lot` feature, whose mutex does not
    /// poison.
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// The process-wide generator was already initialised.
    #[error("process generator already installed")]
    AlreadyInstalled,
}

/// The reason an identifier string failed to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// The input was empty.
    Empty,
    /// The input contained something other than ASCII digits.
    InvalidDigit,
    /// The value does not fit in 64 bits.
    Overflow,
    /// The value sets the reserved top bit.
    ReservedBitSet,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Empty => "empty string",
            Self::InvalidDigit => "contains a non-digit character",
            Self::Overflow => "does not fit in 64 bits",
            Self::ReservedBitSet => "reserved top bit is set",
        };
        f.write_str(msg)
    }
}

impl From<ParseErrorKind> for Error {
    fn from(reason: ParseErrorKind) -> Self {
        Self::InvalidIdentifier { reason }
    }
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
