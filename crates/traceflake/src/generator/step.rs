use core::cmp::Ordering;

use crate::{Error, Poll, Result, TraceId};

/// Computes the state that follows `state` when the clock reads `now`.
///
/// `Poll::Ready` carries both the identifier to hand out and the new state;
/// the caller stores it. `Poll::Pending` and errors leave the state as is.
#[inline]
pub(crate) fn advance(state: TraceId, now: u64) -> Result<Poll<TraceId>> {
    let last_ts = state.timestamp();
    match now.cmp(&last_ts) {
        Ordering::Equal => {
            if state.has_sequence_room() {
                Ok(Poll::Ready {
                    id: state.increment_sequence(),
                })
            } else {
                Ok(Poll::Pending { yield_for: 1 })
            }
        }
        Ordering::Greater => {
            if now > TraceId::max_timestamp() {
                return Err(cold_timestamp_overflow(now));
            }
            Ok(Poll::Ready {
                id: state.rollover_to_timestamp(now),
            })
        }
        Ordering::Less => Err(cold_clock_behind(now, last_ts)),
    }
}

#[cold]
#[inline(never)]
fn cold_clock_behind(now: u64, last_ts: u64) -> Error {
    let behind_ms = last_ts - now;
    #[cfg(feature = "tracing")]
    tracing::warn!(behind_ms, last_ts, now, "clock moved backwards");
    Error::ClockRegression { behind_ms }
}

#[cold]
#[inline(never)]
fn cold_timestamp_overflow(millis: u64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::error!(millis, "clock is past the 41-bit timestamp range");
    Error::TimestampOverflow { millis }
}
