use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{EPOCH, Error, Result, TimeSource};

/// A wall-clock time source offset from a fixed epoch.
///
/// Every call samples `SystemTime::now()`, so external clock adjustments
/// are visible to the generator.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch_millis: u64,
}

impl SystemClock {
    /// Creates a clock anchored to the default [`EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the system clock currently
    /// reads earlier than the epoch.
    pub fn new() -> Result<Self> {
        Self::with_epoch(EPOCH)
    }

    /// Creates a clock with `epoch` (a [`Duration`] since 1970-01-01 UTC) as
    /// the zero point for all timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the system clock currently
    /// reads earlier than `epoch`, including any `epoch` too large to count
    /// in `u64` milliseconds.
    ///
    /// # Example
    ///
    /// ```
    /// use core::time::Duration;
    /// use traceflake::{SystemClock, TimeSource};
    ///
    /// let clock = SystemClock::with_epoch(Duration::ZERO).unwrap();
    /// assert!(clock.current_millis() > 0);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let epoch_millis = u64::try_from(epoch.as_millis()).map_err(|_| Error::ClockBeforeEpoch)?;
        if unix_now_millis() < epoch_millis {
            return Err(Error::ClockBeforeEpoch);
        }
        Ok(Self { epoch_millis })
    }

    /// The configured epoch.
    pub const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }

    /// The configured epoch in Unix milliseconds.
    pub const fn epoch_millis(&self) -> u64 {
        self.epoch_millis
    }
}

impl TimeSource for SystemClock {
    /// Milliseconds since the configured epoch.
    ///
    /// If the system clock has been set before the epoch since this clock
    /// was built, this logs a warning and returns zero. A generator that has
    /// already issued an id then reports a clock regression.
    fn current_millis(&self) -> u64 {
        offset_from_epoch(unix_now_millis(), self.epoch_millis)
    }
}

fn offset_from_epoch(now: u64, epoch_millis: u64) -> u64 {
    match now.checked_sub(epoch_millis) {
        Some(offset) => offset,
        None => {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                now_ms = now,
                epoch_ms = epoch_millis,
                "system clock reads earlier than the epoch"
            );
            0
        }
    }
}

/// Milliseconds since the Unix epoch, or zero if the system clock reads
/// earlier than 1970.
pub fn unix_now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
