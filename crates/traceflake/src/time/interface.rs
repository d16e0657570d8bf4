use core::time::Duration;

/// Default epoch: Wednesday, January 1, 2020 00:00:00 UTC
pub const EPOCH: Duration = Duration::from_millis(1_577_836_800_000);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests.
///
/// The unit is **milliseconds** relative to the source's epoch.
///
/// A reading never goes below zero. A wall clock that has moved before its
/// epoch reads `0` (see [`SystemClock`](crate::SystemClock)), and a
/// generator that has already issued an id reports that as a regression.
///
/// # Example
///
/// ```
/// use traceflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
