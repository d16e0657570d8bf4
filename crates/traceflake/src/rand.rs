use rand::{Rng, rng};

/// Supplies the entropy for random node assignment.
///
/// # Example
/// ```
/// use traceflake::RandSource;
///
/// struct FixedRand;
/// impl RandSource for FixedRand {
///     fn rand(&self) -> u64 {
///         1234
///     }
/// }
///
/// let rng = FixedRand;
/// assert_eq!(rng.rand(), 1234);
/// ```
pub trait RandSource {
    /// Returns a uniformly distributed random integer.
    fn rand(&self) -> u64;
}

/// Draws from `rand::rng()` on every call.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn rand(&self) -> u64 {
        rng().random()
    }
}
