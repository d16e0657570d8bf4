use core::fmt;

use crate::{Error, RandSource, Result, TraceId};

/// A validated node identifier in `0..=1023`.
///
/// Every identifier minted by a generator carries its node id in bits 12
/// through 21, so two generators with distinct node ids never collide.
///
/// ```
/// use traceflake::{Error, NodeId};
///
/// assert_eq!(NodeId::new(1023).unwrap().get(), 1023);
/// assert_eq!(NodeId::new(1024), Err(Error::InvalidNodeId { value: 1024 }));
/// assert_eq!(NodeId::new(-1), Err(Error::InvalidNodeId { value: -1 }));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u16);

impl NodeId {
    /// The largest valid node id.
    pub const MAX: u16 = TraceId::NODE_ID_MASK as u16;

    /// Validates `value` as a node id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `value` is outside `0..=1023`.
    /// Out-of-range values are rejected, never clamped.
    pub const fn new(value: i64) -> Result<Self> {
        if value < 0 || value > Self::MAX as i64 {
            return Err(Error::InvalidNodeId { value });
        }
        Ok(Self(value as u16))
    }

    /// Draws a uniformly random node id.
    ///
    /// The range is a power of two, so masking keeps the distribution
    /// uniform.
    pub fn random(rng: &impl RandSource) -> Self {
        Self::from_masked(rng.rand())
    }

    pub(crate) const fn from_masked(raw: u64) -> Self {
        Self((raw & TraceId::NODE_ID_MASK) as u16)
    }

    /// The node id as an integer.
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for NodeId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<u64> for NodeId {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<NodeId> for u64 {
    fn from(id: NodeId) -> Self {
        u64::from(id.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
