use core::{fmt, time::Duration};

use crate::time::EPOCH;

/// A 64-bit Snowflake-style trace identifier.
///
/// - 1 bit reserved (always zero)
/// - 41 bits timestamp (ms since [`EPOCH`])
/// - 10 bits node ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21          12 11             0
///              +--------------+----------------+--------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | node ID (10) | sequence (12) |
///              +--------------+----------------+--------------+---------------+
///              |<----------- MSB --------- 64 bits --------- LSB ------------>|
/// ```
///
/// On the wire an identifier is always its base-10 rendering, see
/// [`fmt::Display`] and [`core::str::FromStr`].
///
/// # Example
///
/// ```
/// use traceflake::TraceId;
///
/// let id = TraceId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.node_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_string(), "4194312193");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraceId {
    id: u64,
}

impl TraceId {
    /// Bitmask for the 41-bit timestamp field. Occupies bits 22 through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for the 10-bit node ID field. Occupies bits 12 through 21.
    pub const NODE_ID_MASK: u64 = (1 << 10) - 1;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u64 = 22;

    /// Number of bits to shift the node ID to its position (bit 12).
    pub const NODE_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// The reserved top bit. Never set on a valid identifier.
    pub const RESERVED_MASK: u64 = 1 << 63;

    /// Packs the fields, masking each one to its width.
    pub const fn from(timestamp: u64, node_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let node_id = (node_id & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | node_id | sequence,
        }
    }

    /// Packs the fields into an identifier.
    ///
    /// # Panics
    ///
    /// Panics if any field exceeds its bit width.
    pub fn from_components(timestamp: u64, node_id: u64, sequence: u64) -> Self {
        assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        assert!(node_id <= Self::NODE_ID_MASK, "node_id overflow");
        assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from(timestamp, node_id, sequence)
    }

    /// Returns `(timestamp, node_id, sequence)`.
    pub const fn to_components(&self) -> (u64, u64, u64) {
        (self.timestamp(), self.node_id(), self.sequence())
    }

    /// Extracts the timestamp (ms since the epoch) from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the node ID from the packed ID.
    pub const fn node_id(&self) -> u64 {
        (self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Maximum value of the timestamp field.
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Maximum value of the node ID field.
    pub const fn max_node_id() -> u64 {
        Self::NODE_ID_MASK
    }

    /// Maximum value of the sequence field.
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// The raw 64-bit value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Wraps a raw value without validation. See [`Self::is_valid`].
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns `true` if the reserved top bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id & Self::RESERVED_MASK == 0
    }

    /// Returns `true` if the sequence can be incremented within the current
    /// millisecond.
    ///
    /// The increment is computed modulo 4096; an all-ones sequence plus one
    /// wraps to zero, which is how exhaustion is detected.
    pub const fn has_sequence_room(&self) -> bool {
        self.next_sequence() != 0
    }

    /// The next sequence value, modulo the sequence width.
    pub const fn next_sequence(&self) -> u64 {
        (self.sequence() + 1) & Self::SEQUENCE_MASK
    }

    /// Returns a new ID with the sequence incremented.
    pub fn increment_sequence(&self) -> Self {
        Self::from_components(self.timestamp(), self.node_id(), self.next_sequence())
    }

    /// Returns a new ID for a newer timestamp with the sequence reset to zero.
    pub fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.node_id(), 0)
    }

    /// Absolute Unix milliseconds at which this ID was minted, assuming the
    /// default [`EPOCH`].
    pub const fn unix_millis(&self) -> u64 {
        to_unix_millis(self.timestamp(), EPOCH)
    }

    /// Absolute Unix milliseconds at which this ID was minted, relative to a
    /// custom epoch.
    pub const fn unix_millis_with_epoch(&self, epoch: Duration) -> u64 {
        to_unix_millis(self.timestamp(), epoch)
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

/// Converts a timestamp offset back to absolute Unix milliseconds.
///
/// Saturates at `u64::MAX` for epochs that do not fit.
pub const fn to_unix_millis(timestamp_offset: u64, epoch: Duration) -> u64 {
    let epoch_millis = epoch.as_millis();
    if epoch_millis > u64::MAX as u128 {
        return u64::MAX;
    }
    timestamp_offset.saturating_add(epoch_millis as u64)
}

impl From<TraceId> for u64 {
    fn from(id: TraceId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceId")
            .field("id", &format_args!("{} (0x{:016x})", self.id, self.id))
            .field("timestamp", &self.timestamp())
            .field("node_id", &self.node_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
