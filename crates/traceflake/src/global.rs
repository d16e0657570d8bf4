//! Process-wide identifier facade.
//!
//! The facade owns one [`LockTraceIdGenerator`] over the system clock. It is
//! built from [`GeneratorConfig::default`] on first use unless one has been
//! [`install`]ed beforehand.
//!
//! ```
//! use traceflake::{extract_node_id, generate_identifier, validate_identifier};
//!
//! let id = generate_identifier().unwrap();
//! assert!(validate_identifier(&id));
//! assert!(extract_node_id(&id).unwrap().get() <= 1023);
//! ```

use core::time::Duration;
use std::sync::OnceLock;

use crate::{
    EPOCH, Error, GeneratorConfig, LockTraceIdGenerator, NodeId, Result, SystemClock, TraceId,
    TraceIdGenerator, is_well_formed,
};

static SHARED: OnceLock<Result<LockTraceIdGenerator<SystemClock>>> = OnceLock::new();

fn shared() -> Result<&'static LockTraceIdGenerator<SystemClock>> {
    SHARED
        .get_or_init(|| GeneratorConfig::default().build_shared())
        .as_ref()
        .map_err(Clone::clone)
}

fn installed_epoch() -> Duration {
    match SHARED.get() {
        Some(Ok(generator)) => generator.time().epoch(),
        _ => EPOCH,
    }
}

/// Makes `generator` the process-wide generator.
///
/// # Errors
///
/// Returns [`Error::AlreadyInstalled`] if a generator was installed earlier
/// or the default one has already been built by a previous call.
pub fn install(generator: LockTraceIdGenerator<SystemClock>) -> Result<()> {
    #[cfg(feature = "tracing")]
    let node_id = generator.node_id();
    SHARED
        .set(Ok(generator))
        .map_err(|_| Error::AlreadyInstalled)?;
    #[cfg(feature = "tracing")]
    tracing::info!(node_id = node_id.get(), "installed process-wide generator");
    Ok(())
}

/// Returns a fresh identifier as a decimal string.
///
/// # Errors
///
/// - [`Error::ClockRegression`] if the clock moved backwards
/// - [`Error::TimestampOverflow`] if the clock is past the 41-bit range
/// - [`Error::ClockBeforeEpoch`] if the default generator could not be built
/// - [`Error::LockPoisoned`] if a thread panicked while holding the
///   generator
pub fn generate_identifier() -> Result<String> {
    let id = shared()?.next_id()?;
    Ok(id.to_string())
}

/// True if `id` is a well-formed identifier.
pub fn validate_identifier(id: &str) -> bool {
    is_well_formed(id)
}

/// The Unix time in milliseconds at which `id` was minted.
///
/// Uses the epoch of the installed generator, or [`EPOCH`] if none has been
/// built yet.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] if `id` is malformed.
pub fn extract_timestamp(id: &str) -> Result<u64> {
    let id: TraceId = id.parse()?;
    Ok(id.unix_millis_with_epoch(installed_epoch()))
}

/// The node id bits of a decimal identifier.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] if `id` is malformed.
pub fn extract_node_id(id: &str) -> Result<NodeId> {
    let id: TraceId = id.parse()?;
    Ok(NodeId::from_masked(id.node_id()))
}

/// The per-millisecond sequence of a decimal identifier.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] if `id` is malformed.
pub fn extract_sequence(id: &str) -> Result<u64> {
    let id: TraceId = id.parse()?;
    Ok(id.sequence())
}
