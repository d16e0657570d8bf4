mod config;
mod error;
mod generator;
mod global;
mod id;
mod node;
mod rand;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::global::*;
pub use crate::id::*;
pub use crate::node::*;
pub use crate::rand::*;
pub use crate::time::*;
