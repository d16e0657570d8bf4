mod node_id;
mod provider;
mod store;

pub use node_id::*;
pub use provider::*;
pub use store::*;
