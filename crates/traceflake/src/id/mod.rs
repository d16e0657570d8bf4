mod parse;
mod trace_id;

pub use parse::*;
pub use trace_id::*;
