mod types;
pub mod wire;

pub use types::*;
