mod resolver;
pub mod types;

pub use types::{HxScope, WeakScope};
