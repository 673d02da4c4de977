pub mod allocation;
pub mod engine;
pub mod model;

pub use allocation::*;
pub use engine::*;
pub use model::*;
