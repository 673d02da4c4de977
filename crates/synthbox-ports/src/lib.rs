pub mod catalog;
pub mod serial;
pub mod settings;
pub mod storage;
pub mod types;

pub use catalog::*;
pub use serial::*;
pub use settings::*;
pub use storage::*;
pub use types::*;
