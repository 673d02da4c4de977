pub mod codec;
pub mod messages;

pub use codec::*;
pub use messages::*;
