pub mod app;
pub mod framing;
pub mod ipc;
pub mod serial_transport;
pub mod sync;

pub use app::*;
pub use framing::*;
pub use ipc::*;
pub use serial_transport::*;
pub use sync::*;
