//! Command/response link to a display controller board: device
//! enumeration, connection management and flash region access.
//!
//! [`DeviceLink`] is the boundary the rest of the workspace codes against;
//! [`LoopbackLink`] serves it from an in-memory flash image.

mod error;
mod link;
mod loopback;
pub mod r4;

pub use error::*;
pub use link::*;
pub use loopback::*;
