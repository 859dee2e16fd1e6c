mod coherence;
mod device;
mod handle;
mod kernel;
mod shape;
mod staging;

pub use coherence::*;
pub use device::*;
pub use handle::*;
pub use kernel::*;
pub use shape::*;
pub use staging::*;
