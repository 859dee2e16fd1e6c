/// Emulated accelerator with its own memory space and command queue.
pub mod sim;
