//! # Safety contract
//!
//! Implementors of the traits in this module promise that:
//!
//! * every [`DevicePtr`](crate::hal::layouts::DevicePtr) returned by
//!   `alloc_impl` addresses at least the requested number of `f32` words
//!   and stays valid until passed to `free_impl`;
//! * commands issued from one thread execute in issue order, so a read that
//!   follows a write on the same buffer observes the write;
//! * `download_impl`, `reduce_impl` and `sync_impl` return only after every
//!   previously issued command touching their operands has completed.
//!
//! Callers of the `unsafe` methods promise that every handle passed in is
//! live, was produced by the same accelerator, and spans the element
//! count passed alongside it.

mod device;

pub use device::*;
