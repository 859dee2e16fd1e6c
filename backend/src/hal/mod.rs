/// Traits shared by every vector kind.
pub mod api;

/// Safe [`layouts::Device`] methods forwarding to the [`oep`] traits.
///
/// This module contains no user-facing logic; it validates handles and
/// lengths, counts transfers, and crosses into the unsafe extension points.
pub mod delegates;

/// Handles, coherence state, staging buffers, shapes and the device context.
pub mod layouts;

/// Open Extension Points: `unsafe` traits an accelerator backend implements.
pub mod oep;
