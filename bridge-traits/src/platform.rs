//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Native targets require `Send + Sync` so bridge implementations can be shared
//! across tokio tasks. WebAssembly hosts run on a single thread and cannot
//! satisfy those bounds, so the helpers below make them conditional.

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}
