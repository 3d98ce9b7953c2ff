//! Backend abstraction layer
//!
//! Provides the upload seam the lighting textures are written through, an
//! in-memory implementation for tests and a wgpu implementation.

pub mod dummy;
pub mod traits;
pub mod types;

#[cfg(feature = "wgpu-backend")]
pub mod wgpu_backend;

pub use dummy::DummyBackend;
pub use traits::*;
pub use types::*;

#[cfg(feature = "wgpu-backend")]
pub use wgpu_backend::WgpuBackend;
