//! Tiled Lighting - Forward+ light culling for a fixed 32 light budget
//!
//! Each frame the host registers point lights, hands over the camera and
//! gets back two small textures: a per-tile light bitmask and a light
//! parameter table. A shader injection step adds the matching per-tile light
//! loop to any shading pipeline that exposes the extension point.
//!
//! # Features
//! - `wgpu-backend` (default): upload through a wgpu device and queue
//! - `ecs` (default): bevy_ecs components, resources and sync systems
//!
//! # Example
//!
//! ```ignore
//! use tiled_lighting::prelude::*;
//!
//! let mut lighting = TiledLighting::new(&TiledLightingConfig::default());
//! lighting.lights_mut().register(PointLight::new(Vec3::ZERO, Vec3::ONE, 5.0))?;
//!
//! let mut backend = DummyBackend::new();
//! let mut textures = LightingTextures::new(&mut backend)?;
//! lighting.prepare_frame(&camera.matrices());
//! textures.upload(&mut backend, &lighting)?;
//! ```

pub mod backend;
pub mod error;
pub mod forward_plus;
pub mod scene;
pub mod shader;

#[cfg(feature = "ecs")]
pub mod ecs;

pub use error::{CapacityError, ConfigurationError, LightingError};
pub use forward_plus::{LightingTextures, TiledLighting, TiledLightingConfig};

#[cfg(feature = "wgpu-backend")]
pub use backend::wgpu_backend::WgpuBackend;

/// Commonly used types
pub mod prelude {
    pub use crate::backend::{DummyBackend, UploadBackend};
    pub use crate::error::{CapacityError, ConfigurationError, LightingError};
    pub use crate::forward_plus::{
        BoundsMode, CullStats, LightHandle, LightRegistry, LightingTextures, TiledLighting,
        TiledLightingConfig, MAX_LIGHTS, TILE_EDGE,
    };
    pub use crate::scene::{Camera, CameraMatrices, PointLight, Projection};
    pub use crate::shader::{library, BasePipeline, ShadingPipelineBuilder, TiledPipeline};
    pub use glam::{Mat4, Vec3, Vec4};
}
