//! Built-in base pipelines.
//!
//! Both share the same vertex stage (camera at set 0, object at set 1
//! binding 0) and keep their material uniforms at set 1 binding 1, leaving
//! [`DEFAULT_LIGHTING_BIND_GROUP`](super::DEFAULT_LIGHTING_BIND_GROUP) free
//! for the injected lighting resources.
//!
//! | Pipeline | Routine | Accumulator |
//! |----------|---------|-------------|
//! | `phong` | `phong_point_light` | `radiance` |
//! | `toon` | `toon_point_light` | `toon_light` |

use super::BasePipeline;

const PHONG_SOURCE: &str = include_str!("../../shaders/base/phong.glsl");
const TOON_SOURCE: &str = include_str!("../../shaders/base/toon.glsl");

/// Blinn-Phong shading with windowed distance falloff.
pub fn phong() -> BasePipeline {
    BasePipeline::new("phong", PHONG_SOURCE).with_light_accumulation("phong_point_light", "radiance")
}

/// Banded diffuse shading.
pub fn toon() -> BasePipeline {
    BasePipeline::new("toon", TOON_SOURCE).with_light_accumulation("toon_point_light", "toon_light")
}
