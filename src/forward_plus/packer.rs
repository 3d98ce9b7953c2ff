//! Light parameters packed for the fragment shader

use glam::Vec4;

use super::registry::{LightRegistry, Slot, MAX_LIGHTS};
use crate::scene::CameraMatrices;

/// Texture width, one column per light slot.
pub const LIGHT_DATA_WIDTH: u32 = MAX_LIGHTS as u32;
/// Row 0 holds position and radius, row 1 color and decay.
pub const LIGHT_DATA_HEIGHT: u32 = 2;

const TEXEL_COUNT: usize = MAX_LIGHTS * LIGHT_DATA_HEIGHT as usize;

/// `32 × 2` RGBA32F light table.
///
/// Column `i` always describes the light whose bit is `i` in the tile masks.
/// A column with zero radius is an empty slot.
#[derive(Debug, Clone, PartialEq)]
pub struct LightDataTexture {
    texels: [Vec4; TEXEL_COUNT],
}

impl Default for LightDataTexture {
    fn default() -> Self {
        Self {
            texels: [Vec4::ZERO; TEXEL_COUNT],
        }
    }
}

impl LightDataTexture {
    /// View-space position and radius of `slot`.
    pub fn position_radius(&self, slot: Slot) -> Vec4 {
        self.texels[slot.index()]
    }

    /// Color and decay of `slot`.
    pub fn color_decay(&self, slot: Slot) -> Vec4 {
        self.texels[MAX_LIGHTS + slot.index()]
    }

    pub fn is_slot_empty(&self, slot: Slot) -> bool {
        self.position_radius(slot).w == 0.0
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels[..]
    }

    /// Row-major texel bytes ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels[..])
    }

    pub fn clear(&mut self) {
        self.texels.fill(Vec4::ZERO);
    }
}

/// Serializes the light registry into a [`LightDataTexture`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LightDataPacker;

impl LightDataPacker {
    pub fn new() -> Self {
        Self
    }

    pub fn pack(&self, lights: &LightRegistry, camera: &CameraMatrices) -> LightDataTexture {
        let mut texture = LightDataTexture::default();
        self.pack_into(&mut texture, lights, camera);
        texture
    }

    /// Rewrite `texture` in place; slots without a light are zeroed.
    pub fn pack_into(
        &self,
        texture: &mut LightDataTexture,
        lights: &LightRegistry,
        camera: &CameraMatrices,
    ) {
        texture.clear();
        for (slot, light) in lights.iter() {
            let view_position = camera.view.transform_point3(light.position);
            texture.texels[slot.index()] = view_position.extend(light.radius);
            texture.texels[MAX_LIGHTS + slot.index()] = light.color.extend(light.decay);
        }
    }
}
