//! Point light description

#[cfg(feature = "ecs")]
use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::error::LightingError;

/// Point light
///
/// `radius` is both the culling distance and the attenuation cutoff: the
/// light contributes nothing beyond it. A zero radius light is inert.
#[cfg_attr(feature = "ecs", derive(Component))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World space position
    pub position: Vec3,
    pub radius: f32,
    /// Linear RGB, intensity premultiplied
    pub color: Vec3,
    /// Falloff exponent towards `radius`
    pub decay: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: 10.0,
            color: Vec3::ONE,
            decay: 2.0,
        }
    }
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            color,
            ..Default::default()
        }
    }

    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.color *= intensity;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), LightingError> {
        let reason = if !self.position.is_finite() {
            "position is not finite"
        } else if !self.radius.is_finite() || self.radius < 0.0 {
            "radius must be finite and non-negative"
        } else if !self.color.is_finite() {
            "color is not finite"
        } else if !self.decay.is_finite() || self.decay < 0.0 {
            "decay must be finite and non-negative"
        } else {
            return Ok(());
        };
        Err(LightingError::InvalidLight {
            reason: reason.to_string(),
        })
    }
}
