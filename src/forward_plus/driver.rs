//! Per-frame tiled lighting state

#[cfg(feature = "ecs")]
use bevy_ecs::prelude::*;

use super::culler::{CullStats, TileCuller};
use super::packer::{LightDataPacker, LightDataTexture};
use super::projector::BoundsMode;
use super::registry::LightRegistry;
use super::tile_grid::{TileGrid, TileMeta};
use crate::scene::CameraMatrices;

/// Configuration for [`TiledLighting`]
#[derive(Debug, Clone)]
pub struct TiledLightingConfig {
    /// Initial render target width
    pub width: u32,
    /// Initial render target height
    pub height: u32,
    /// Screen bounds approximation used for culling
    pub bounds_mode: BoundsMode,
}

impl Default for TiledLightingConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            bounds_mode: BoundsMode::CubeCorners,
        }
    }
}

/// Owns everything the culling pass reads and writes.
///
/// Call [`prepare_frame`](Self::prepare_frame) once per frame before the
/// draw that samples the textures, and [`resize`](Self::resize) whenever
/// the render target changes size. Each frame is recomputed from scratch.
#[cfg_attr(feature = "ecs", derive(Resource))]
#[derive(Debug, Clone)]
pub struct TiledLighting {
    grid: TileGrid,
    lights: LightRegistry,
    culler: TileCuller,
    packer: LightDataPacker,
    light_data: LightDataTexture,
    last_stats: CullStats,
    frame_index: u64,
}

impl Default for TiledLighting {
    fn default() -> Self {
        Self::new(&TiledLightingConfig::default())
    }
}

impl TiledLighting {
    pub fn new(config: &TiledLightingConfig) -> Self {
        log::debug!(
            "Creating tiled lighting for {}x{} ({:?} bounds)",
            config.width,
            config.height,
            config.bounds_mode
        );
        Self {
            grid: TileGrid::new(config.width, config.height),
            lights: LightRegistry::new(),
            culler: TileCuller::new(config.bounds_mode),
            packer: LightDataPacker::new(),
            light_data: LightDataTexture::default(),
            last_stats: CullStats::default(),
            frame_index: 0,
        }
    }

    /// Re-derive the tile grid; the next frame's `tile_meta` follows.
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = self.grid.viewport();
        if viewport.width == width && viewport.height == height {
            return;
        }
        self.grid.resize(width, height);
    }

    /// Cull all lights into the tile grid and repack the light table.
    pub fn prepare_frame(&mut self, camera: &CameraMatrices) -> CullStats {
        self.last_stats = self.culler.cull(&mut self.grid, camera, &self.lights);
        self.packer
            .pack_into(&mut self.light_data, &self.lights, camera);
        self.frame_index += 1;
        self.last_stats
    }

    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightRegistry {
        &mut self.lights
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn light_data(&self) -> &LightDataTexture {
        &self.light_data
    }

    pub fn tile_meta(&self) -> TileMeta {
        self.grid.tile_meta()
    }

    pub fn bounds_mode(&self) -> BoundsMode {
        self.culler.projector().mode()
    }

    pub fn last_stats(&self) -> CullStats {
        self.last_stats
    }

    /// Number of completed [`prepare_frame`](Self::prepare_frame) calls.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
