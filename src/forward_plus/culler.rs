//! Per-frame tile light culling

use super::projector::{BoundsMode, ScreenBoundsProjector, ScreenRect};
use super::registry::{LightRegistry, Slot};
use super::tile_grid::{TileGrid, TILE_EDGE};
use crate::scene::CameraMatrices;

/// Outcome of one culling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    /// Lights that marked at least one tile
    pub visible: u32,
    pub off_screen: u32,
    /// Lights skipped because their projection was not finite
    pub degenerate: u32,
    /// Total (tile, light) pairs written
    pub tiles_marked: u32,
}

/// Writes every registered light into the tile masks it may touch.
///
/// Coverage is conservative: a tile partially overlapped by a light's screen
/// rectangle is marked. Cost is proportional to the tiles each light
/// overlaps, not to the size of the grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileCuller {
    projector: ScreenBoundsProjector,
}

impl TileCuller {
    pub fn new(mode: BoundsMode) -> Self {
        Self {
            projector: ScreenBoundsProjector::new(mode),
        }
    }

    pub fn projector(&self) -> &ScreenBoundsProjector {
        &self.projector
    }

    /// Rebuild all tile masks for the current camera and light state.
    pub fn cull(
        &self,
        grid: &mut TileGrid,
        camera: &CameraMatrices,
        lights: &LightRegistry,
    ) -> CullStats {
        grid.clear();

        let viewport = grid.viewport();
        let mut stats = CullStats::default();

        for (slot, light) in lights.iter() {
            let rect = self
                .projector
                .project(camera, viewport, light.position, light.radius);

            if !rect.is_finite() {
                log::trace!("Light in slot {} has a degenerate projection, skipped", slot.index());
                stats.degenerate += 1;
                continue;
            }
            if rect.is_off_screen(viewport) {
                stats.off_screen += 1;
                continue;
            }

            let marked = Self::rasterize(grid, &rect, slot);
            if marked > 0 {
                stats.visible += 1;
            } else {
                stats.off_screen += 1;
            }
            stats.tiles_marked += marked;
        }

        log::trace!(
            "Culled {} lights into {}x{} tiles: {:?}",
            lights.len(),
            grid.cols(),
            grid.rows(),
            stats
        );
        stats
    }

    /// Mark `slot` in every tile overlapped by `rect`, returning how many
    /// tiles were marked.
    ///
    /// The rectangle is clamped to the viewport. Column range is
    /// `floor(min_x / 32) .. ceil(max_x / 32)` (upper bound exclusive, at
    /// least one tile), rows likewise.
    pub fn rasterize(grid: &mut TileGrid, rect: &ScreenRect, slot: Slot) -> u32 {
        let viewport = grid.viewport();
        if grid.is_empty() || !rect.is_finite() || rect.is_off_screen(viewport) {
            return 0;
        }

        let rect = rect.clamped(viewport);
        let (col_start, col_end) = tile_span(rect.min_x, rect.max_x, grid.cols());
        let (row_start, row_end) = tile_span(rect.min_y, rect.max_y, grid.rows());

        for row in row_start..row_end {
            for col in col_start..col_end {
                grid.mark_tile(col, row, slot);
            }
        }
        (col_end - col_start) * (row_end - row_start)
    }
}

fn tile_span(min: f32, max: f32, count: u32) -> (u32, u32) {
    let edge = TILE_EDGE as f32;
    let start = ((min / edge).floor() as u32).min(count.saturating_sub(1));
    let end = ((max / edge).ceil() as u32).max(start + 1).min(count);
    (start, end)
}
