//! Screen tile grid and its per-tile light masks

use bytemuck::{Pod, Zeroable};

use super::bitset::Bitset32;
use super::registry::Slot;

/// Edge length of a square screen tile, in pixels.
pub const TILE_EDGE: u32 = 32;

/// Render target size in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// `tileMeta` uniform: viewport size plus the half-tile UV bias that moves a
/// tile index onto its texel center.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct TileMeta {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub half_tile_u: f32,
    pub half_tile_v: f32,
}

impl TileMeta {
    pub fn to_array(self) -> [f32; 4] {
        [
            self.viewport_width,
            self.viewport_height,
            self.half_tile_u,
            self.half_tile_v,
        ]
    }
}

/// Grid of [`TILE_EDGE`]-sized tiles covering the viewport.
///
/// Each tile owns one [`Bitset32`]; the whole buffer is uploaded verbatim as
/// a `cols × rows` RGBA8 texture.
#[derive(Debug, Clone)]
pub struct TileGrid {
    viewport: Viewport,
    cols: u32,
    rows: u32,
    masks: Vec<Bitset32>,
    generation: u64,
}

impl TileGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let mut grid = Self {
            viewport: Viewport::default(),
            cols: 0,
            rows: 0,
            masks: Vec::new(),
            generation: 0,
        };
        grid.resize(width, height);
        grid
    }

    /// Re-derive the tile dimensions for a new render target size.
    ///
    /// The mask buffer is always replaced by a fresh zeroed allocation so no
    /// mask laid out for the old dimensions can be read with the new ones.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.cols = width.div_ceil(TILE_EDGE);
        self.rows = height.div_ceil(TILE_EDGE);
        self.masks = vec![Bitset32::EMPTY; self.tile_count()];
        self.generation += 1;

        log::debug!(
            "Tile grid resized to {}x{} px ({}x{} tiles)",
            width,
            height,
            self.cols,
            self.rows
        );
    }

    /// Zero every tile mask.
    pub fn clear(&mut self) {
        self.masks.fill(Bitset32::EMPTY);
    }

    /// Set `slot` in the mask of tile (`col`, `row`); out of range tiles are
    /// ignored.
    #[inline]
    pub fn mark_tile(&mut self, col: u32, row: u32, slot: Slot) {
        if col >= self.cols || row >= self.rows {
            return;
        }
        let index = (row * self.cols + col) as usize;
        self.masks[index].set(slot);
    }

    pub fn tile(&self, col: u32, row: u32) -> Option<Bitset32> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(self.masks[(row * self.cols + col) as usize])
    }

    pub fn masks(&self) -> &[Bitset32] {
        &self.masks
    }

    /// Raw bitmask bytes, `cols * rows * 4` long.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.masks)
    }

    pub fn tile_meta(&self) -> TileMeta {
        let half = |count: u32| if count == 0 { 0.0 } else { 0.5 / count as f32 };
        TileMeta {
            viewport_width: self.viewport.width as f32,
            viewport_height: self.viewport.height as f32,
            half_tile_u: half(self.cols),
            half_tile_v: half(self.rows),
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn tile_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Incremented by every [`resize`](Self::resize).
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
