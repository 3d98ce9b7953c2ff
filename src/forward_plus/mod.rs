//! Tiled (Forward+) light culling
//!
//! The screen is split into [`TILE_EDGE`]-pixel tiles. Every frame each
//! registered light is projected to a screen rectangle and its bit is set in
//! every tile the rectangle touches. The fragment shader then only evaluates
//! the lights whose bits are set in its tile.
//!
//! ```text
//! LightRegistry ──► TileCuller ──► TileGrid ─────┐
//!       │                                        ├──► LightingTextures ──► GPU
//!       └────────► LightDataPacker ──► LightDataTexture
//! ```

mod bitset;
mod culler;
mod driver;
mod packer;
mod projector;
mod registry;
mod textures;
mod tile_grid;

pub use bitset::Bitset32;
pub use culler::{CullStats, TileCuller};
pub use driver::{TiledLighting, TiledLightingConfig};
pub use packer::{LightDataPacker, LightDataTexture, LIGHT_DATA_HEIGHT, LIGHT_DATA_WIDTH};
pub use projector::{BoundsMode, ScreenBoundsProjector, ScreenRect};
pub use registry::{LightHandle, LightRegistry, Slot, MAX_LIGHTS};
pub use textures::LightingTextures;
pub use tile_grid::{TileGrid, TileMeta, Viewport, TILE_EDGE};
