//! Shared helpers for the integration tests.

#![allow(dead_code)]

use glam::Vec3;
use tiled_lighting::forward_plus::{Slot, TileGrid, TILE_EDGE};
use tiled_lighting::scene::{Camera, CameraMatrices, Projection};

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn perspective_camera(position: Vec3, target: Vec3) -> CameraMatrices {
    Camera::new(position, target)
        .with_projection(Projection::perspective(
            60.0,
            WIDTH as f32 / HEIGHT as f32,
            0.1,
            200.0,
        ))
        .matrices()
}

/// View and projection both map onto pixels: view space (x, y) lands on
/// pixel (x, y) with y growing downwards.
pub fn pixel_camera() -> CameraMatrices {
    Camera::new(Vec3::ZERO, Vec3::NEG_Z)
        .with_projection(Projection::pixel_aligned(
            WIDTH as f32,
            HEIGHT as f32,
            0.1,
            100.0,
        ))
        .matrices()
}

/// A handful of camera poses around the origin.
pub fn camera_poses() -> Vec<CameraMatrices> {
    vec![
        perspective_camera(Vec3::new(0.0, 0.0, 15.0), Vec3::ZERO),
        perspective_camera(Vec3::new(12.0, 4.0, 9.0), Vec3::ZERO),
        perspective_camera(Vec3::new(-10.0, -6.0, -8.0), Vec3::new(1.0, 0.0, 0.0)),
        perspective_camera(Vec3::new(0.5, 20.0, 0.5), Vec3::ZERO),
    ]
}

/// Deterministic light positions on a lattice plus a few off-lattice ones.
pub fn light_positions() -> Vec<Vec3> {
    let mut positions = Vec::new();
    for x in [-9.0, -4.5, 0.0, 4.5, 9.0] {
        for y in [-6.0, 0.0, 6.0] {
            for z in [-9.0, -3.0, 3.0, 9.0] {
                positions.push(Vec3::new(x, y, z));
            }
        }
    }
    positions.extend([
        Vec3::new(0.3, -0.7, 13.9),
        Vec3::new(11.7, 3.9, 8.8),
        Vec3::new(-2.2, 1.1, 0.4),
    ]);
    positions
}

/// Points on the sphere surface (slightly inside) plus the center.
pub fn sphere_samples(center: Vec3, radius: f32) -> Vec<Vec3> {
    let r = radius * 0.999;
    let mut samples = vec![center];
    for ix in -1..=1 {
        for iy in -1..=1 {
            for iz in -1..=1 {
                let dir = Vec3::new(ix as f32, iy as f32, iz as f32);
                if dir != Vec3::ZERO {
                    samples.push(center + dir.normalize() * r);
                }
            }
        }
    }
    for step in 0..24 {
        let angle = step as f32 * std::f32::consts::TAU / 24.0;
        let (s, c) = angle.sin_cos();
        samples.push(center + Vec3::new(c, s, 0.0) * r);
        samples.push(center + Vec3::new(c, 0.0, s) * r);
        samples.push(center + Vec3::new(0.0, c, s) * r);
    }
    samples
}

/// Tile a world point would be shaded in, if it is visible at all.
pub fn visible_tile(camera: &CameraMatrices, point: Vec3) -> Option<(u32, u32)> {
    let clip = camera.view_projection * point.extend(1.0);
    if clip.w <= 1e-4 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }
    let x = (ndc.x + 1.0) * 0.5 * WIDTH as f32;
    let y = (1.0 - ndc.y) * 0.5 * HEIGHT as f32;
    if x < 0.0 || y < 0.0 || x >= WIDTH as f32 || y >= HEIGHT as f32 {
        return None;
    }
    Some((x as u32 / TILE_EDGE, y as u32 / TILE_EDGE))
}

pub fn marked_tiles(grid: &TileGrid, slot: Slot) -> Vec<(u32, u32)> {
    let mut tiles = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            if grid.tile(col, row).is_some_and(|mask| mask.test(slot)) {
                tiles.push((col, row));
            }
        }
    }
    tiles
}

/// Decode a tile mask the way the fragment shader does.
pub fn shader_mask(bitmask_bytes: &[u8], cols: u32, col: u32, row: u32) -> u32 {
    let offset = ((row * cols + col) * 4) as usize;
    let texel = &bitmask_bytes[offset..offset + 4];
    (texel[0] as u32) << 24 | (texel[1] as u32) << 16 | (texel[2] as u32) << 8 | texel[3] as u32
}
