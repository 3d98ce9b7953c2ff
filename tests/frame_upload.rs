//! End-to-end frame tests against the in-memory upload backend.
//!
//! What lands in the backend is decoded the same way the injected fragment
//! shader decodes it.

mod common;

use glam::{Vec3, Vec4};

use common::{init_logging, pixel_camera, shader_mask, HEIGHT, WIDTH};
use tiled_lighting::backend::DummyBackend;
use tiled_lighting::forward_plus::{
    LightingTextures, TiledLighting, TiledLightingConfig, LIGHT_DATA_WIDTH, MAX_LIGHTS,
};
use tiled_lighting::scene::PointLight;

fn setup() -> (DummyBackend, LightingTextures, TiledLighting) {
    init_logging();
    let mut backend = DummyBackend::new();
    let textures = LightingTextures::new(&mut backend).unwrap();
    let lighting = TiledLighting::new(&TiledLightingConfig {
        width: WIDTH,
        height: HEIGHT,
        ..Default::default()
    });
    (backend, textures, lighting)
}

fn light_texel(bytes: &[u8], col: u32, row: u32) -> Vec4 {
    let offset = ((row * LIGHT_DATA_WIDTH + col) * 16) as usize;
    bytemuck::pod_read_unaligned(&bytes[offset..offset + 16])
}

#[test]
fn test_uploaded_masks_match_grid() {
    let (mut backend, mut textures, mut lighting) = setup();
    let handles: Vec<_> = [
        Vec3::new(120.0, 75.0, -10.0),
        Vec3::new(320.0, 240.0, -20.0),
        Vec3::new(600.0, 30.0, -5.0),
    ]
    .into_iter()
    .map(|p| {
        lighting
            .lights_mut()
            .register(PointLight::new(p, Vec3::ONE, 40.0))
            .unwrap()
    })
    .collect();

    lighting.prepare_frame(&pixel_camera());
    textures.upload(&mut backend, &lighting).unwrap();

    let bytes = backend
        .texture_data(textures.tile_bitmask().unwrap())
        .unwrap();
    let grid = lighting.grid();
    assert_eq!(bytes, grid.as_bytes());

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let mask = shader_mask(bytes, grid.cols(), col, row);
            for handle in &handles {
                let slot = handle.slot();
                let bit = (mask >> (31 - slot.index())) & 1 == 1;
                assert_eq!(bit, grid.tile(col, row).unwrap().test(slot));
            }
        }
    }
}

#[test]
fn test_light_columns_follow_slots() {
    let (mut backend, mut textures, mut lighting) = setup();
    let lights = lighting.lights_mut();
    let a = lights
        .register(PointLight::new(Vec3::new(10.0, 20.0, -30.0), Vec3::new(1.0, 0.5, 0.25), 8.0))
        .unwrap();
    let b = lights
        .register(PointLight::new(Vec3::new(50.0, 60.0, -70.0), Vec3::ONE, 4.0).with_decay(1.0))
        .unwrap();
    lights.release(a).unwrap();

    lighting.prepare_frame(&pixel_camera());
    textures.upload(&mut backend, &lighting).unwrap();

    let bytes = backend.texture_data(textures.light_data()).unwrap();
    assert_eq!(bytes.len(), MAX_LIGHTS * 2 * 16);

    let col = b.slot().index() as u32;
    assert_eq!(light_texel(bytes, col, 0), Vec4::new(50.0, 60.0, -70.0, 4.0));
    assert_eq!(light_texel(bytes, col, 1), Vec4::new(1.0, 1.0, 1.0, 1.0));

    let released = a.slot().index() as u32;
    assert_eq!(light_texel(bytes, released, 0), Vec4::ZERO);
    assert_eq!(light_texel(bytes, released, 1), Vec4::ZERO);
}

#[test]
fn test_resize_reallocates_bitmask() {
    let (mut backend, mut textures, mut lighting) = setup();
    textures.upload(&mut backend, &lighting).unwrap();
    let before = textures.tile_bitmask().unwrap();

    lighting.resize(1920, 1080);
    lighting.prepare_frame(&pixel_camera());
    textures.upload(&mut backend, &lighting).unwrap();

    let after = textures.tile_bitmask().unwrap();
    assert_ne!(before, after);
    assert!(backend.texture_data(before).is_none());

    let desc = backend.texture_descriptor(after).unwrap();
    assert_eq!((desc.width, desc.height), (60, 34));

    let meta: Vec<f32> =
        bytemuck::pod_collect_to_vec(backend.buffer_data(textures.tile_meta()).unwrap());
    assert_eq!(meta, lighting.tile_meta().to_array());
    assert_eq!(meta[..2], [1920.0, 1080.0]);
}

#[test]
fn test_every_frame_rewrites_everything() {
    let (mut backend, mut textures, mut lighting) = setup();
    for _ in 0..3 {
        lighting.prepare_frame(&pixel_camera());
        textures.upload(&mut backend, &lighting).unwrap();
    }
    assert_eq!(backend.texture_writes(textures.tile_bitmask().unwrap()), 3);
    assert_eq!(backend.texture_writes(textures.light_data()), 3);
    assert_eq!(backend.buffer_writes(textures.tile_meta()), 3);
}

#[test]
fn test_destroy_releases_all_resources() {
    let (mut backend, mut textures, lighting) = setup();
    textures.upload(&mut backend, &lighting).unwrap();
    assert_eq!(backend.texture_count(), 2);
    assert_eq!(backend.buffer_count(), 1);

    let tile_meta = textures.tile_meta();
    textures.destroy(&mut backend);
    assert_eq!(backend.texture_count(), 0);
    assert_eq!(backend.buffer_count(), 0);
    assert!(backend.buffer_data(tile_meta).is_none());
}
