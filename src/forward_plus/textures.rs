//! GPU copies of the tile bitmask, light table and tile metadata

use crate::backend::{
    BackendResult, BufferDescriptor, BufferHandle, BufferUsage, TextureDescriptor, TextureFormat,
    TextureHandle, TextureUsage, UploadBackend,
};

use super::driver::TiledLighting;
use super::packer::{LIGHT_DATA_HEIGHT, LIGHT_DATA_WIDTH};
use super::tile_grid::{TileGrid, TileMeta};

const TILE_META_SIZE: u64 = std::mem::size_of::<TileMeta>() as u64;

/// Backend resources the injected shader samples.
///
/// The light table and uniform are allocated once. The bitmask texture
/// follows the grid: a new one is created whenever the grid generation moves,
/// and none exists while the viewport is empty.
#[derive(Debug)]
pub struct LightingTextures {
    tile_bitmask: Option<TextureHandle>,
    light_data: TextureHandle,
    tile_meta: BufferHandle,
    grid_generation: Option<u64>,
}

impl LightingTextures {
    pub fn new(backend: &mut dyn UploadBackend) -> BackendResult<Self> {
        let light_data = backend.create_texture(&TextureDescriptor {
            label: Some("light_data_tex".into()),
            width: LIGHT_DATA_WIDTH,
            height: LIGHT_DATA_HEIGHT,
            format: TextureFormat::Rgba32Float,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        })?;
        let tile_meta = backend.create_buffer(&BufferDescriptor {
            label: Some("tile_meta".into()),
            size: TILE_META_SIZE,
            usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
        })?;

        Ok(Self {
            tile_bitmask: None,
            light_data,
            tile_meta,
            grid_generation: None,
        })
    }

    /// Write all three resources for the current frame.
    pub fn upload(
        &mut self,
        backend: &mut dyn UploadBackend,
        lighting: &TiledLighting,
    ) -> BackendResult<()> {
        let grid = lighting.grid();
        self.sync_bitmask_texture(backend, grid)?;

        if let Some(texture) = self.tile_bitmask {
            backend.write_texture(texture, grid.as_bytes(), grid.cols(), grid.rows())?;
        }
        backend.write_texture(
            self.light_data,
            lighting.light_data().as_bytes(),
            LIGHT_DATA_WIDTH,
            LIGHT_DATA_HEIGHT,
        )?;
        backend.write_buffer(self.tile_meta, 0, bytemuck::bytes_of(&lighting.tile_meta()))?;
        Ok(())
    }

    fn sync_bitmask_texture(
        &mut self,
        backend: &mut dyn UploadBackend,
        grid: &TileGrid,
    ) -> BackendResult<()> {
        if self.grid_generation == Some(grid.generation()) {
            return Ok(());
        }

        if let Some(old) = self.tile_bitmask.take() {
            backend.destroy_texture(old);
        }
        if !grid.is_empty() {
            log::debug!(
                "Allocating tile bitmask texture {}x{}",
                grid.cols(),
                grid.rows()
            );
            self.tile_bitmask = Some(backend.create_texture(&TextureDescriptor {
                label: Some("tile_bitmask_tex".into()),
                width: grid.cols(),
                height: grid.rows(),
                format: TextureFormat::Rgba8Unorm,
                usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
            })?);
        }
        self.grid_generation = Some(grid.generation());
        Ok(())
    }

    /// `None` until the first upload, and while the viewport is empty.
    pub fn tile_bitmask(&self) -> Option<TextureHandle> {
        self.tile_bitmask
    }

    pub fn light_data(&self) -> TextureHandle {
        self.light_data
    }

    pub fn tile_meta(&self) -> BufferHandle {
        self.tile_meta
    }

    /// Release everything this owns.
    pub fn destroy(self, backend: &mut dyn UploadBackend) {
        if let Some(texture) = self.tile_bitmask {
            backend.destroy_texture(texture);
        }
        backend.destroy_texture(self.light_data);
        backend.destroy_buffer(self.tile_meta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::forward_plus::TiledLightingConfig;
    use crate::scene::Camera;

    fn lighting(width: u32, height: u32) -> TiledLighting {
        TiledLighting::new(&TiledLightingConfig {
            width,
            height,
            ..Default::default()
        })
    }

    #[test]
    fn test_first_upload_allocates_bitmask() {
        let mut backend = DummyBackend::new();
        let mut textures = LightingTextures::new(&mut backend).unwrap();
        assert!(textures.tile_bitmask().is_none());

        let mut lighting = lighting(640, 480);
        lighting.prepare_frame(&Camera::default().matrices());
        textures.upload(&mut backend, &lighting).unwrap();

        let bitmask = textures.tile_bitmask().unwrap();
        let desc = backend.texture_descriptor(bitmask).unwrap();
        assert_eq!((desc.width, desc.height), (20, 15));
        assert_eq!(backend.texture_data(bitmask).unwrap().len(), 20 * 15 * 4);
        assert_eq!(
            backend.buffer_data(textures.tile_meta()).unwrap(),
            bytemuck::bytes_of(&lighting.tile_meta())
        );
    }

    #[test]
    fn test_same_grid_reuses_texture() {
        let mut backend = DummyBackend::new();
        let mut textures = LightingTextures::new(&mut backend).unwrap();
        let lighting = lighting(64, 64);

        textures.upload(&mut backend, &lighting).unwrap();
        let first = textures.tile_bitmask();
        textures.upload(&mut backend, &lighting).unwrap();
        assert_eq!(textures.tile_bitmask(), first);
        assert_eq!(backend.texture_writes(textures.light_data()), 2);
    }

    #[test]
    fn test_empty_viewport_has_no_bitmask() {
        let mut backend = DummyBackend::new();
        let mut textures = LightingTextures::new(&mut backend).unwrap();
        let mut lighting = lighting(64, 64);
        textures.upload(&mut backend, &lighting).unwrap();

        lighting.resize(0, 0);
        textures.upload(&mut backend, &lighting).unwrap();
        assert!(textures.tile_bitmask().is_none());
        assert_eq!(backend.texture_count(), 1);
    }
}
