//! Dummy upload backend for testing and development.
//!
//! Keeps every resource in host memory so tests can read back exactly what
//! would have reached the GPU.

use std::collections::HashMap;

use super::traits::*;
use super::types::*;

#[derive(Debug)]
struct DummyTexture {
    desc: TextureDescriptor,
    data: Vec<u8>,
    writes: u64,
}

#[derive(Debug)]
struct DummyBuffer {
    data: Vec<u8>,
    writes: u64,
}

/// Dummy backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    textures: HashMap<u64, DummyTexture>,
    buffers: HashMap<u64, DummyBuffer>,
    next_id: u64,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture_data(&self, texture: TextureHandle) -> Option<&[u8]> {
        self.textures.get(&texture.0).map(|t| t.data.as_slice())
    }

    pub fn texture_descriptor(&self, texture: TextureHandle) -> Option<&TextureDescriptor> {
        self.textures.get(&texture.0).map(|t| &t.desc)
    }

    /// Number of full uploads a texture has received.
    pub fn texture_writes(&self, texture: TextureHandle) -> u64 {
        self.textures.get(&texture.0).map_or(0, |t| t.writes)
    }

    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(|b| b.data.as_slice())
    }

    pub fn buffer_writes(&self, buffer: BufferHandle) -> u64 {
        self.buffers.get(&buffer.0).map_or(0, |b| b.writes)
    }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl UploadBackend for DummyBackend {
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(BackendError::TextureCreationFailed(format!(
                "{:?} has zero size",
                desc.label
            )));
        }
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{} {:?})",
            desc.label,
            desc.width,
            desc.height,
            desc.format
        );

        let id = self.allocate_id();
        self.textures.insert(
            id,
            DummyTexture {
                desc: desc.clone(),
                data: vec![0; desc.byte_size()],
                writes: 0,
            },
        );
        Ok(TextureHandle(id))
    }

    fn write_texture(
        &mut self,
        texture: TextureHandle,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> BackendResult<()> {
        let tex = self
            .textures
            .get_mut(&texture.0)
            .ok_or(BackendError::UnknownTexture(texture))?;

        let expected = tex.desc.byte_size();
        if width != tex.desc.width || height != tex.desc.height || data.len() != expected {
            return Err(BackendError::DataSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        tex.data.copy_from_slice(data);
        tex.writes += 1;
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        log::trace!("DummyBackend: destroying texture {:?}", texture);
        self.textures.remove(&texture.0);
    }

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle> {
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            desc.label,
            desc.size
        );
        let size = usize::try_from(desc.size)
            .map_err(|_| BackendError::BufferCreationFailed(format!("{} bytes", desc.size)))?;

        let id = self.allocate_id();
        self.buffers.insert(
            id,
            DummyBuffer {
                data: vec![0; size],
                writes: 0,
            },
        );
        Ok(BufferHandle(id))
    }

    fn write_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> BackendResult<()> {
        let buf = self
            .buffers
            .get_mut(&buffer.0)
            .ok_or(BackendError::UnknownBuffer(buffer))?;

        let len = buf.data.len();
        let range = usize::try_from(offset)
            .ok()
            .and_then(|start| Some(start..start.checked_add(data.len())?))
            .filter(|range| range.end <= len);
        let Some(range) = range else {
            return Err(BackendError::DataSizeMismatch {
                expected: usize::try_from(offset).map_or(0, |start| len.saturating_sub(start)),
                actual: data.len(),
            });
        };

        buf.data[range].copy_from_slice(data);
        buf.writes += 1;
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        log::trace!("DummyBackend: destroying buffer {:?}", buffer);
        self.buffers.remove(&buffer.0);
    }
}
