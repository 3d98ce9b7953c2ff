//! wgpu backend implementation
//!
//! Borrows the host renderer's device and queue. Texture and buffer handles
//! resolve to the underlying wgpu objects so the host can build its own bind
//! groups around them.

use crate::backend::traits::*;
use crate::backend::types::*;
use std::collections::HashMap;
use std::sync::Arc;

struct WgpuTexture {
    texture: wgpu::Texture,
    format: TextureFormat,
    width: u32,
    height: u32,
}

/// wgpu backend implementation
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    // Resource storage
    textures: HashMap<u64, WgpuTexture>,
    buffers: HashMap<u64, wgpu::Buffer>,

    // Handle counters
    next_texture_id: u64,
    next_buffer_id: u64,
}

impl WgpuBackend {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        log::info!("wgpu upload backend created");
        Self {
            device,
            queue,
            textures: HashMap::new(),
            buffers: HashMap::new(),
            next_texture_id: 0,
            next_buffer_id: 0,
        }
    }

    fn convert_texture_format(format: TextureFormat) -> wgpu::TextureFormat {
        match format {
            TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
        }
    }

    fn convert_texture_usage(usage: TextureUsage) -> wgpu::TextureUsages {
        let mut result = wgpu::TextureUsages::empty();
        if usage.contains(TextureUsage::COPY_DST) {
            result |= wgpu::TextureUsages::COPY_DST;
        }
        if usage.contains(TextureUsage::TEXTURE_BINDING) {
            result |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        result
    }

    fn convert_buffer_usage(usage: BufferUsage) -> wgpu::BufferUsages {
        let mut result = wgpu::BufferUsages::empty();
        if usage.contains(BufferUsage::COPY_DST) {
            result |= wgpu::BufferUsages::COPY_DST;
        }
        if usage.contains(BufferUsage::UNIFORM) {
            result |= wgpu::BufferUsages::UNIFORM;
        }
        result
    }

    /// Get the wgpu texture behind a handle
    pub fn texture(&self, texture: TextureHandle) -> Option<&wgpu::Texture> {
        self.textures.get(&texture.0).map(|t| &t.texture)
    }

    /// Get the wgpu buffer behind a handle
    pub fn buffer(&self, buffer: BufferHandle) -> Option<&wgpu::Buffer> {
        self.buffers.get(&buffer.0)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl UploadBackend for WgpuBackend {
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        let limit = self.device.limits().max_texture_dimension_2d;
        if desc.width == 0 || desc.height == 0 || desc.width > limit || desc.height > limit {
            return Err(BackendError::TextureCreationFailed(format!(
                "{:?}: {}x{} outside 1..={}",
                desc.label, desc.width, desc.height, limit
            )));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: desc.label.as_deref(),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::convert_texture_format(desc.format),
            usage: Self::convert_texture_usage(desc.usage),
            view_formats: &[],
        });

        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures.insert(
            id,
            WgpuTexture {
                texture,
                format: desc.format,
                width: desc.width,
                height: desc.height,
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
            .get(&texture.0)
            .ok_or(BackendError::UnknownTexture(texture))?;

        let bytes_per_row = width * tex.format.bytes_per_pixel();
        let expected = bytes_per_row as usize * height as usize;
        if width != tex.width || height != tex.height || data.len() != expected {
            return Err(BackendError::DataSizeMismatch {
                expected: tex.width as usize * tex.height as usize
                    * tex.format.bytes_per_pixel() as usize,
                actual: data.len(),
            });
        }

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &tex.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(tex) = self.textures.remove(&texture.0) {
            tex.texture.destroy();
        }
    }

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle> {
        if desc.size == 0 {
            return Err(BackendError::BufferCreationFailed(format!(
                "{:?} has zero size",
                desc.label
            )));
        }

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: desc.label.as_deref(),
            size: desc.size,
            usage: Self::convert_buffer_usage(desc.usage),
            mapped_at_creation: false,
        });

        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        self.buffers.insert(id, buffer);

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
            .get(&buffer.0)
            .ok_or(BackendError::UnknownBuffer(buffer))?;

        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > buf.size()) {
            return Err(BackendError::DataSizeMismatch {
                expected: buf.size().saturating_sub(offset) as usize,
                actual: data.len(),
            });
        }

        self.queue.write_buffer(buf, offset, data);
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(buf) = self.buffers.remove(&buffer.0) {
            buf.destroy();
        }
    }
}
