//! Upload backend abstraction
//!
//! The culling pass only needs to create, refill and replace a handful of
//! textures and one uniform buffer. Whatever renderer hosts the lighting
//! implements [`UploadBackend`] for its own device.

use crate::backend::types::*;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Unknown texture {0:?}")]
    UnknownTexture(TextureHandle),
    #[error("Unknown buffer {0:?}")]
    UnknownBuffer(BufferHandle),
    #[error("Upload of {actual} bytes does not match the {expected} byte destination")]
    DataSizeMismatch { expected: usize, actual: usize },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Texture and buffer upload operations used by the lighting pass
pub trait UploadBackend {
    /// Create a texture
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle>;

    /// Replace the full contents of a texture
    fn write_texture(
        &mut self,
        texture: TextureHandle,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> BackendResult<()>;

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Create a buffer
    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle>;

    /// Write data to a buffer
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8])
        -> BackendResult<()>;

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);
}
