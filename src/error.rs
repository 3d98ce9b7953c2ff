//! Error types for tiled lighting

use crate::forward_plus::LightHandle;
use thiserror::Error;

/// Returned when every light slot is already occupied.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("light budget exhausted: all {capacity} slots are in use")]
pub struct CapacityError {
    pub capacity: usize,
}

/// Light registry error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LightingError {
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error("unknown light {0:?} (released or never registered)")]
    UnknownLight(LightHandle),
    #[error("invalid light: {reason}")]
    InvalidLight { reason: String },
}

/// Shader injection setup error.
///
/// These are raised while composing a pipeline, never while rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("pipeline '{pipeline}' does not expose a light accumulation extension point")]
    MissingExtensionPoint { pipeline: String },
    #[error("pipeline '{pipeline}' is missing the `{hook}` hook")]
    MissingHook { pipeline: String, hook: &'static str },
    #[error("pipeline '{pipeline}' contains the `{hook}` hook more than once")]
    DuplicateHook { pipeline: String, hook: &'static str },
    #[error("pipeline '{pipeline}' places the light loop before the declarations hook")]
    HookOrder { pipeline: String },
    #[error("pipeline '{pipeline}' does not define point light routine `{routine}`")]
    UnknownRoutine { pipeline: String, routine: String },
    #[error("pipeline '{pipeline}' names an empty light accumulator")]
    EmptyAccumulator { pipeline: String },
    #[error("pipeline '{pipeline}' failed {stage} stage validation: {message}")]
    ShaderValidation {
        pipeline: String,
        stage: &'static str,
        message: String,
    },
}
