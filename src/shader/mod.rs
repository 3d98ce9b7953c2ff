//! Light loop injection into GLSL shading pipelines.
//!
//! A base pipeline is an ordinary GLSL 450 source with `#ifdef VERTEX` /
//! `#ifdef FRAGMENT` blocks. Its fragment stage exposes an extension point by
//! carrying two comment lines and naming a point light routine plus a `vec3`
//! accumulator:
//!
//! ```glsl
//! // @forward_plus:declarations
//!
//! vec3 my_point_light(vec3 view_position, float radius, vec3 color, float decay) {
//!     ...
//! }
//!
//! void main() {
//!     vec3 radiance = vec3(0.0);
//!     // @forward_plus:light_loop
//!     out_color = vec4(radiance, 1.0);
//! }
//! ```
//!
//! Because the hooks are comments the base source compiles as-is.
//! [`ShadingPipelineBuilder`] replaces the first hook with the tile bitmask and
//! light table bindings and the second with a loop over the lights whose bits
//! are set in the fragment's tile.
//!
//! # Example
//!
//! ```ignore
//! use tiled_lighting::shader::{library, ShadingPipelineBuilder};
//!
//! let pipeline = ShadingPipelineBuilder::new().build(&library::phong())?;
//! pipeline.validate()?;
//! let source = pipeline.source();
//! ```

pub mod library;

use crate::error::ConfigurationError;
use crate::forward_plus::{MAX_LIGHTS, TILE_EDGE};

/// Marks where the lighting resources are declared. Must sit at global scope
/// of the fragment stage, before the light loop hook.
pub const DECLARATIONS_HOOK: &str = "// @forward_plus:declarations";

/// Marks where the per-tile light loop runs. Must sit inside `main` where the
/// accumulator is in scope.
pub const LIGHT_LOOP_HOOK: &str = "// @forward_plus:light_loop";

/// Bind group used for the lighting resources unless overridden.
pub const DEFAULT_LIGHTING_BIND_GROUP: u32 = 2;

const DECLARATIONS_CHUNK: &str = include_str!("../../shaders/forward_plus/declarations.glsl");
const LIGHT_LOOP_CHUNK: &str = include_str!("../../shaders/forward_plus/light_loop.glsl");

/// Shader stages a pipeline is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }

    fn define(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::Fragment => "FRAGMENT",
        }
    }

    fn naga_stage(&self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// The point light routine and accumulator a base pipeline exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightAccumulation {
    /// `vec3 routine(vec3 view_position, float radius, vec3 color, float decay)`
    pub routine: String,
    /// `vec3` local in scope at [`LIGHT_LOOP_HOOK`]
    pub accumulator: String,
}

/// A shading pipeline before light injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePipeline {
    pub label: String,
    pub source: String,
    pub light_accumulation: Option<LightAccumulation>,
}

impl BasePipeline {
    pub fn new(label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            light_accumulation: None,
        }
    }

    pub fn with_light_accumulation(
        mut self,
        routine: impl Into<String>,
        accumulator: impl Into<String>,
    ) -> Self {
        self.light_accumulation = Some(LightAccumulation {
            routine: routine.into(),
            accumulator: accumulator.into(),
        });
        self
    }
}

/// Where the injected resources live. The host binds the textures from
/// [`LightingTextures`](crate::forward_plus::LightingTextures) here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingBindings {
    pub group: u32,
    pub tile_bitmask: u32,
    pub light_data: u32,
    pub sampler: u32,
    pub tile_meta: u32,
}

impl LightingBindings {
    fn in_group(group: u32) -> Self {
        Self {
            group,
            tile_bitmask: 0,
            light_data: 1,
            sampler: 2,
            tile_meta: 3,
        }
    }
}

/// A base pipeline with the light loop injected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiledPipeline {
    label: String,
    source: String,
    bindings: LightingBindings,
}

impl TiledPipeline {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Multi-stage GLSL source.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bindings(&self) -> LightingBindings {
        self.bindings
    }

    /// Parse one stage through naga.
    pub fn stage_module(&self, stage: ShaderStage) -> Result<naga::Module, ConfigurationError> {
        parse_stage(&self.label, &self.source, stage)
    }

    /// Parse and validate both stages.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_source(&self.label, &self.source)
    }
}

/// Builds [`TiledPipeline`]s from base pipelines.
#[derive(Debug, Clone)]
pub struct ShadingPipelineBuilder {
    bind_group: u32,
}

impl Default for ShadingPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadingPipelineBuilder {
    pub fn new() -> Self {
        Self {
            bind_group: DEFAULT_LIGHTING_BIND_GROUP,
        }
    }

    /// Place the lighting resources in bind group `set`.
    pub fn with_bind_group(mut self, set: u32) -> Self {
        self.bind_group = set;
        self
    }

    /// Inject the light loop into `base`. The base is left untouched.
    pub fn build(&self, base: &BasePipeline) -> Result<TiledPipeline, ConfigurationError> {
        let pipeline = base.label.clone();
        let accumulation = base
            .light_accumulation
            .as_ref()
            .ok_or_else(|| ConfigurationError::MissingExtensionPoint {
                pipeline: pipeline.clone(),
            })?;

        let accumulator = accumulation.accumulator.trim();
        if accumulator.is_empty() {
            return Err(ConfigurationError::EmptyAccumulator { pipeline });
        }
        let routine = accumulation.routine.trim();
        if routine.is_empty() || !defines_vec3_function(&base.source, routine) {
            return Err(ConfigurationError::UnknownRoutine {
                pipeline,
                routine: accumulation.routine.clone(),
            });
        }

        let declarations_line = find_hook(&pipeline, &base.source, DECLARATIONS_HOOK)?;
        let light_loop_line = find_hook(&pipeline, &base.source, LIGHT_LOOP_HOOK)?;
        if light_loop_line < declarations_line {
            return Err(ConfigurationError::HookOrder { pipeline });
        }

        let declarations = DECLARATIONS_CHUNK
            .replace("{{set}}", &self.bind_group.to_string())
            .replace("{{tile_edge}}", &format!("{:.1}", TILE_EDGE as f32))
            .replace("{{max_lights}}", &format!("{}u", MAX_LIGHTS));
        let light_loop = LIGHT_LOOP_CHUNK
            .replace("{{accumulator}}", accumulator)
            .replace("{{routine}}", routine);

        let mut source = String::with_capacity(
            base.source.len() + declarations.len() + light_loop.len(),
        );
        for (index, line) in base.source.lines().enumerate() {
            if index == declarations_line {
                source.push_str(&declarations);
            } else if index == light_loop_line {
                source.push_str(&light_loop);
            } else {
                source.push_str(line);
                source.push('\n');
            }
        }

        log::debug!(
            "Injected tiled light loop into '{}' (bind group {})",
            base.label,
            self.bind_group
        );

        Ok(TiledPipeline {
            label: base.label.clone(),
            source,
            bindings: LightingBindings::in_group(self.bind_group),
        })
    }
}

/// Parse and validate both stages of a multi-stage GLSL source.
pub fn validate_source(label: &str, source: &str) -> Result<(), ConfigurationError> {
    for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
        let module = parse_stage(label, source, stage)?;
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| ConfigurationError::ShaderValidation {
                pipeline: label.to_string(),
                stage: stage.name(),
                message: format!("Validation error: {e}"),
            })?;
    }
    Ok(())
}

fn parse_stage(
    label: &str,
    source: &str,
    stage: ShaderStage,
) -> Result<naga::Module, ConfigurationError> {
    let mut defines = naga::FastHashMap::default();
    defines.insert(stage.define().to_string(), String::new());

    let options = naga::front::glsl::Options {
        stage: stage.naga_stage(),
        defines,
    };

    let mut frontend = naga::front::glsl::Frontend::default();
    frontend
        .parse(&options, source)
        .map_err(|errors| ConfigurationError::ShaderValidation {
            pipeline: label.to_string(),
            stage: stage.name(),
            message: format!("GLSL parse error:\n{errors}"),
        })
}

/// Line index of the single occurrence of `hook`.
fn find_hook(
    pipeline: &str,
    source: &str,
    hook: &'static str,
) -> Result<usize, ConfigurationError> {
    let mut found = None;
    for (index, line) in source.lines().enumerate() {
        if line.trim() != hook {
            continue;
        }
        if found.is_some() {
            return Err(ConfigurationError::DuplicateHook {
                pipeline: pipeline.to_string(),
                hook,
            });
        }
        found = Some(index);
    }
    found.ok_or_else(|| ConfigurationError::MissingHook {
        pipeline: pipeline.to_string(),
        hook,
    })
}

/// Whether `source` defines `vec3 name(...)`.
fn defines_vec3_function(source: &str, name: &str) -> bool {
    source.lines().any(|line| {
        line.trim()
            .strip_prefix("vec3")
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .and_then(|rest| rest.trim_start().strip_prefix(name))
            .is_some_and(|rest| rest.trim_start().starts_with('('))
    })
}
