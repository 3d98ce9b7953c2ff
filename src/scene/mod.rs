//! Scene inputs to the culling pass

mod camera;
mod light;

pub use camera::*;
pub use light::*;
