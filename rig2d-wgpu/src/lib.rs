//! wgpu renderer integration for the rig2d widget runtime.
//!
//! Consumes the render commands a posed skeleton produces and turns them
//! into batched draw calls: one vertex/index upload per frame, one indexed
//! draw per command, pipeline selected by blend mode, texture bound per
//! command. Also provides the wgpu side of the texture cache bridge.

mod mesh;
mod pipeline;
mod renderer;
mod texture;

pub use mesh::*;
pub use pipeline::{GpuVertex, blend_state};
pub use renderer::*;
pub use texture::*;
