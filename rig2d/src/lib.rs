//! Skinned 2D skeletal animation for retained-mode widget trees.
//!
//! This crate is renderer-agnostic: it owns the widget wrapper, the skeleton
//! instance lifecycle, and the collaborator boundaries (asset loading, the
//! external animation runtime, texture upload). GPU integrations live in
//! separate crates (e.g. `rig2d-wgpu`).

#![forbid(unsafe_code)]

mod assets;
mod error;
mod geometry;
mod instance;
mod runtime;
mod scheduler;
mod texture;
mod widget;

pub use assets::*;
pub use error::*;
pub use geometry::*;
pub use instance::*;
pub use runtime::*;
pub use scheduler::*;
pub use texture::*;
pub use widget::*;

#[cfg(test)]
mod fixture;


#[cfg(test)]
mod scheduler_tests;


#[cfg(test)]
mod instance_tests;
