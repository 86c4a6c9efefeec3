//! Boundary to the external animation-data library.
//!
//! The binary skeleton/atlas parser, the animation-state machine and the
//! render-command producer are an opaque collaborator. This module pins down
//! the surface the core drives: load, set/add animation by name, the
//! per-tick update calls, and the render-command production.

use crate::Error;

/// Opaque GPU texture reference handed out by the texture cache and carried
/// by render commands. `NULL` marks a texture that failed to decode; a
/// command carrying it is skipped by renderers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

impl TextureHandle {
    pub const NULL: TextureHandle = TextureHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Additive,
    Multiply,
    Screen,
}

/// One GPU-drawable batch produced from a posed skeleton.
///
/// Commands are produced fresh each draw, in back-to-front order, and must
/// not be retained across frames. `colors`/`dark_colors` are packed
/// `0xAARRGGBB` as emitted by the runtime; renderers repack them into the
/// GPU channel order.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCommand {
    pub positions: Vec<[f32; 2]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<u32>,
    pub dark_colors: Vec<u32>,
    pub indices: Vec<u16>,
    pub texture: TextureHandle,
    pub blend: BlendMode,
}

/// Raw animation-state machine callback, before the skeleton instance
/// translates it into a public lifecycle event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackEvent {
    Started { animation: String },
    Completed { animation: String },
}

/// A loaded skeleton: pose state plus its animation-state machine.
///
/// Never shared between instances. All methods are driven from the owning
/// GUI thread; `update_state` → `apply_pose` → `update_skeleton` →
/// `update_world_transform` is the per-tick order the instance guarantees.
pub trait AnimationRuntime {
    fn set_animation(&mut self, track: usize, name: &str, looped: bool) -> Result<(), Error>;

    fn add_animation(
        &mut self,
        track: usize,
        name: &str,
        looped: bool,
        delay: f32,
    ) -> Result<(), Error>;

    /// Advances the state machine by `delta` (already time-scaled) and
    /// appends any start/complete callbacks to `events`.
    fn update_state(&mut self, delta: f32, events: &mut Vec<TrackEvent>);

    /// Applies the current state machine mix to the skeleton pose.
    fn apply_pose(&mut self);

    /// Advances skeleton-internal time (physics-like secondary motion).
    fn update_skeleton(&mut self, delta: f32);

    fn update_world_transform(&mut self);

    fn set_position(&mut self, x: f32, y: f32);

    fn set_scale(&mut self, x: f32, y: f32);

    /// Produces the ordered render commands for the current pose into `out`.
    /// The order encodes back-to-front draw order and must be preserved.
    fn render(&mut self, out: &mut Vec<RenderCommand>);
}

/// Entry point of the external animation-data library.
pub trait RuntimeLoader {
    /// Parses atlas and skeleton bytes into a ready runtime. `default_mix`
    /// is the blend duration applied when transitioning between different
    /// animations. `load_texture` resolves each atlas page image to a GPU
    /// handle while the atlas is being parsed.
    fn load(
        &self,
        atlas_bytes: &[u8],
        skeleton_bytes: &[u8],
        default_mix: f32,
        load_texture: &mut dyn FnMut(&str) -> TextureHandle,
    ) -> Result<Box<dyn AnimationRuntime>, Error>;
}
