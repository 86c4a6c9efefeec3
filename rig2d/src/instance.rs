use crate::{
    AnimationRuntime, AssetKind, AssetSource, Error, RenderCommand, RuntimeLoader, Size,
    TextureCache, TextureUploader, TrackEvent, WidgetGeometry, WorldPlacement,
};
use std::time::Instant;

/// Blend duration used when transitioning between different animations.
pub const DEFAULT_MIX: f32 = 0.2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AnimationEventKind {
    /// An animation began playing on track 0.
    Started,
    /// A looping animation finished one cycle and keeps playing.
    Looped,
    /// A non-looping animation (the last of its chain) finished.
    Ended,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationEvent {
    pub kind: AnimationEventKind,
    pub animation: String,
}

/// Construction parameters gathered from the widget's property surface.
#[derive(Clone, Debug)]
pub struct InstanceConfig<'a> {
    pub atlas_path: &'a str,
    pub skeleton_path: &'a str,
    /// Action name(s) to start with, comma separated for a chain.
    pub action: Option<&'a str>,
    pub looped: bool,
    pub time_scale: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub geometry: WidgetGeometry,
    pub viewport: Size,
}

/// One loaded skeleton: asset pair, pose state and animation-state machine,
/// owned by a single widget and driven from its thread.
pub struct SkeletonInstance {
    runtime: Box<dyn AnimationRuntime>,
    time_scale: f32,
    looped: bool,
    chain: Vec<String>,
    last_tick: Instant,
    raw_events: Vec<TrackEvent>,
    commands: Vec<RenderCommand>,
}

impl SkeletonInstance {
    /// Loads the atlas and skeleton bytes, constructs the runtime with the
    /// default blend duration, applies the initial world placement and any
    /// pre-recorded action, and records `now` as the update baseline.
    ///
    /// Any failure aborts construction; no partial instance escapes. The
    /// caller logs the error and stays in the "no skeleton yet" state.
    pub fn create(
        config: &InstanceConfig<'_>,
        loader: &dyn RuntimeLoader,
        assets: &mut dyn AssetSource,
        textures: &mut TextureCache,
        uploader: &mut dyn TextureUploader,
        now: Instant,
    ) -> Result<Self, Error> {
        if config.time_scale < 0.0 {
            return Err(Error::InvalidTimeScale {
                value: config.time_scale,
            });
        }

        let atlas_bytes = assets.load(AssetKind::Atlas, config.atlas_path)?;
        let skeleton_bytes = assets.load(AssetKind::Skeleton, config.skeleton_path)?;

        let mut load_texture = |path: &str| textures.load(path, assets, uploader);
        let runtime = loader.load(
            &atlas_bytes,
            &skeleton_bytes,
            DEFAULT_MIX,
            &mut load_texture,
        )?;

        let mut instance = Self {
            runtime,
            time_scale: config.time_scale,
            looped: config.looped,
            chain: Vec::new(),
            last_tick: now,
            raw_events: Vec::new(),
            commands: Vec::new(),
        };

        instance.set_world_placement(
            &config.geometry,
            config.viewport,
            config.scale_x,
            config.scale_y,
        );

        if let Some(action) = config.action {
            if !action.is_empty() {
                instance.set_actions(action, config.looped)?;
            }
        }

        Ok(instance)
    }

    /// Replaces track 0 with `names`: a single animation name, or a
    /// comma-separated list queued as sequential follow-ons with zero extra
    /// delay. Every queued entry inherits the same loop flag.
    pub fn set_actions(&mut self, names: &str, looped: bool) -> Result<(), Error> {
        let names: Vec<String> = names
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let Some((first, rest)) = names.split_first() else {
            return Err(Error::bad_params("empty action name"));
        };

        // `chain` tracks what was actually applied to the runtime, so a
        // failure partway through a list leaves event synthesis consistent
        // with whatever is really playing on track 0.
        self.runtime.set_animation(0, first, looped)?;
        self.looped = looped;
        self.chain = vec![first.clone()];
        for name in rest {
            self.runtime.add_animation(0, name, looped, 0.0)?;
            self.chain.push(name.clone());
        }
        Ok(())
    }

    /// Advances the simulation to `now`: scales the elapsed wall-clock time,
    /// steps the state machine, applies the pose, advances skeleton-internal
    /// time and recomputes world transforms. Lifecycle events synthesized
    /// from the state machine callbacks are appended to `events` before this
    /// returns. Call at most once per tick; never concurrently with `draw`.
    pub fn update(&mut self, now: Instant, events: &mut Vec<AnimationEvent>) {
        let elapsed = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        let delta = elapsed * self.time_scale;

        self.raw_events.clear();
        self.runtime.update_state(delta, &mut self.raw_events);
        self.runtime.apply_pose();
        self.runtime.update_skeleton(delta);
        self.runtime.update_world_transform();

        for raw in self.raw_events.drain(..) {
            match raw {
                TrackEvent::Started { animation } => events.push(AnimationEvent {
                    kind: AnimationEventKind::Started,
                    animation,
                }),
                TrackEvent::Completed { animation } => {
                    // A looping animation reports every finished cycle,
                    // wherever it sits in the chain.
                    if self.looped {
                        events.push(AnimationEvent {
                            kind: AnimationEventKind::Looped,
                            animation,
                        });
                        continue;
                    }
                    // Non-looping: completion of a non-final chained entry is
                    // an internal mix transition, not a lifecycle boundary.
                    let is_last = match self.chain.last() {
                        Some(last) => *last == animation,
                        None => true,
                    };
                    if !is_last {
                        continue;
                    }
                    events.push(AnimationEvent {
                        kind: AnimationEventKind::Ended,
                        animation,
                    });
                }
            }
        }
    }

    /// Produces the render commands for the current pose. Read-only with
    /// respect to pose state; repeated calls between updates yield the same
    /// commands. The returned slice is valid until the next `draw`.
    pub fn draw(&mut self) -> &[RenderCommand] {
        self.commands.clear();
        self.runtime.render(&mut self.commands);
        &self.commands
    }

    /// Recomputes the skeleton root position/scale from widget geometry.
    pub fn set_world_placement(
        &mut self,
        geometry: &WidgetGeometry,
        viewport: Size,
        scale_x: f32,
        scale_y: f32,
    ) {
        let placement = WorldPlacement::compute(geometry, viewport, scale_x, scale_y);
        self.runtime.set_position(placement.x, placement.y);
        self.runtime.set_scale(placement.scale_x, placement.scale_y);
    }

    /// Takes effect on the next `update`. Zero freezes the pose; negative
    /// values are rejected.
    pub fn set_time_scale(&mut self, scale: f32) -> Result<(), Error> {
        if scale < 0.0 {
            return Err(Error::InvalidTimeScale { value: scale });
        }
        self.time_scale = scale;
        Ok(())
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }
}
