use crate::{
    AnimationEvent, AssetSource, Error, InstanceConfig, RenderCommand, RuntimeLoader, Scheduler,
    Size, SkeletonInstance, TextureCache, TextureUploader, TimerId, WidgetGeometry,
};
use std::time::{Duration, Instant};

pub const PROP_ATLAS: &str = "atlas";
pub const PROP_SKELETON: &str = "skeleton";
pub const PROP_ACTION: &str = "action";
pub const PROP_SCALE_X: &str = "scale_x";
pub const PROP_SCALE_Y: &str = "scale_y";
pub const PROP_SCALE_TIME: &str = "scale_time";
pub const PROP_LOOP: &str = "loop";

/// Simulation tick cadence, independent of the paint cadence.
pub const UPDATE_INTERVAL: Duration = Duration::from_millis(16);

/// Typed property value for the host's get/set surface. Hosts persist
/// properties as strings, so numeric and boolean setters accept string
/// values and coerce them.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Str(String),
    Float(f32),
    Bool(bool),
}

impl PropValue {
    fn to_float(&self, property: &str) -> Result<f32, Error> {
        match self {
            PropValue::Float(v) => Ok(*v),
            PropValue::Str(s) => s.parse().map_err(|_| Error::InvalidPropertyValue {
                property: property.to_string(),
                message: format!("expected a number, got '{s}'"),
            }),
            PropValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        }
    }

    fn to_bool(&self, property: &str) -> Result<bool, Error> {
        match self {
            PropValue::Bool(b) => Ok(*b),
            PropValue::Str(s) => match s.as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(Error::InvalidPropertyValue {
                    property: property.to_string(),
                    message: format!("expected a boolean, got '{s}'"),
                }),
            },
            PropValue::Float(v) => Ok(*v != 0.0),
        }
    }

    fn to_str(&self, property: &str) -> Result<&str, Error> {
        match self {
            PropValue::Str(s) => Ok(s),
            _ => Err(Error::InvalidPropertyValue {
                property: property.to_string(),
                message: "expected a string".to_string(),
            }),
        }
    }
}

/// Host services borrowed for the duration of one widget call.
pub struct HostEnv<'a> {
    pub loader: &'a dyn RuntimeLoader,
    pub assets: &'a mut dyn AssetSource,
    pub textures: &'a mut TextureCache,
    pub uploader: &'a mut dyn TextureUploader,
    pub scheduler: &'a mut Scheduler,
}

/// Geometry-affecting host events forwarded into the skeleton's world
/// transform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WidgetEvent {
    Moved,
    Resized,
    MovedResized,
}

/// The animation-aware widget: owns zero-or-one skeleton instance, exposes
/// the seven-property surface, and decouples the periodic update tick from
/// paint requests.
///
/// The skeleton instance is constructed lazily on the first paint after both
/// asset paths are set. A failed construction leaves the widget interactive
/// but inert: it renders nothing, emits no events, and does not retry.
pub struct RigWidget {
    atlas: Option<String>,
    skeleton: Option<String>,
    action: Option<String>,
    scale_x: f32,
    scale_y: f32,
    scale_time: f32,
    looped: bool,
    geometry: WidgetGeometry,
    viewport: Size,
    instance: Option<SkeletonInstance>,
    timer: Option<TimerId>,
    load_failed: bool,
    listener: Option<Box<dyn FnMut(&AnimationEvent)>>,
}

impl RigWidget {
    pub fn new(geometry: WidgetGeometry, viewport: Size) -> Self {
        Self {
            atlas: None,
            skeleton: None,
            action: None,
            scale_x: 1.0,
            scale_y: 1.0,
            scale_time: 1.0,
            looped: true,
            geometry,
            viewport,
            instance: None,
            timer: None,
            load_failed: false,
            listener: None,
        }
    }

    /// Registers the lifecycle-event callback. Events are dispatched
    /// synchronously from [`RigWidget::tick`], on the owning thread.
    pub fn set_animation_listener(&mut self, listener: impl FnMut(&AnimationEvent) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn set_atlas(&mut self, path: &str) -> Result<(), Error> {
        if self.instance.is_some() {
            return Err(Error::PropertyLocked {
                property: PROP_ATLAS.to_string(),
            });
        }
        self.atlas = Some(path.to_string());
        Ok(())
    }

    pub fn set_skeleton(&mut self, path: &str) -> Result<(), Error> {
        if self.instance.is_some() {
            return Err(Error::PropertyLocked {
                property: PROP_SKELETON.to_string(),
            });
        }
        self.skeleton = Some(path.to_string());
        Ok(())
    }

    /// Sets the active action name(s). Before the instance exists the value
    /// is recorded and applied at construction time.
    pub fn set_action(&mut self, action: &str) -> Result<(), Error> {
        if let Some(instance) = self.instance.as_mut() {
            instance.set_actions(action, self.looped)?;
        }
        self.action = Some(action.to_string());
        Ok(())
    }

    pub fn set_scale_x(&mut self, scale_x: f32) {
        self.scale_x = scale_x;
        self.refresh_placement();
    }

    pub fn set_scale_y(&mut self, scale_y: f32) {
        self.scale_y = scale_y;
        self.refresh_placement();
    }

    pub fn set_scale_time(&mut self, scale_time: f32) -> Result<(), Error> {
        if scale_time < 0.0 {
            return Err(Error::InvalidTimeScale { value: scale_time });
        }
        if let Some(instance) = self.instance.as_mut() {
            instance.set_time_scale(scale_time)?;
        }
        self.scale_time = scale_time;
        Ok(())
    }

    /// Decides whether track completion re-fires as [`Looped`] or ends with
    /// [`Ended`]. Applies to actions set after this call.
    ///
    /// [`Looped`]: crate::AnimationEventKind::Looped
    /// [`Ended`]: crate::AnimationEventKind::Ended
    pub fn set_loop(&mut self, looped: bool) {
        self.looped = looped;
    }

    pub fn set_prop(&mut self, name: &str, value: &PropValue) -> Result<(), Error> {
        match name {
            PROP_ATLAS => self.set_atlas(value.to_str(name)?),
            PROP_SKELETON => self.set_skeleton(value.to_str(name)?),
            PROP_ACTION => self.set_action(value.to_str(name)?),
            PROP_SCALE_X => {
                self.set_scale_x(value.to_float(name)?);
                Ok(())
            }
            PROP_SCALE_Y => {
                self.set_scale_y(value.to_float(name)?);
                Ok(())
            }
            PROP_SCALE_TIME => self.set_scale_time(value.to_float(name)?),
            PROP_LOOP => {
                self.set_loop(value.to_bool(name)?);
                Ok(())
            }
            _ => Err(Error::UnknownProperty {
                name: name.to_string(),
            }),
        }
    }

    pub fn get_prop(&self, name: &str) -> Result<PropValue, Error> {
        match name {
            PROP_ATLAS => Ok(PropValue::Str(self.atlas.clone().unwrap_or_default())),
            PROP_SKELETON => Ok(PropValue::Str(self.skeleton.clone().unwrap_or_default())),
            PROP_ACTION => Ok(PropValue::Str(self.action.clone().unwrap_or_default())),
            PROP_SCALE_X => Ok(PropValue::Float(self.scale_x)),
            PROP_SCALE_Y => Ok(PropValue::Float(self.scale_y)),
            PROP_SCALE_TIME => Ok(PropValue::Float(self.scale_time)),
            PROP_LOOP => Ok(PropValue::Bool(self.looped)),
            _ => Err(Error::UnknownProperty {
                name: name.to_string(),
            }),
        }
    }

    /// Paint entry point: lazily constructs the skeleton instance, then
    /// produces the current pose's render commands. Paint never advances the
    /// simulation; that happens on the timer tick.
    pub fn on_paint(&mut self, env: &mut HostEnv<'_>, now: Instant) -> Option<&[RenderCommand]> {
        if self.instance.is_none() && !self.load_failed && self.assets_configured() {
            self.create_instance(env, now);
        }
        self.instance.as_mut().map(|instance| instance.draw())
    }

    /// Periodic timer callback: advances the simulation and dispatches any
    /// lifecycle events before returning. Returns true when the widget wants
    /// a repaint.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(instance) = self.instance.as_mut() else {
            return false;
        };

        let mut events = Vec::new();
        instance.update(now, &mut events);
        if let Some(listener) = self.listener.as_mut() {
            for event in &events {
                listener(event);
            }
        }
        true
    }

    /// Move/resize hook: refreshes the skeleton's world placement from the
    /// new geometry. Placement is derived, never accumulated.
    pub fn on_event(&mut self, _event: WidgetEvent, geometry: WidgetGeometry, viewport: Size) {
        self.geometry = geometry;
        self.viewport = viewport;
        self.refresh_placement();
    }

    /// Widget teardown: cancels the update timer before releasing the
    /// skeleton instance, so no tick can observe a dropped pose.
    pub fn on_destroy(&mut self, scheduler: &mut Scheduler) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
        self.instance = None;
    }

    pub fn is_active(&self) -> bool {
        self.instance.is_some()
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    fn assets_configured(&self) -> bool {
        matches!(&self.atlas, Some(p) if !p.is_empty())
            && matches!(&self.skeleton, Some(p) if !p.is_empty())
    }

    fn refresh_placement(&mut self) {
        if let Some(instance) = self.instance.as_mut() {
            instance.set_world_placement(
                &self.geometry,
                self.viewport,
                self.scale_x,
                self.scale_y,
            );
        }
    }

    fn create_instance(&mut self, env: &mut HostEnv<'_>, now: Instant) {
        let config = InstanceConfig {
            atlas_path: self.atlas.as_deref().unwrap_or_default(),
            skeleton_path: self.skeleton.as_deref().unwrap_or_default(),
            action: self.action.as_deref(),
            looped: self.looped,
            time_scale: self.scale_time,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            geometry: self.geometry,
            viewport: self.viewport,
        };

        match SkeletonInstance::create(
            &config,
            env.loader,
            env.assets,
            env.textures,
            env.uploader,
            now,
        ) {
            Ok(instance) => {
                self.instance = Some(instance);
                self.timer = Some(env.scheduler.schedule(UPDATE_INTERVAL, now));
                // Run one update so the first paint already has a pose.
                self.tick(now);
            }
            Err(e) => {
                log::error!("failed to create skeleton instance: {e}");
                self.load_failed = true;
            }
        }
    }
}
