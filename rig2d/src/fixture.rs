//! Shared test doubles: a scripted animation runtime with named animation
//! durations and track-0 chaining, plus counting asset/uploader fakes.

use crate::{
    AnimationRuntime, AssetKind, AssetSource, BlendMode, Error, RenderCommand, RuntimeLoader,
    TextureHandle, TextureUploader, TrackEvent,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct FakeEntry {
    pub name: String,
    pub looped: bool,
    pub time: f32,
    started: bool,
    done: bool,
}

#[derive(Default)]
pub struct FakeState {
    pub position: (f32, f32),
    pub scale: (f32, f32),
    pub pose: f32,
    pub skeleton_time: f32,
    pub world_updates: usize,
    pub track: Vec<FakeEntry>,
}

pub struct FakeRuntime {
    animations: HashMap<String, f32>,
    attachments: usize,
    texture: TextureHandle,
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeRuntime {
    fn duration(&self, name: &str) -> f32 {
        self.animations.get(name).copied().unwrap_or(1.0)
    }
}

impl AnimationRuntime for FakeRuntime {
    fn set_animation(&mut self, _track: usize, name: &str, looped: bool) -> Result<(), Error> {
        if !self.animations.contains_key(name) {
            return Err(Error::UnknownAnimation {
                name: name.to_string(),
            });
        }
        let mut state = self.state.borrow_mut();
        state.track.clear();
        state.track.push(FakeEntry {
            name: name.to_string(),
            looped,
            time: 0.0,
            started: false,
            done: false,
        });
        Ok(())
    }

    fn add_animation(
        &mut self,
        _track: usize,
        name: &str,
        looped: bool,
        _delay: f32,
    ) -> Result<(), Error> {
        if !self.animations.contains_key(name) {
            return Err(Error::UnknownAnimation {
                name: name.to_string(),
            });
        }
        self.state.borrow_mut().track.push(FakeEntry {
            name: name.to_string(),
            looped,
            time: 0.0,
            started: false,
            done: false,
        });
        Ok(())
    }

    fn update_state(&mut self, delta: f32, events: &mut Vec<TrackEvent>) {
        let durations = self.animations.clone();
        let mut state = self.state.borrow_mut();
        if state.track.is_empty() {
            return;
        }

        if !state.track[0].started {
            state.track[0].started = true;
            events.push(TrackEvent::Started {
                animation: state.track[0].name.clone(),
            });
        }
        state.track[0].time += delta;

        loop {
            let entry = &mut state.track[0];
            let duration = durations.get(&entry.name).copied().unwrap_or(1.0);
            if entry.done || entry.time < duration {
                break;
            }
            events.push(TrackEvent::Completed {
                animation: entry.name.clone(),
            });
            if entry.looped {
                entry.time -= duration;
                continue;
            }
            let leftover = entry.time - duration;
            if state.track.len() > 1 {
                state.track.remove(0);
                state.track[0].started = true;
                state.track[0].time = leftover;
                events.push(TrackEvent::Started {
                    animation: state.track[0].name.clone(),
                });
            } else {
                let entry = &mut state.track[0];
                entry.time = duration;
                entry.done = true;
            }
        }
    }

    fn apply_pose(&mut self) {
        let mut state = self.state.borrow_mut();
        state.pose = state.track.first().map(|e| e.time).unwrap_or(0.0);
    }

    fn update_skeleton(&mut self, delta: f32) {
        self.state.borrow_mut().skeleton_time += delta;
    }

    fn update_world_transform(&mut self) {
        self.state.borrow_mut().world_updates += 1;
    }

    fn set_position(&mut self, x: f32, y: f32) {
        self.state.borrow_mut().position = (x, y);
    }

    fn set_scale(&mut self, x: f32, y: f32) {
        self.state.borrow_mut().scale = (x, y);
    }

    fn render(&mut self, out: &mut Vec<RenderCommand>) {
        for _ in 0..self.attachments {
            out.push(RenderCommand {
                positions: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
                uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
                colors: vec![0xFFFF_FFFF; 4],
                dark_colors: vec![0xFF00_0000; 4],
                indices: vec![0, 1, 2, 2, 3, 0],
                texture: self.texture,
                blend: BlendMode::Normal,
            });
        }
    }
}

/// Scripted loader: knows a fixed set of animations and atlas page paths,
/// records how it was called, and exposes the state of the runtime it built.
pub struct FakeLoader {
    pub animations: Vec<(&'static str, f32)>,
    pub pages: Vec<&'static str>,
    pub attachments: usize,
    pub fail_parse: bool,
    pub calls: Cell<usize>,
    pub last_mix: Cell<f32>,
    pub last_state: RefCell<Option<Rc<RefCell<FakeState>>>>,
}

impl FakeLoader {
    pub fn new(animations: &[(&'static str, f32)]) -> Self {
        Self {
            animations: animations.to_vec(),
            pages: vec!["page.png"],
            attachments: 1,
            fail_parse: false,
            calls: Cell::new(0),
            last_mix: Cell::new(0.0),
            last_state: RefCell::new(None),
        }
    }

    pub fn state(&self) -> Rc<RefCell<FakeState>> {
        self.last_state
            .borrow()
            .as_ref()
            .expect("no runtime loaded yet")
            .clone()
    }
}

impl RuntimeLoader for FakeLoader {
    fn load(
        &self,
        _atlas_bytes: &[u8],
        _skeleton_bytes: &[u8],
        default_mix: f32,
        load_texture: &mut dyn FnMut(&str) -> TextureHandle,
    ) -> Result<Box<dyn AnimationRuntime>, Error> {
        self.calls.set(self.calls.get() + 1);
        self.last_mix.set(default_mix);
        if self.fail_parse {
            return Err(Error::Parse {
                message: "scripted parse failure".to_string(),
            });
        }

        let mut texture = TextureHandle::NULL;
        for page in &self.pages {
            texture = load_texture(page);
        }

        let state = Rc::new(RefCell::new(FakeState::default()));
        *self.last_state.borrow_mut() = Some(state.clone());
        Ok(Box::new(FakeRuntime {
            animations: self
                .animations
                .iter()
                .map(|(n, d)| (n.to_string(), *d))
                .collect(),
            attachments: self.attachments,
            texture,
            state,
        }))
    }
}

/// In-memory asset source with per-path load counting.
#[derive(Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
    pub loads: RefCell<HashMap<String, usize>>,
}

impl MemoryAssets {
    pub fn with(files: &[(&str, &[u8])]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(p, b)| (p.to_string(), b.to_vec()))
                .collect(),
            loads: RefCell::new(HashMap::new()),
        }
    }

    pub fn load_count(&self, path: &str) -> usize {
        self.loads.borrow().get(path).copied().unwrap_or(0)
    }
}

impl AssetSource for MemoryAssets {
    fn load(&mut self, _kind: AssetKind, path: &str) -> Result<Vec<u8>, Error> {
        *self.loads.borrow_mut().entry(path.to_string()).or_insert(0) += 1;
        self.files.get(path).cloned().ok_or_else(|| Error::AssetLoad {
            path: path.to_string(),
            message: "not found".to_string(),
        })
    }
}

/// Uploader fake that hands out sequential handles and counts the
/// decode/upload step per path.
#[derive(Default)]
pub struct CountingUploader {
    next: u64,
    pub fail_paths: HashSet<String>,
    pub uploads: RefCell<Vec<String>>,
}

impl CountingUploader {
    pub fn upload_count(&self, path: &str) -> usize {
        self.uploads.borrow().iter().filter(|p| *p == path).count()
    }
}

impl TextureUploader for CountingUploader {
    fn upload(&mut self, path: &str, _bytes: &[u8]) -> Option<TextureHandle> {
        self.uploads.borrow_mut().push(path.to_string());
        if self.fail_paths.contains(path) {
            return None;
        }
        self.next += 1;
        Some(TextureHandle(self.next))
    }
}
