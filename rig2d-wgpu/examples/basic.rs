//! Spinning-card demo: a scripted animation runtime drives a `RigWidget`
//! through the full pipeline (scheduler tick, lazy instance creation,
//! texture cache, batched wgpu draws). Swap `DemoLoader` for a real
//! skeleton-data loader to render actual rigs.

use rig2d::{
    AnimationRuntime, AssetKind, AssetSource, BlendMode, Error, HostEnv, RenderCommand, RigWidget,
    RuntimeLoader, Scheduler, Size, TextureCache, TextureHandle, TrackEvent, WidgetEvent,
    WidgetGeometry,
};
use rig2d_wgpu::{RigRenderer, WgpuTextures};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const CYCLE_SECONDS: f32 = 2.0;
const CARD_HALF_EXTENT: f32 = 128.0;

/// Scripted stand-in for a parsed skeleton: one quad orbiting its anchor,
/// one known animation ("spin").
struct DemoRuntime {
    texture: TextureHandle,
    position: (f32, f32),
    scale: (f32, f32),
    current: Option<(String, bool)>,
    pending: Vec<(String, bool)>,
    time: f32,
    started: bool,
    finished: bool,
}

impl AnimationRuntime for DemoRuntime {
    fn set_animation(&mut self, _track: usize, name: &str, looped: bool) -> Result<(), Error> {
        if name != "spin" {
            return Err(Error::UnknownAnimation {
                name: name.to_string(),
            });
        }
        self.current = Some((name.to_string(), looped));
        self.pending.clear();
        self.time = 0.0;
        self.started = false;
        self.finished = false;
        Ok(())
    }

    fn add_animation(
        &mut self,
        _track: usize,
        name: &str,
        looped: bool,
        _delay: f32,
    ) -> Result<(), Error> {
        if name != "spin" {
            return Err(Error::UnknownAnimation {
                name: name.to_string(),
            });
        }
        self.pending.push((name.to_string(), looped));
        Ok(())
    }

    fn update_state(&mut self, delta: f32, events: &mut Vec<TrackEvent>) {
        let Some((name, looped)) = self.current.clone() else {
            return;
        };
        if self.finished {
            return;
        }
        if !self.started {
            self.started = true;
            events.push(TrackEvent::Started {
                animation: name.clone(),
            });
        }
        self.time += delta;
        while self.time >= CYCLE_SECONDS {
            events.push(TrackEvent::Completed {
                animation: name.clone(),
            });
            if looped {
                self.time -= CYCLE_SECONDS;
            } else if let Some(next) = self.pending.first().cloned() {
                self.pending.remove(0);
                self.current = Some(next);
                self.time = 0.0;
                self.started = false;
                break;
            } else {
                self.finished = true;
                break;
            }
        }
    }

    fn apply_pose(&mut self) {}

    fn update_skeleton(&mut self, _delta: f32) {}

    fn update_world_transform(&mut self) {}

    fn set_position(&mut self, x: f32, y: f32) {
        self.position = (x, y);
    }

    fn set_scale(&mut self, x: f32, y: f32) {
        self.scale = (x, y);
    }

    fn render(&mut self, out: &mut Vec<RenderCommand>) {
        let angle = self.time / CYCLE_SECONDS * std::f32::consts::TAU;
        let (sin, cos) = angle.sin_cos();
        let (cx, cy) = (
            self.position.0,
            self.position.1 - CARD_HALF_EXTENT * self.scale.1,
        );

        let corners = [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        let positions = corners
            .iter()
            .map(|&(x, y)| {
                let x = x * CARD_HALF_EXTENT * self.scale.0;
                let y = y * CARD_HALF_EXTENT * self.scale.1;
                [cx + x * cos - y * sin, cy + x * sin + y * cos]
            })
            .collect();

        out.push(RenderCommand {
            positions,
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            colors: vec![0xFFFFFFFF; 4],
            dark_colors: vec![0x00000000; 4],
            indices: vec![0, 1, 2, 2, 3, 0],
            texture: self.texture,
            blend: BlendMode::Normal,
        });
    }
}

struct DemoLoader;

impl RuntimeLoader for DemoLoader {
    fn load(
        &self,
        _atlas_bytes: &[u8],
        _skeleton_bytes: &[u8],
        _default_mix: f32,
        load_texture: &mut dyn FnMut(&str) -> TextureHandle,
    ) -> Result<Box<dyn AnimationRuntime>, Error> {
        Ok(Box::new(DemoRuntime {
            texture: load_texture("page.png"),
            position: (0.0, 0.0),
            scale: (1.0, 1.0),
            current: None,
            pending: Vec::new(),
            time: 0.0,
            started: false,
            finished: false,
        }))
    }
}

struct MapAssets {
    files: HashMap<String, Vec<u8>>,
}

impl AssetSource for MapAssets {
    fn load(&mut self, _kind: AssetKind, path: &str) -> Result<Vec<u8>, Error> {
        self.files.get(path).cloned().ok_or_else(|| Error::AssetLoad {
            path: path.to_string(),
            message: "not found".to_string(),
        })
    }
}

/// 64x64 UV-gradient page, PNG-encoded so it exercises the real decode path.
fn page_png() -> Vec<u8> {
    let image = image::RgbaImage::from_fn(64, 64, |x, y| {
        image::Rgba([(x * 4) as u8, (y * 4) as u8, 200, 255])
    });
    let mut bytes = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

struct App {
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<RigRenderer>,
    uploader: Option<WgpuTextures>,
    loader: DemoLoader,
    assets: MapAssets,
    textures: TextureCache,
    scheduler: Scheduler,
    widget: Option<RigWidget>,
}

impl Default for App {
    fn default() -> Self {
        let mut files = HashMap::new();
        files.insert("card.atlas".to_string(), b"demo atlas".to_vec());
        files.insert("card.skel".to_string(), b"demo skeleton".to_vec());
        files.insert("page.png".to_string(), page_png());

        Self {
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            uploader: None,
            loader: DemoLoader,
            assets: MapAssets { files },
            textures: TextureCache::new(),
            scheduler: Scheduler::new(),
            widget: None,
        }
    }
}

fn widget_geometry(width: f32, height: f32) -> WidgetGeometry {
    WidgetGeometry::new(width * 0.25, height * 0.25, width * 0.5, height * 0.5)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = Arc::new(
            event_loop
                .create_window(Window::default_attributes().with_title("rig2d-wgpu basic"))
                .unwrap(),
        );

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            compatible_surface: Some(&surface),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
        }))
        .unwrap();

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: Default::default(),
        }))
        .unwrap();

        let size = window.inner_size().max(PhysicalSize::new(1, 1));
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = RigRenderer::new(&device, config.format);
        renderer.set_viewport(&queue, config.width as f32, config.height as f32);
        let uploader = WgpuTextures::new(&device, &queue, renderer.texture_bind_group_layout());

        let viewport = Size::new(config.width as f32, config.height as f32);
        let mut widget = RigWidget::new(
            widget_geometry(viewport.width, viewport.height),
            viewport,
        );
        widget.set_atlas("card.atlas").unwrap();
        widget.set_skeleton("card.skel").unwrap();
        widget.set_action("spin").unwrap();
        widget.set_animation_listener(|event| {
            println!("animation event: {:?} ({})", event.kind, event.animation);
        });

        window.request_redraw();
        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.uploader = Some(uploader);
        self.widget = Some(widget);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let due = self.scheduler.poll(now);
        if !due.is_empty() {
            if let (Some(widget), Some(window)) = (self.widget.as_mut(), self.window.as_ref()) {
                if widget.tick(now) {
                    window.request_redraw();
                }
            }
        }
        if let Some(deadline) = self.scheduler.next_deadline() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                if let Some(widget) = self.widget.as_mut() {
                    widget.on_destroy(&mut self.scheduler);
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let Some(surface) = self.surface.as_ref() else {
                    return;
                };
                let Some(device) = self.device.as_ref() else {
                    return;
                };
                let Some(queue) = self.queue.as_ref() else {
                    return;
                };
                let Some(config) = self.config.as_mut() else {
                    return;
                };
                config.width = size.width.max(1);
                config.height = size.height.max(1);
                surface.configure(device, config);
                if let Some(renderer) = self.renderer.as_ref() {
                    renderer.set_viewport(queue, config.width as f32, config.height as f32);
                }
                if let Some(widget) = self.widget.as_mut() {
                    let viewport = Size::new(config.width as f32, config.height as f32);
                    widget.on_event(
                        WidgetEvent::MovedResized,
                        widget_geometry(viewport.width, viewport.height),
                        viewport,
                    );
                }
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let Some(surface) = self.surface.as_ref() else {
                    return;
                };
                let Some(device) = self.device.as_ref() else {
                    return;
                };
                let Some(queue) = self.queue.as_ref() else {
                    return;
                };
                let Some(config) = self.config.as_ref() else {
                    return;
                };
                let Some(renderer) = self.renderer.as_mut() else {
                    return;
                };
                let Some(uploader) = self.uploader.as_mut() else {
                    return;
                };
                let Some(widget) = self.widget.as_mut() else {
                    return;
                };

                let mut env = HostEnv {
                    loader: &self.loader,
                    assets: &mut self.assets,
                    textures: &mut self.textures,
                    uploader,
                    scheduler: &mut self.scheduler,
                };
                let commands = widget.on_paint(&mut env, Instant::now()).unwrap_or(&[]);
                renderer.prepare(device, queue, commands);

                let frame = match surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(_) => {
                        surface.configure(device, config);
                        return;
                    }
                };
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("encoder"),
                });
                {
                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("render pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            depth_slice: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: 0.1,
                                    g: 0.1,
                                    b: 0.12,
                                    a: 1.0,
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                    });
                    renderer.render(&mut pass, self.uploader.as_ref().unwrap(), false);
                }

                queue.submit(Some(encoder.finish()));
                frame.present();
            }
            _ => {}
        }
    }
}

fn main() {
    let event_loop = EventLoop::new().unwrap();
    let mut app = App::default();
    event_loop.run_app(&mut app).unwrap();
}
