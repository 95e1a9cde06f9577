use anyhow::{Context, Result};
use cityview_assets::MeshStore;
use cityview_client::{BackgroundPoller, LiveSource, PollEvent, SimulationClient};
use cityview_common::{EntityKind, GridExtent, ViewerConfig};
use cityview_input::{commands, CameraCommand, HeldKeys, Key};
use cityview_render::{compose, ground_plane, lane_markings, road_surface, LightingSettings};
use cityview_render_wgpu::{OrbitCamera, WgpuRenderer};
use cityview_scene::{FrameClock, SceneConfig, SceneState};
use cityview_tools::SceneInspector;
use clap::Parser;
use egui::Context as EguiContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cityview-desktop", about = "3D viewer for the simulated traffic grid")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (YAML); missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation server URL (overrides the config file)
    #[arg(long)]
    server_url: Option<String>,

    /// Number of agents requested at init (overrides the config file)
    #[arg(long)]
    agents: Option<u32>,

    /// Directory searched for per-kind OBJ meshes (vehicle.obj, building.obj,
    /// signal.obj); kinds without one render as unit cubes
    #[arg(long, default_value = "./assets")]
    assets_dir: PathBuf,
}

/// Everything the frame loop mutates, separate from window/GPU plumbing.
struct AppState {
    config: ViewerConfig,
    scene: SceneState,
    camera: OrbitCamera,
    held: HeldKeys,
    clock: FrameClock,
    poller: BackgroundPoller,
    meshes: MeshStore,
    lighting: LightingSettings,
    frame: u64,
    last_poll_status: String,
    show_panel: bool,
    /// Road geometry must be re-uploaded on the next frame.
    static_dirty: bool,
}

impl AppState {
    fn new(
        config: ViewerConfig,
        scene: SceneState,
        poller: BackgroundPoller,
        meshes: MeshStore,
    ) -> Self {
        let camera = OrbitCamera::new(scene.extent(), config.camera);
        let clock = FrameClock::new(config.max_delta_ms);
        Self {
            config,
            scene,
            camera,
            held: HeldKeys::new(),
            clock,
            poller,
            meshes,
            lighting: LightingSettings::default(),
            frame: 0,
            last_poll_status: "waiting for first poll".into(),
            show_panel: true,
            static_dirty: true,
        }
    }

    /// One simulation-side tick: drain poll results, apply held keys, then
    /// advance interpolation by the clamped frame delta.
    fn update(&mut self) {
        for event in self.poller.drain() {
            match event {
                PollEvent::Snapshots(snapshots) => {
                    for snap in &snapshots {
                        if !snap.kind.is_mobile() {
                            self.static_dirty = true;
                        }
                        self.scene.apply_snapshot(snap);
                    }
                    self.last_poll_status = "ok".into();
                }
                PollEvent::Failed(reason) => {
                    tracing::warn!(%reason, "poll cycle failed");
                    self.last_poll_status = format!("failed: {reason}");
                }
            }
        }

        for command in commands(&self.held) {
            match command {
                CameraCommand::Rotate {
                    d_azimuth,
                    d_elevation,
                } => self.camera.rotate(d_azimuth, d_elevation),
                CameraCommand::Pan { dx, dy } => self.camera.pan(dx, dy),
                CameraCommand::PanForward(amount) => self.camera.pan_forward(amount),
                CameraCommand::Zoom(delta) => self.camera.zoom(delta),
            }
        }

        let delta_ms = self.clock.tick_now();
        self.scene.advance(delta_ms);

        self.frame += 1;
        if self.frame % self.config.poll_every_frames as u64 == 0 {
            self.poller.request_poll();
        }
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if pressed && code == KeyCode::F1 {
            self.show_panel = !self.show_panel;
            return;
        }
        let Some(key) = map_key(code) else {
            return;
        };
        if pressed {
            self.held.press(key);
        } else {
            self.held.release(key);
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = SceneInspector::summary(&self.scene);

        egui::SidePanel::left("parameters")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("CityView");
                ui.separator();
                ui.label(format!("Grid: {}x{}", summary.grid.0, summary.grid.1));
                ui.label(format!(
                    "Vehicles: {}  Signals: {}",
                    summary.vehicles, summary.signals
                ));
                ui.label(format!(
                    "Buildings: {}  Roads: {}",
                    summary.buildings, summary.roads
                ));
                ui.label(format!("Interpolating: {}", summary.in_flight));
                ui.label(format!("Last poll: {}", self.last_poll_status));

                ui.separator();
                let eye = self.camera.eye();
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1}) dist={:.0}",
                    eye.x, eye.y, eye.z, self.camera.distance
                ));

                ui.separator();
                ui.heading("Lighting");
                ui.label("Light position:");
                ui.horizontal(|ui| {
                    ui.add(
                        egui::DragValue::new(&mut self.lighting.light_position[0])
                            .prefix("X: ")
                            .speed(0.5),
                    );
                    ui.add(
                        egui::DragValue::new(&mut self.lighting.light_position[1])
                            .prefix("Y: ")
                            .speed(0.5),
                    );
                    ui.add(
                        egui::DragValue::new(&mut self.lighting.light_position[2])
                            .prefix("Z: ")
                            .speed(0.5),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("Ambient:");
                    ui.color_edit_button_rgba_unmultiplied(&mut self.lighting.ambient);
                });
                ui.horizontal(|ui| {
                    ui.label("Diffuse:");
                    ui.color_edit_button_rgba_unmultiplied(&mut self.lighting.diffuse);
                });
                ui.horizontal(|ui| {
                    ui.label("Specular:");
                    ui.color_edit_button_rgba_unmultiplied(&mut self.lighting.specular);
                });
                ui.add(
                    egui::Slider::new(&mut self.lighting.shininess, 1.0..=128.0)
                        .text("Shininess"),
                );

                ui.separator();
                ui.small("F1: Toggle Panel | Arrows: Orbit | WASD: Pan | +/-: Zoom");
            });
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::ArrowLeft => Some(Key::ArrowLeft),
        KeyCode::ArrowRight => Some(Key::ArrowRight),
        KeyCode::ArrowUp => Some(Key::ArrowUp),
        KeyCode::ArrowDown => Some(Key::ArrowDown),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Equal | KeyCode::NumpadAdd => Some(Key::ZoomIn),
        KeyCode::Minus | KeyCode::NumpadSubtract => Some(Key::ZoomOut),
        _ => None,
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("CityView")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cityview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = size.width as f32 / size.height.max(1) as f32;

        let mut renderer = WgpuRenderer::new(&device, surface_format, size.width, size.height);
        renderer.upload_meshes(&device, &self.state.meshes);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(egui_winit) = &mut self.egui_winit {
            let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.camera.aspect =
                        config.width as f32 / config.height.max(1) as f32;
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::Focused(false) => {
                // Releases are lost while unfocused; a held key would stick.
                self.state.held.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(code, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => {
                self.state.update();

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                if self.state.static_dirty {
                    if let Some(renderer) = &mut self.renderer {
                        renderer.set_static_geometry(
                            device,
                            &ground_plane(self.state.scene.extent()),
                            &road_surface(&self.state.scene),
                            &lane_markings(&self.state.scene),
                        );
                    }
                    self.state.static_dirty = false;
                }

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let items = compose(&self.state.scene);
                if let Some(renderer) = &self.renderer {
                    renderer.render(
                        device,
                        queue,
                        &view,
                        &self.state.camera,
                        &self.state.lighting,
                        &items,
                    );
                }

                let raw_input = self
                    .egui_winit
                    .as_mut()
                    .unwrap()
                    .take_egui_input(self.window.as_ref().unwrap());
                let full_output = self.egui_ctx.run(raw_input, |ctx| {
                    self.state.draw_ui(ctx);
                });

                self.egui_winit.as_mut().unwrap().handle_platform_output(
                    self.window.as_ref().unwrap(),
                    full_output.platform_output,
                );

                let paint_jobs = self
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [
                        self.config.as_ref().unwrap().width,
                        self.config.as_ref().unwrap().height,
                    ],
                    pixels_per_point: full_output.pixels_per_point,
                };

                {
                    let egui_renderer = self.egui_renderer.as_mut().unwrap();
                    for (id, image_delta) in &full_output.textures_delta.set {
                        egui_renderer.update_texture(device, queue, *id, image_delta);
                    }
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("egui_encoder"),
                        });
                    egui_renderer.update_buffers(
                        device,
                        queue,
                        &mut encoder,
                        &paint_jobs,
                        &screen_descriptor,
                    );
                    {
                        let mut pass = encoder
                            .begin_render_pass(&wgpu::RenderPassDescriptor {
                                label: Some("egui_pass"),
                                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                    view: &view,
                                    resolve_target: None,
                                    ops: wgpu::Operations {
                                        load: wgpu::LoadOp::Load,
                                        store: wgpu::StoreOp::Store,
                                    },
                                })],
                                depth_stencil_attachment: None,
                                ..Default::default()
                            })
                            .forget_lifetime();
                        egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
                    }
                    queue.submit(std::iter::once(encoder.finish()));
                    for id in &full_output.textures_delta.free {
                        egui_renderer.free_texture(id);
                    }
                }

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Import the per-kind OBJ meshes that exist under the assets directory.
/// Kinds without a file (or with a broken one) keep the unit cube.
fn load_meshes(dir: &Path) -> MeshStore {
    let mut store = MeshStore::new();
    for (kind, file) in [
        (EntityKind::Vehicle, "vehicle.obj"),
        (EntityKind::Building, "building.obj"),
        (EntityKind::Signal, "signal.obj"),
    ] {
        let path = dir.join(file);
        if !path.exists() {
            continue;
        }
        if let Err(e) = store.import_obj(kind, &path) {
            tracing::warn!(kind = kind.name(), path = %path.display(), "mesh import failed, keeping cube: {e}");
        }
    }
    store
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(url) = cli.server_url {
        config.server_url = url;
    }
    if let Some(agents) = cli.agents {
        config.agents = agents;
    }

    tracing::info!(server = %config.server_url, agents = config.agents, "cityview-desktop starting");

    let requested = GridExtent {
        width: config.grid_width,
        height: config.grid_height,
    };
    let client = SimulationClient::new(&config.server_url);
    let extent = match client.init(config.agents, requested) {
        Ok(extent) => extent,
        Err(e) => {
            tracing::warn!("server init failed, starting with requested grid: {e}");
            requested
        }
    };

    let mut scene = SceneState::new(
        extent,
        SceneConfig {
            interpolation_ms: config.interpolation_ms,
            interpolate_signals: config.interpolate_signals,
        },
    );

    // Fetch the static scenery synchronously so the first frame has roads
    // and buildings; the poller retries on cadence if this fails.
    let mut source = LiveSource::new(client);
    match source.bootstrap() {
        Ok(snapshots) => {
            for snap in &snapshots {
                scene.apply_snapshot(snap);
            }
        }
        Err(e) => tracing::warn!("bootstrap failed, scenery will load on first poll: {e}"),
    }

    let poller = BackgroundPoller::spawn(source);
    let meshes = load_meshes(&cli.assets_dir);
    let state = AppState::new(config, scene, poller, meshes);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
