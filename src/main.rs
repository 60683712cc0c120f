use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use scene_animator::camera::Camera;
use scene_animator::cli::{Cli, StartScene};
use scene_animator::core::{Clock, Viewport};
use scene_animator::loaders::load_scene_objects;
use scene_animator::renderer::{CubeRenderer, TimelineStatus, UiCommand};
use scene_animator::scene::{CubeOptions, SceneDocument};
use scene_animator::{RecordingRenderer, ViewerConfig};

const FPS_UPDATE_INTERVAL: f32 = 1.0;
const HEADLESS_FRAME_TIME: f32 = 1.0 / 60.0;

// === Application ===

struct App {
    cli: Cli,
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    viewport: Option<Viewport<CubeRenderer>>,
    document: SceneDocument,
    camera: Camera,
    clock: Clock,
    frame_count: u32,
    fps: f32,
    fps_update_timer: f32,
}

impl App {
    fn new(cli: Cli, config: ViewerConfig, document: SceneDocument) -> Self {
        Self {
            camera: Camera::new(&config.camera),
            cli,
            config,
            window: None,
            viewport: None,
            document,
            clock: Clock::new(),
            frame_count: 0,
            fps: 0.0,
            fps_update_timer: 0.0,
        }
    }

    fn update_fps(&mut self, delta: f32) {
        self.frame_count += 1;
        self.fps_update_timer += delta;

        if self.fps_update_timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frame_count as f32 / self.fps_update_timer;
            log::debug!("FPS: {:.1}", self.fps);
            self.frame_count = 0;
            self.fps_update_timer = 0.0;
        }
    }

    /// Hand the document's latest snapshot to the viewport
    fn publish(&mut self) {
        if let Some(viewport) = &mut self.viewport {
            viewport.set_objects(self.document.snapshot());
        }
    }

    fn apply(&mut self, command: UiCommand) {
        let Some(viewport) = &mut self.viewport else {
            return;
        };
        match command {
            UiCommand::TogglePlay => {
                viewport.toggle_playback();
            }
            UiCommand::Rewind => viewport.rewind(),
            UiCommand::SetFrame(frame) => viewport.set_frame(frame),
            UiCommand::SetDuration(duration) => {
                viewport.set_duration(duration);
                self.document.set_duration(duration);
            }
            UiCommand::AddCube => {
                self.document.add_cube(CubeOptions::default());
                self.publish();
            }
            UiCommand::ClearScene => {
                self.document.clear();
                self.publish();
            }
            UiCommand::GenerateCity => {
                self.document.generate_city_blocks(self.cli.city_size);
                self.publish();
            }
        }
    }

    fn handle_shortcut(&mut self, keycode: KeyCode) -> bool {
        let command = match keycode {
            KeyCode::Space => UiCommand::TogglePlay,
            KeyCode::KeyR => UiCommand::Rewind,
            KeyCode::KeyC => UiCommand::AddCube,
            KeyCode::KeyX => UiCommand::ClearScene,
            KeyCode::KeyB => UiCommand::GenerateCity,
            KeyCode::KeyH => {
                if let Some(renderer) = self.viewport.as_mut().and_then(Viewport::renderer_mut) {
                    let show = !renderer.show_ui();
                    renderer.set_show_ui(show);
                }
                return true;
            }
            _ => return false,
        };
        self.apply(command);
        true
    }

    fn redraw(&mut self) {
        let delta = self.clock.tick();
        self.update_fps(delta);
        self.camera.update();

        let (fps, objects) = (self.fps, self.document.len());
        let Some(viewport) = &mut self.viewport else {
            return;
        };

        let playback = viewport.playback();
        if let Some(renderer) = viewport.renderer_mut() {
            renderer.set_camera(&self.camera);
            renderer.set_status(TimelineStatus {
                current_frame: playback.current_frame,
                duration: playback.duration,
                playing: playback.is_playing(),
                objects,
                fps,
            });
        }

        viewport.pump(delta);

        let commands = viewport
            .renderer_mut()
            .map(CubeRenderer::take_commands)
            .unwrap_or_default();
        for command in commands {
            self.apply(command);
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut viewport) = self.viewport.take() {
            viewport.teardown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Scene Animator")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(CubeRenderer::new(window.clone(), !self.cli.no_ui)) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let mut viewport = Viewport::new(renderer, &self.config.playback);
        viewport.set_objects(self.document.snapshot());
        viewport.set_playing(self.cli.play);

        self.window = Some(window);
        self.viewport = Some(viewport);
        self.clock.reset();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let Some(renderer) = self.viewport.as_mut().and_then(Viewport::renderer_mut) {
            if renderer.handle_event(&event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(viewport) = &mut self.viewport {
                    viewport.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let shortcut = match (event.state, event.physical_key, event.repeat) {
                    (ElementState::Pressed, PhysicalKey::Code(keycode), false) => {
                        self.handle_shortcut(keycode)
                    }
                    _ => false,
                };
                if !shortcut {
                    self.camera.process_keyboard(&event);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut viewport) = self.viewport.take() {
            viewport.teardown();
        }
    }
}

fn build_document(cli: &Cli, duration: u32) -> Result<SceneDocument> {
    let mut document = SceneDocument::new(duration);

    if let Some(path) = &cli.objects {
        document.replace(load_scene_objects(path)?);
        return Ok(document);
    }

    match cli.scene {
        StartScene::Empty => {}
        StartScene::Cube => {
            document.add_cube(CubeOptions {
                position: Some([0.0, 0.5, 0.0]),
                color: None,
            });
        }
        StartScene::City => {
            document.generate_city_blocks(cli.city_size);
        }
    }
    Ok(document)
}

/// Drive a viewport over a recording renderer at a fixed 60 Hz for
/// `seconds` of simulated time
fn run_headless(cli: &Cli, config: &ViewerConfig, document: &SceneDocument, seconds: f32) {
    let mut viewport = Viewport::new(RecordingRenderer::new(), &config.playback);
    viewport.set_objects(document.snapshot());
    viewport.set_playing(cli.play);

    let frames = (seconds.max(0.0) / HEADLESS_FRAME_TIME).round() as u64;
    let mut playback_ticks = 0u64;
    for _ in 0..frames {
        playback_ticks += u64::from(viewport.pump(HEADLESS_FRAME_TIME).playback_ticks);
    }

    let live_nodes = viewport.reconciler().len();
    let final_frame = viewport.current_frame();
    let Some(renderer) = viewport.into_renderer() else {
        warn!("Viewport was already torn down");
        return;
    };

    println!("Headless run: {:.2}s simulated", seconds);
    println!("  Objects: {} ({} live nodes)", document.len(), live_nodes);
    println!("  Playback ticks: {} (final frame {})", playback_ticks, final_frame);
    println!(
        "  Meshes: {} created, {} destroyed, {} transform writes",
        renderer.created(),
        renderer.destroyed(),
        renderer.transform_writes()
    );
    println!("  Draws: {}", renderer.draws());
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(duration) = cli.duration {
        config.playback.duration = duration;
    }

    let document = build_document(&cli, config.playback.duration)?;
    info!(
        "Starting with {} objects, {} frame timeline",
        document.len(),
        config.playback.duration
    );

    if let Some(seconds) = cli.headless {
        run_headless(&cli, &config, &document, seconds);
        return Ok(());
    }

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(cli, config, document);

    println!("Scene Animator - Space play/pause, R rewind, C add cube, X clear, B city, H toggle UI");
    println!("Camera: W/S zoom, A/D orbit, Q/E tilt, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
