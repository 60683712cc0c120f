use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::{Mat4, Vec3};
use log::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::Camera;
use crate::math::Color;
use crate::scene::{ShapeKind, Transform};
use crate::traits::{MeshHandle, RendererError, SceneRenderer};
use crate::types::{CameraUniform, InstanceRaw, Vertex, CUBE_INDICES, CUBE_VERTICES};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// `#111111` in linear space; the surface is sRGB so the encode happens on store
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.005_605,
    g: 0.005_605,
    b: 0.005_605,
    a: 1.0,
};
const INITIAL_INSTANCE_CAPACITY: usize = 64;
const GROUND_SIZE: f32 = 40.0;
// `#222222`
const GROUND_COLOR: Color = Color::rgb(0.015_996, 0.015_996, 0.015_996);

/// Playback numbers the timeline overlay shows
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimelineStatus {
    pub current_frame: u32,
    pub duration: u32,
    pub playing: bool,
    pub objects: usize,
    pub fps: f32,
}

/// Something the user asked for through the overlay. Drained by the host
/// after each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    TogglePlay,
    Rewind,
    SetFrame(u32),
    SetDuration(u32),
    AddCube,
    ClearScene,
    GenerateCity,
}

#[derive(Debug, Clone, Copy)]
struct MeshInstance {
    shape: ShapeKind,
    transform: Transform,
    color: Color,
}

impl MeshInstance {
    fn raw(&self) -> InstanceRaw {
        InstanceRaw::new(self.transform.to_matrix(), self.color)
    }
}

/// wgpu renderer drawing every mesh as an instance of one unit cube, with a
/// ground slab, one directional light and an egui timeline on top
pub struct CubeRenderer {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    camera_uniform: CameraUniform,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    meshes: BTreeMap<MeshHandle, MeshInstance>,
    next_handle: u64,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    show_ui: bool,
    status: TimelineStatus,
    commands: Vec<UiCommand>,
    disposed: bool,
}

impl CubeRenderer {
    pub async fn new(window: Arc<Window>, show_ui: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("Failed to find appropriate adapter: {}", e))?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size)?;
        surface.configure(&device, &surface_config);

        let camera_uniform = CameraUniform {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0; 3],
            ambient: crate::camera::AMBIENT,
            light_dir: crate::camera::LIGHT_DIRECTION.normalize().to_array(),
            _pad: 0.0,
        };
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertices"),
            contents: bytemuck::cast_slice(&CUBE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Indices"),
            contents: bytemuck::cast_slice(&CUBE_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = Self::create_instance_buffer(&device, INITIAL_INSTANCE_CAPACITY);

        let (pipeline, camera_bind_group) =
            Self::create_render_pipeline(&device, &camera_buffer, surface_config.format);
        let (depth_texture, depth_view) = Self::create_depth_texture(&device, &surface_config);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_config.format,
            egui_wgpu::RendererOptions::default(),
        );

        info!(
            "Cube renderer initialized: {}x{} {:?}",
            surface_config.width, surface_config.height, surface_config.format
        );

        Ok(Self {
            window,
            device,
            queue,
            surface,
            surface_config,
            pipeline,
            camera_buffer,
            camera_bind_group,
            camera_uniform,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
            depth_texture,
            depth_view,
            meshes: BTreeMap::new(),
            next_handle: 0,
            egui_renderer,
            egui_state,
            egui_ctx,
            show_ui,
            status: TimelineStatus::default(),
            commands: Vec::new(),
            disposed: false,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no supported formats")?;
        if !surface_format.is_srgb() {
            warn!("No sRGB surface format, using {:?}; colors will render dark", surface_format);
        }

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_render_pipeline(
        device: &wgpu::Device,
        camera_buffer: &wgpu::Buffer,
        surface_format: wgpu::TextureFormat,
    ) -> (wgpu::RenderPipeline, wgpu::BindGroup) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cube Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("cube.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cube Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), InstanceRaw::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        (pipeline, bind_group)
    }

    /// Aspect ratio of the current surface
    pub fn aspect(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height as f32
    }

    /// Upload the camera for the next draw
    pub fn set_camera(&mut self, camera: &Camera) {
        self.camera_uniform = camera.to_uniform(self.aspect());
    }

    pub fn set_status(&mut self, status: TimelineStatus) {
        self.status = status;
    }

    pub fn take_commands(&mut self) -> Vec<UiCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn set_show_ui(&mut self, show_ui: bool) {
        self.show_ui = show_ui;
    }

    pub fn show_ui(&self) -> bool {
        self.show_ui
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Returns whether egui consumed the event
    pub fn handle_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        self.show_ui && self.egui_state.on_window_event(&self.window, event).consumed
    }

    fn ground_instance() -> InstanceRaw {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(GROUND_SIZE, 0.02, GROUND_SIZE),
            glam::Quat::IDENTITY,
            Vec3::new(0.0, -0.01, 0.0),
        );
        InstanceRaw::new(model, GROUND_COLOR)
    }

    fn upload_instances(&mut self) -> u32 {
        let instances: Vec<InstanceRaw> = std::iter::once(Self::ground_instance())
            .chain(self.meshes.values().map(MeshInstance::raw))
            .collect();

        if instances.len() > self.instance_capacity {
            let capacity = instances.len().next_power_of_two();
            debug!("Growing instance buffer {} -> {}", self.instance_capacity, capacity);
            self.instance_buffer.destroy();
            self.instance_buffer = Self::create_instance_buffer(&self.device, capacity);
            self.instance_capacity = capacity;
        }

        self.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        instances.len() as u32
    }

    fn run_overlay(&mut self) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let status = self.status;
        let mut commands = Vec::new();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::TopBottomPanel::bottom("timeline").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let label = if status.playing { "Pause" } else { "Play" };
                    if ui.button(label).clicked() {
                        commands.push(UiCommand::TogglePlay);
                    }
                    if ui.button("Rewind").clicked() {
                        commands.push(UiCommand::Rewind);
                    }

                    let mut frame = status.current_frame;
                    let slider = egui::Slider::new(&mut frame, 0..=status.duration).text("frame");
                    if ui.add(slider).changed() {
                        commands.push(UiCommand::SetFrame(frame));
                    }

                    ui.label("Duration");
                    let mut duration = status.duration;
                    if ui
                        .add(egui::DragValue::new(&mut duration).range(1..=100_000))
                        .changed()
                    {
                        commands.push(UiCommand::SetDuration(duration));
                    }

                    ui.separator();
                    if ui.button("Add Cube").clicked() {
                        commands.push(UiCommand::AddCube);
                    }
                    if ui.button("Clear").clicked() {
                        commands.push(UiCommand::ClearScene);
                    }
                    if ui.button("City Blocks").clicked() {
                        commands.push(UiCommand::GenerateCity);
                    }

                    ui.separator();
                    ui.monospace(format!(
                        "{} / {}  {} objects  {:.0} FPS",
                        status.current_frame, status.duration, status.objects, status.fps
                    ));
                });
            });
        });

        self.commands.extend(commands);
        full_output
    }

    fn render_overlay(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let full_output = self.run_overlay();
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        self.egui_renderer
            .update_buffers(&self.device, &self.queue, encoder, &tris, &screen_descriptor);

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    fn acquire_frame(&mut self) -> Result<wgpu::SurfaceTexture, RendererError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| RendererError::Surface(e.to_string()))
            }
            Err(e) => Err(RendererError::Surface(e.to_string())),
        }
    }
}

impl SceneRenderer for CubeRenderer {
    fn create_mesh(&mut self, shape: ShapeKind, color: Color) -> Option<MeshHandle> {
        if self.disposed {
            return None;
        }
        match shape {
            ShapeKind::Cube => {
                let handle = MeshHandle(self.next_handle);
                self.next_handle += 1;
                self.meshes.insert(
                    handle,
                    MeshInstance {
                        shape,
                        transform: Transform::IDENTITY,
                        color,
                    },
                );
                Some(handle)
            }
        }
    }

    fn set_transform(&mut self, mesh: MeshHandle, transform: &Transform) {
        if let Some(instance) = self.meshes.get_mut(&mesh) {
            instance.transform = *transform;
        }
    }

    fn set_color(&mut self, mesh: MeshHandle, color: Color) {
        if let Some(instance) = self.meshes.get_mut(&mesh) {
            instance.color = color;
        }
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) -> Result<(), RendererError> {
        let instance = self
            .meshes
            .remove(&mesh)
            .ok_or(RendererError::UnknownMesh(mesh))?;
        debug!("Destroyed {} mesh {:?}", instance.shape.name(), mesh);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.disposed {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);

        self.depth_texture.destroy();
        let (depth_texture, depth_view) = Self::create_depth_texture(&self.device, &self.surface_config);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    fn draw(&mut self) -> Result<(), RendererError> {
        if self.disposed {
            return Err(RendererError::Disposed);
        }

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
        let instance_count = self.upload_instances();

        let output = self.acquire_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..CUBE_INDICES.len() as u32, 0, 0..instance_count);
        }

        if self.show_ui {
            self.render_overlay(&mut encoder, &view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), RendererError> {
        if self.disposed {
            return Err(RendererError::Disposed);
        }
        if !self.meshes.is_empty() {
            warn!("Disposing renderer with {} live meshes", self.meshes.len());
            self.meshes.clear();
        }

        self.instance_buffer.destroy();
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.camera_buffer.destroy();
        self.depth_texture.destroy();
        self.disposed = true;
        info!("Cube renderer disposed");
        Ok(())
    }
}
