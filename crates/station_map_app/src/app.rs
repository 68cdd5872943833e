// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer application setup and event loop.

use crate::panels::log::LogEvent;
use crate::panels::{LogPanel, RoutePanel};
use crate::settings::ViewerSettings;
use egui_wgpu::wgpu;
use station_map_graph::{MapViewState, StationMap};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Viewer application errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Window creation failed
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// Renderer initialization failed
    #[error("Failed to initialize renderer: {0}")]
    RendererInit(String),

    /// Event loop error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Graphics state for wgpu rendering
struct GraphicsState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
}

impl GraphicsState {
    fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| AppError::RendererInit(format!("surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| AppError::RendererInit("no suitable GPU adapter".to_string()))?;

        tracing::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Station Map Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .map_err(|e| AppError::RendererInit(format!("device: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| AppError::RendererInit("surface has no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            egui_renderer,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(
        &mut self,
        egui_ctx: &egui::Context,
        full_output: egui::FullOutput,
        window: &Window,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Station Map Encoder"),
        });

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            // egui-wgpu wants a 'static render pass; the pass is dropped before the encoder is finished
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Station Map Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 0.1,
                                g: 0.1,
                                b: 0.1,
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        Ok(())
    }
}

/// Running state of the viewer
struct ViewerRunning {
    window: Arc<Window>,
    graphics: GraphicsState,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
}

/// Map, settings and panels
struct ViewerInner {
    map: StationMap,
    settings: ViewerSettings,
    settings_path: PathBuf,
    map_view: MapViewState,
    route_panel: RoutePanel,
    log_panel: LogPanel,
}

impl ViewerInner {
    fn new(
        map: StationMap,
        settings: ViewerSettings,
        settings_path: PathBuf,
        log_rx: Option<mpsc::Receiver<LogEvent>>,
    ) -> Self {
        let mut map_view = MapViewState::new();
        map_view.show_weights = settings.show_weights;
        map_view.show_grid = settings.show_grid;

        Self {
            map,
            settings,
            settings_path,
            map_view,
            route_panel: RoutePanel::new(),
            log_panel: LogPanel::new(log_rx),
        }
    }

    fn update(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.map_view.show_weights, "Edge weights");
                    ui.checkbox(&mut self.map_view.show_grid, "Grid");
                    ui.checkbox(&mut self.map_view.show_status, "Status line");
                    ui.separator();
                    if ui.button("Reset View").clicked() {
                        self.map_view.reset_view();
                        ui.close_menu();
                    }
                    if ui.button("Save Settings").clicked() {
                        self.save_settings();
                        ui.close_menu();
                    }
                });
            });
        });

        egui::SidePanel::left("route_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                self.route_panel.ui(ui, &self.map);
                ui.add_space(8.0);
                ui.separator();
                self.log_panel.ui(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let response = self.map_view.ui(
                    ui,
                    &self.map,
                    &self.settings.style,
                    self.route_panel.result(),
                );

                if response.hovered_node.is_some() {
                    ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                if let Some(name) = response.clicked_node {
                    tracing::debug!("Selected '{}' on the map", name);
                    self.route_panel.select_node(&name);
                }
            });
    }

    fn save_settings(&mut self) {
        self.settings.show_weights = self.map_view.show_weights;
        self.settings.show_grid = self.map_view.show_grid;

        match self.settings.save(&self.settings_path) {
            Ok(()) => tracing::info!("Saved settings to {}", self.settings_path.display()),
            Err(e) => tracing::error!("Failed to save settings to {}: {e}", self.settings_path.display()),
        }
    }
}

/// Startup inputs, consumed when the window is first created
struct ViewerStartup {
    map: StationMap,
    settings: ViewerSettings,
    settings_path: PathBuf,
    log_rx: Option<mpsc::Receiver<LogEvent>>,
}

/// Main viewer application
pub struct MapApp {
    startup: Option<ViewerStartup>,
    viewer: Option<ViewerInner>,
    running: Option<ViewerRunning>,
}

impl MapApp {
    /// Create a new viewer application
    pub fn new(
        map: StationMap,
        settings: ViewerSettings,
        settings_path: PathBuf,
        log_rx: Option<mpsc::Receiver<LogEvent>>,
    ) -> Self {
        Self {
            startup: Some(ViewerStartup {
                map,
                settings,
                settings_path,
                log_rx,
            }),
            viewer: None,
            running: None,
        }
    }

    /// Run the viewer until its window is closed
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = self;
        event_loop.run_app(&mut app)?;

        Ok(())
    }

    fn create_running(&self, event_loop: &ActiveEventLoop, startup: &ViewerStartup) -> Result<ViewerRunning> {
        let window_settings = &startup.settings.window;
        let window_attrs = Window::default_attributes()
            .with_title(format!("{} - {}", window_settings.title, startup.map.name))
            .with_inner_size(winit::dpi::LogicalSize::new(
                window_settings.size[0],
                window_settings.size[1],
            ))
            .with_min_inner_size(winit::dpi::LogicalSize::new(
                window_settings.min_size[0],
                window_settings.min_size[1],
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| AppError::WindowCreation(e.to_string()))?,
        );

        tracing::info!("Initializing graphics...");
        let graphics = GraphicsState::new(window.clone())?;

        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(egui::Visuals::dark());

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1024), // max texture side
        );

        Ok(ViewerRunning {
            window,
            graphics,
            egui_ctx,
            egui_state,
        })
    }
}

impl ApplicationHandler for MapApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        let Some(startup) = self.startup.take() else {
            return;
        };

        tracing::info!("Creating viewer window...");

        let running = match self.create_running(event_loop, &startup) {
            Ok(running) => running,
            Err(e) => {
                tracing::error!("{e}");
                event_loop.exit();
                return;
            }
        };

        tracing::info!(
            "Viewer ready: '{}' with {} locations and {} connections",
            startup.map.name,
            startup.map.node_count(),
            startup.map.edge_count()
        );

        let ViewerStartup {
            map,
            settings,
            settings_path,
            log_rx,
        } = startup;
        self.viewer = Some(ViewerInner::new(map, settings, settings_path, log_rx));
        self.running = Some(running);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(running), Some(viewer)) = (&mut self.running, &mut self.viewer) else {
            return;
        };

        // Let egui handle the event
        let response = running.egui_state.on_window_event(&running.window, &event);
        if response.repaint {
            running.window.request_redraw();
        }
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {:?}", new_size);
                running.graphics.resize(new_size);
                running.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let raw_input = running.egui_state.take_egui_input(&running.window);
                let full_output = running.egui_ctx.run(raw_input, |ctx| viewer.update(ctx));

                running
                    .egui_state
                    .handle_platform_output(&running.window, full_output.platform_output.clone());

                let repaint_soon = full_output
                    .viewport_output
                    .get(&egui::ViewportId::ROOT)
                    .is_some_and(|v| v.repaint_delay.is_zero());

                match running.graphics.render(&running.egui_ctx, full_output, &running.window) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = running.window.inner_size();
                        running.graphics.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("Out of GPU memory!");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("Surface timeout");
                    }
                }

                if repaint_soon {
                    running.window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
