use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::animation::{AnimationController, FrameHandle, FrameScheduler};
use crate::config::{CELL_SIZE, DEFAULT_TICKS_PER_FRAME, GRID_HEIGHT, GRID_WIDTH};
use crate::fps::{FpsMeter, FrameStats};
use crate::gpu::{FrameBlit, GpuContext};
use crate::input::InteractionController;
use crate::render::Frame;
use crate::sim::{LifeEngine, SimulationPort};

/// Frame scheduler backed by the window's redraw mechanism.
///
/// Each `schedule` arms exactly one pending handle and requests a
/// redraw; `cancel` disarms it. A redraw that arrives with nothing
/// armed (an OS expose, or a cancelled frame the window system still
/// delivers) is treated as a plain repaint, not an animation frame.
pub struct RedrawScheduler {
    window: Arc<Window>,
    next_handle: FrameHandle,
    armed: Option<FrameHandle>,
}

impl RedrawScheduler {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_handle: 0,
            armed: None,
        }
    }

    /// Claim the pending animation frame, if one is armed.
    fn take_armed(&mut self) -> Option<FrameHandle> {
        self.armed.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.next_handle += 1;
        self.armed = Some(self.next_handle);
        self.window.request_redraw();
        self.next_handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.armed == Some(handle) {
            self.armed = None;
        }
    }
}

/// Application state: the window/GPU handles and the presentation
/// core they drive.
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    blit: Option<FrameBlit>,
    scheduler: Option<RedrawScheduler>,
    frame: Frame,
    controller: AnimationController<LifeEngine>,
    input: InteractionController,
    fps: FpsMeter,
    last_stats: Option<FrameStats>,
}

impl App {
    pub fn new() -> Self {
        let engine = LifeEngine::new(GRID_WIDTH, GRID_HEIGHT);
        Self {
            window: None,
            gpu: None,
            blit: None,
            scheduler: None,
            frame: Frame::for_grid(GRID_WIDTH, GRID_HEIGHT, CELL_SIZE),
            controller: AnimationController::new(engine, CELL_SIZE, DEFAULT_TICKS_PER_FRAME),
            input: InteractionController::new(),
            fps: FpsMeter::new(),
            last_stats: None,
        }
    }

    /// The window title doubles as the UI readout: play/pause glyph,
    /// frame-rate summary, ticks-per-frame value (or the entry buffer
    /// while it is being edited).
    fn refresh_title(&self) {
        let Some(window) = &self.window else { return };

        let glyph = if self.controller.is_running() {
            "⏸"
        } else {
            "▶"
        };
        let ticks = match self.input.entry_text() {
            Some(text) => format!("[{}_]", text),
            None => match self.controller.ticks_per_frame() {
                Some(t) => t.to_string(),
                None => "?".into(),
            },
        };
        let stats = match &self.last_stats {
            Some(s) => s.to_string(),
            None => "fps -".into(),
        };
        window.set_title(&format!(
            "life-canvas {} | {} | ticks/frame {}",
            glyph, stats, ticks
        ));
    }

    /// Paint the current state outside the animation cadence: startup,
    /// expose events, and immediate click feedback.
    fn repaint(&mut self) {
        self.controller.render(&mut self.frame);
        self.present();
    }

    fn present(&mut self) {
        let (Some(gpu), Some(blit)) = (self.gpu.as_ref(), self.blit.as_ref()) else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        blit.upload(&gpu.queue, &self.frame);
        blit.draw(&mut encoder, &view);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// One animation frame, entered through an armed redraw.
    fn run_frame(&mut self, handle: FrameHandle) {
        let Some(scheduler) = self.scheduler.as_mut() else {
            return;
        };
        let stats = self.controller.on_frame(
            handle,
            scheduler,
            &mut self.frame,
            &mut self.fps,
            Instant::now(),
        );
        if let Some(stats) = stats {
            self.last_stats = Some(stats);
            self.present();
            self.refresh_title();
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        if key == KeyCode::Escape {
            log::info!("escape pressed, exiting");
            event_loop.exit();
            return;
        }

        let Some(scheduler) = self.scheduler.as_mut() else {
            return;
        };
        let repaint = self.input.key_pressed(key, &mut self.controller, scheduler);
        if repaint {
            self.repaint();
        }
        self.refresh_title();
    }

    fn handle_click(&mut self) {
        let Some(gpu) = self.gpu.as_ref() else { return };

        let surface = winit::dpi::PhysicalSize::new(gpu.config.width, gpu.config.height);
        let repaint = self.input.click(
            surface,
            (self.frame.width(), self.frame.height()),
            CELL_SIZE,
            &mut self.controller,
        );
        if repaint {
            self.repaint();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let sim = self.controller.sim();
        log::info!(
            "grid {}x{}, cell size {} px, surface {}x{}",
            sim.width(),
            sim.height(),
            CELL_SIZE,
            self.frame.width(),
            self.frame.height()
        );

        let window_attrs = Window::default_attributes()
            .with_title("life-canvas")
            .with_inner_size(LogicalSize::new(self.frame.width(), self.frame.height()))
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("failed to create window"),
        );

        let gpu = pollster::block_on(GpuContext::new(window.clone()));
        let blit = FrameBlit::new(
            &gpu.device,
            gpu.config.format,
            self.frame.width(),
            self.frame.height(),
        );

        self.scheduler = Some(RedrawScheduler::new(window.clone()));
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.blit = Some(blit);

        log::info!("controls:");
        log::info!("  space: play/pause");
        log::info!("  click: toggle cell");
        log::info!("  t + digits: set ticks-per-frame");
        log::info!("  r: reset grid, n: randomize grid");
        log::info!("  escape: quit");

        // First paint shows the seeded grid; animation starts on demand.
        self.repaint();
        self.refresh_title();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.handle_key(event_loop, key);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor_moved(position);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.handle_click();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                let fired = self.scheduler.as_mut().and_then(RedrawScheduler::take_armed);
                match fired {
                    Some(handle) => self.run_frame(handle),
                    None => self.repaint(),
                }
            }
            _ => {}
        }
    }
}
