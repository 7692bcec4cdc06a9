//! Native window host.
//!
//! Runs a winit event loop, translates window events into [`InputEvent`]s,
//! and draws each frame on the GPU through a [`GpuSurface`]. Redraw requests
//! from the controller become `Window::request_redraw`, which winit
//! delivers once per display refresh. Image decoding and diff masks run on
//! worker threads and come back as user events.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use closeup_gpu::{ClearColor, Compositor, GpuConfig, PresentOutcome};
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::PhysicalKey,
    window::{Window, WindowAttributes, WindowId},
};

use crate::constants;
use crate::diff::{DiffJob, DiffOutcome};
use crate::event::{InputEvent, KeyCode, MouseButton};
use crate::geometry::{Point, Size};
use crate::loader::{spawn_pair_loader, LoadError};
use crate::modes::ModeKind;
use crate::scheduler::FrameScheduler;
use crate::source::ImagePair;
use crate::surface::{GpuSurface, Surface};
use crate::viewport::{ViewportController, ViewportOptions};

#[derive(Debug, Error)]
pub enum NativeError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Could not create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] closeup_gpu::GpuError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Messages from worker threads to the event loop.
pub enum UserEvent {
    PairLoaded(Result<ImagePair, LoadError>),
    DiffReady(DiffOutcome),
}

/// Settings for [`run`].
#[derive(Debug, Clone)]
pub struct NativeOptions {
    pub image_a: PathBuf,
    pub image_b: PathBuf,
    pub viewport: ViewportOptions,
    /// Initial window size in logical pixels.
    pub window_size: [u32; 2],
    /// Pixels per wheel notch for line-based scroll devices.
    pub wheel_line_pixels: f32,
}

/// Schedules redraws on the window and diff jobs on worker threads.
struct WinitScheduler {
    window: Arc<Window>,
    proxy: EventLoopProxy<UserEvent>,
}

impl FrameScheduler for WinitScheduler {
    fn request_redraw(&mut self) {
        self.window.request_redraw();
    }

    fn defer(&mut self, job: DiffJob) {
        let proxy = self.proxy.clone();
        let generation = job.generation();
        let spawned = thread::Builder::new()
            .name("closeup-diff".to_string())
            .spawn(move || {
                if proxy.send_event(UserEvent::DiffReady(job.run())).is_err() {
                    log::debug!("event loop closed before diff generation {} finished", generation);
                }
            });
        if let Err(e) = spawned {
            log::error!("Failed to start diff worker: {}", e);
        }
    }
}

fn translate_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        winit::event::MouseButton::Other(n) => Some(MouseButton::Other(n)),
        _ => None,
    }
}

fn translate_key(key: winit::keyboard::KeyCode) -> Option<KeyCode> {
    use winit::keyboard::KeyCode as K;
    Some(match key {
        K::KeyA => KeyCode::A,
        K::KeyB => KeyCode::B,
        K::KeyC => KeyCode::C,
        K::KeyD => KeyCode::D,
        K::KeyE => KeyCode::E,
        K::KeyF => KeyCode::F,
        K::KeyG => KeyCode::G,
        K::KeyH => KeyCode::H,
        K::KeyI => KeyCode::I,
        K::KeyJ => KeyCode::J,
        K::KeyK => KeyCode::K,
        K::KeyL => KeyCode::L,
        K::KeyM => KeyCode::M,
        K::KeyN => KeyCode::N,
        K::KeyO => KeyCode::O,
        K::KeyP => KeyCode::P,
        K::KeyQ => KeyCode::Q,
        K::KeyR => KeyCode::R,
        K::KeyS => KeyCode::S,
        K::KeyT => KeyCode::T,
        K::KeyU => KeyCode::U,
        K::KeyV => KeyCode::V,
        K::KeyW => KeyCode::W,
        K::KeyX => KeyCode::X,
        K::KeyY => KeyCode::Y,
        K::KeyZ => KeyCode::Z,
        K::Digit0 | K::Numpad0 => KeyCode::Key0,
        K::Digit1 | K::Numpad1 => KeyCode::Key1,
        K::Digit2 | K::Numpad2 => KeyCode::Key2,
        K::Digit3 | K::Numpad3 => KeyCode::Key3,
        K::Digit4 | K::Numpad4 => KeyCode::Key4,
        K::Digit5 | K::Numpad5 => KeyCode::Key5,
        K::Digit6 | K::Numpad6 => KeyCode::Key6,
        K::Digit7 | K::Numpad7 => KeyCode::Key7,
        K::Digit8 | K::Numpad8 => KeyCode::Key8,
        K::Digit9 | K::Numpad9 => KeyCode::Key9,
        K::Space => KeyCode::Space,
        K::Tab => KeyCode::Tab,
        K::Enter | K::NumpadEnter => KeyCode::Enter,
        K::Escape => KeyCode::Escape,
        _ => return None,
    })
}

/// Wheel delta in pixels; positive zooms out.
fn wheel_pixels(delta: MouseScrollDelta, line_pixels: f32) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_x, y) => -y * line_pixels,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
    }
}

struct App {
    options: NativeOptions,
    proxy: EventLoopProxy<UserEvent>,
    window: Option<Arc<Window>>,
    surface: Option<GpuSurface>,
    controller: Option<ViewportController<WinitScheduler>>,
    /// Pair that finished loading before the window existed.
    pending_pair: Option<ImagePair>,
    cursor: Point,
    titled_mode: Option<ModeKind>,
    error: Option<NativeError>,
}

impl App {
    fn new(options: NativeOptions, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            options,
            proxy,
            window: None,
            surface: None,
            controller: None,
            pending_pair: None,
            cursor: Point::ORIGIN,
            titled_mode: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: NativeError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn surface_size(&self) -> (u32, u32) {
        self.surface.as_ref().map_or((1, 1), GpuSurface::pixel_size)
    }

    /// Start comparing once both the window and the pair are available.
    fn start_viewport(&mut self, pair: ImagePair) {
        let Some(window) = self.window.clone() else {
            self.pending_pair = Some(pair);
            return;
        };
        if let Some(controller) = self.controller.as_mut() {
            controller.set_pair(pair);
            return;
        }
        let (width, height) = self.surface_size();
        let scheduler = WinitScheduler {
            window,
            proxy: self.proxy.clone(),
        };
        log::info!("Keys: {}", self.options.viewport.bindings.help_line());
        self.controller = Some(ViewportController::create(
            pair,
            Size::from_pixels(width, height),
            self.options.viewport.clone(),
            scheduler,
        ));
    }

    fn dispatch(&mut self, event: InputEvent) {
        if let Some(controller) = self.controller.as_mut() {
            controller.handle_event(&event);
        }
    }

    fn update_title(&mut self) {
        let (Some(window), Some(controller)) = (&self.window, &self.controller) else {
            return;
        };
        let mode = controller.mode_kind();
        if self.titled_mode == Some(mode) {
            return;
        }
        let pair = controller.pair();
        window.set_title(&format!(
            "CloseUp - {} vs {} [{}]",
            pair.a.label(),
            pair.b.label(),
            mode
        ));
        self.titled_mode = Some(mode);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.update_title();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match self.controller.as_mut() {
            Some(controller) => controller.frame(surface),
            None => surface.clear(constants::BACKGROUND),
        }
        match surface.finish() {
            PresentOutcome::Presented | PresentOutcome::Inert => {}
            PresentOutcome::Skipped => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            PresentOutcome::Fatal => event_loop.exit(),
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let [w, h] = self.options.window_size;
        let attributes = WindowAttributes::default()
            .with_title("CloseUp")
            .with_inner_size(LogicalSize::new(w, h));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let background = constants::BACKGROUND.0;
        let config = GpuConfig::default().with_clear_color(ClearColor::from_rgb8(
            background[0],
            background[1],
            background[2],
        ));
        match Compositor::new(window.clone(), config) {
            Ok(compositor) => self.surface = Some(GpuSurface::new(compositor)),
            Err(e) => return self.fail(event_loop, e.into()),
        }
        self.window = Some(window.clone());
        if let Some(pair) = self.pending_pair.take() {
            self.start_viewport(pair);
        }
        window.request_redraw();
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::PairLoaded(Ok(pair)) => {
                self.start_viewport(pair);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            UserEvent::PairLoaded(Err(e)) => self.fail(event_loop, e.into()),
            UserEvent::DiffReady(outcome) => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.accept_diff(outcome);
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.resize(size.width, size.height);
                }
                let (width, height) = self.surface_size();
                if let Some(controller) = self.controller.as_mut() {
                    controller.resize(Size::from_pixels(width, height));
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Point::new(position.x as f32, position.y as f32);
                self.dispatch(InputEvent::PointerMove {
                    position: self.cursor,
                });
            }
            WindowEvent::CursorLeft { .. } => self.dispatch(InputEvent::PointerLeave),
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = translate_button(button) else {
                    return;
                };
                let position = self.cursor;
                self.dispatch(match state {
                    ElementState::Pressed => InputEvent::PointerDown { button, position },
                    ElementState::Released => InputEvent::PointerUp { button, position },
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = wheel_pixels(delta, self.options.wheel_line_pixels);
                self.dispatch(InputEvent::Wheel {
                    delta,
                    position: self.cursor,
                });
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(key) = translate_key(code) else {
                    return;
                };
                if key == KeyCode::Escape && event.state == ElementState::Pressed {
                    event_loop.exit();
                    return;
                }
                self.dispatch(match event.state {
                    ElementState::Pressed => InputEvent::KeyDown {
                        key,
                        repeat: event.repeat,
                    },
                    ElementState::Released => InputEvent::KeyUp { key },
                });
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(controller) = self.controller.take() {
            controller.destroy();
        }
    }
}

/// Open a window comparing the two images until it is closed.
pub fn run(options: NativeOptions) -> Result<(), NativeError> {
    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let proxy = event_loop.create_proxy();

    let loader_proxy = proxy.clone();
    spawn_pair_loader(
        options.image_a.clone(),
        options.image_b.clone(),
        move |result| {
            if loader_proxy.send_event(UserEvent::PairLoaded(result)).is_err() {
                log::debug!("event loop closed before images finished loading");
            }
        },
    )?;

    let mut app = App::new(options, proxy);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
