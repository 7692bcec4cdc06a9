//! The viewport controller: camera, active mode, and input routing.
//!
//! A controller is an explicit value created for one viewport and one image
//! pair. Input events mutate the camera and the mode's private state, then
//! ask the scheduler for a redraw; the redraw itself happens only when the
//! host calls [`ViewportController::frame`]. Between two frames any number
//! of events result in exactly one redraw request.

use crate::config::AppConfig;
use crate::diff::{DiffCache, DiffMasks, DiffOutcome};
use crate::event::{InputEvent, KeyCode, MouseButton};
use crate::geometry::{Point, Size};
use crate::keybindings::{KeyAction, KeyBindings};
use crate::modes::{DiffMode, ModeKind, RenderMode, Scene, Style};
use crate::scheduler::{FrameScheduler, RedrawFlag};
use crate::source::ImagePair;
use crate::surface::Surface;
use crate::transform::Transform;

/// Settings a controller starts with.
#[derive(Debug, Clone, Default)]
pub struct ViewportOptions {
    pub mode: ModeKind,
    pub style: Style,
    pub bindings: KeyBindings,
}

impl ViewportOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            mode: config.preferences.initial_mode,
            style: Style {
                diff_threshold: config.preferences.diff_threshold,
                ..Style::default()
            },
            bindings: config.keybindings.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PointerState {
    position: Point,
    primary_down: bool,
}

pub struct ViewportController<S: FrameScheduler> {
    transform: Transform,
    mode: Box<dyn RenderMode>,
    pair: ImagePair,
    viewport: Size,
    pointer: PointerState,
    redraw: RedrawFlag,
    diff: DiffCache,
    previewing_diff: bool,
    style: Style,
    bindings: KeyBindings,
    scheduler: S,
}

impl<S: FrameScheduler> ViewportController<S> {
    /// Build the initial mode, fit the pair, and request the first frame.
    pub fn create(pair: ImagePair, viewport: Size, options: ViewportOptions, scheduler: S) -> Self {
        log::debug!(
            "viewport created: {}x{} in {} mode ({} vs {})",
            viewport.width,
            viewport.height,
            options.mode,
            pair.a.label(),
            pair.b.label()
        );
        let mut controller = Self {
            transform: Transform::identity(),
            mode: options.mode.build(viewport),
            pair,
            viewport,
            pointer: PointerState::default(),
            redraw: RedrawFlag::default(),
            diff: DiffCache::new(),
            previewing_diff: false,
            style: options.style,
            bindings: options.bindings,
            scheduler,
        };
        controller.fit();
        controller
    }

    /// Tear the controller down and hand back the scheduler.
    ///
    /// Diff jobs still in flight are orphaned; their results can no longer
    /// be delivered anywhere.
    pub fn destroy(self) -> S {
        log::debug!("viewport destroyed in {} mode", self.mode.kind());
        self.scheduler
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn pair(&self) -> &ImagePair {
        &self.pair
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn is_redraw_pending(&self) -> bool {
        self.redraw.is_pending()
    }

    pub fn is_previewing_diff(&self) -> bool {
        self.previewing_diff
    }

    pub fn diff_masks(&self) -> Option<&DiffMasks> {
        self.diff.masks()
    }

    pub fn diff_generation(&self) -> u64 {
        self.diff.generation()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The mode that draws the next frame.
    fn visible_mode(&self) -> &dyn RenderMode {
        if self.previewing_diff {
            &DiffMode
        } else {
            self.mode.as_ref()
        }
    }

    fn request_redraw(&mut self) {
        self.redraw.request(&mut self.scheduler);
    }

    /// Reset the camera for the current mode and request a redraw.
    pub fn fit(&mut self) {
        if let Err(e) = self.mode.fit(&mut self.transform, &self.pair, self.viewport) {
            log::warn!("fit to view skipped: {}", e);
        }
        self.request_redraw();
    }

    /// Replace the active mode. Selecting the current mode only re-fits.
    pub fn set_mode(&mut self, kind: ModeKind) {
        if kind != self.mode.kind() {
            log::debug!("mode {} -> {}", self.mode.kind(), kind);
            self.mode = kind.build(self.viewport);
            self.diff.invalidate();
            self.previewing_diff = false;
        }
        self.fit();
    }

    /// Show a different pair of images in the current mode.
    pub fn set_pair(&mut self, pair: ImagePair) {
        log::debug!("pair changed to {} vs {}", pair.a.label(), pair.b.label());
        self.pair = pair;
        self.diff.invalidate();
        self.fit();
    }

    pub fn resize(&mut self, viewport: Size) {
        if viewport == self.viewport {
            return;
        }
        log::debug!("viewport resized to {}x{}", viewport.width, viewport.height);
        let old = std::mem::replace(&mut self.viewport, viewport);
        self.pointer.position = self.pointer.position.clamp_to(viewport);
        self.mode.on_resize(old, viewport);
        self.fit();
    }

    /// Install finished diff masks. Results for an older pair or mode are dropped.
    pub fn accept_diff(&mut self, outcome: DiffOutcome) -> bool {
        let accepted = self.diff.accept(outcome);
        if accepted {
            self.request_redraw();
        }
        accepted
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        let viewport = self.viewport;
        match *event {
            InputEvent::PointerDown { button, position } => {
                let p = position.clamp_to(viewport);
                self.pointer.position = p;
                if button == MouseButton::Left {
                    self.pointer.primary_down = true;
                    self.transform.pan_start(p.x, p.y);
                }
                self.mode.on_mouse_down(p, button, viewport);
            }
            InputEvent::PointerMove { position } => {
                let p = position.clamp_to(viewport);
                self.pointer.position = p;
                if self.pointer.primary_down {
                    self.transform.pan_move(p.x, p.y);
                }
                self.mode.on_mouse_move(p, viewport);
            }
            InputEvent::PointerUp { button, position } => {
                let p = position.clamp_to(viewport);
                self.pointer.position = p;
                if button == MouseButton::Left {
                    self.pointer.primary_down = false;
                }
                self.mode.on_mouse_up(p, button, viewport);
            }
            InputEvent::PointerLeave => {
                self.pointer.primary_down = false;
                self.mode.on_mouse_leave();
            }
            InputEvent::Wheel { delta, position } => {
                let p = position.clamp_to(viewport);
                self.pointer.position = p;
                let origin = self.visible_mode().zoom_origin(p, viewport);
                if self.transform.zoom_toward(origin.x, origin.y, delta) {
                    log::trace!("zoom {:.3} at ({}, {})", self.transform.scale(), origin.x, origin.y);
                } else {
                    log::trace!("zoom by {} rejected at scale {:.3}", delta, self.transform.scale());
                }
                self.mode.on_wheel(p, delta, viewport);
            }
            InputEvent::KeyDown { key, repeat } => {
                self.handle_key_down(key, repeat);
                self.mode.on_key_down(key);
            }
            InputEvent::KeyUp { key } => {
                if self.bindings.action_for_key(key) == Some(KeyAction::PreviewDiff) {
                    self.previewing_diff = false;
                }
            }
        }
        self.request_redraw();
    }

    fn handle_key_down(&mut self, key: KeyCode, repeat: bool) {
        match self.bindings.action_for_key(key) {
            Some(KeyAction::FitToView) => self.fit(),
            Some(KeyAction::SelectMode(kind)) if !repeat => self.set_mode(kind),
            Some(KeyAction::PreviewDiff) => {
                if self.mode.kind() != ModeKind::Diff {
                    self.previewing_diff = true;
                }
            }
            _ => {}
        }
    }

    /// Draw one frame into `surface` and schedule diff masks if the visible
    /// mode wants them and none are cached or on the way.
    pub fn frame(&mut self, surface: &mut dyn Surface) {
        self.redraw.clear();
        if !self.viewport.is_drawable() {
            return;
        }

        let mode = self.visible_mode();
        let scene = Scene {
            transform: &self.transform,
            pair: &self.pair,
            viewport: self.viewport,
            diff: self.diff.masks(),
            style: &self.style,
        };
        mode.draw(&scene, surface);
        let needs_diff = mode.needs_diff();

        if needs_diff {
            if let Some(job) = self.diff.request(&self.pair) {
                log::debug!("scheduling diff masks (generation {})", job.generation());
                self.scheduler.defer(job);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::test_support::solid_pair;
    use crate::scheduler::TaskQueue;
    use crate::surface::{DrawList, DrawOp, Layer, Paint};

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    const VIEWPORT: Size = Size {
        width: 200.0,
        height: 100.0,
    };

    fn controller(mode: ModeKind) -> ViewportController<TaskQueue> {
        let options = ViewportOptions {
            mode,
            ..ViewportOptions::default()
        };
        ViewportController::create(solid_pair(100, 100, 100, 100), VIEWPORT, options, TaskQueue::new())
    }

    fn draw(c: &mut ViewportController<TaskQueue>) -> DrawList {
        let mut list = DrawList::new(c.viewport());
        c.frame(&mut list);
        list
    }

    fn key(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown { key, repeat: false }
    }

    #[test]
    fn test_create_fits_and_requests_first_frame() {
        let mut c = controller(ModeKind::Slide);
        // square union in a landscape viewport: scale to width
        assert!(approx_eq(c.transform().scale(), 2.0));
        assert!(approx_eq(c.transform().translate().x, 0.0));
        assert!(approx_eq(c.transform().translate().y, -50.0));
        assert!(c.is_redraw_pending());
        assert_eq!(c.scheduler_mut().take_redraw_requests(), 1);
    }

    #[test]
    fn test_burst_of_events_requests_one_redraw() {
        let mut c = controller(ModeKind::Overlay);
        draw(&mut c);
        c.scheduler_mut().take_redraw_requests();

        for x in 0..20 {
            c.handle_event(&InputEvent::PointerMove {
                position: Point::new(x as f32, 10.0),
            });
        }
        c.handle_event(&InputEvent::Wheel {
            delta: -10.0,
            position: Point::new(5.0, 5.0),
        });
        assert_eq!(c.scheduler_mut().take_redraw_requests(), 1);

        draw(&mut c);
        assert!(!c.is_redraw_pending());
        c.handle_event(&InputEvent::PointerLeave);
        assert_eq!(c.scheduler_mut().take_redraw_requests(), 1);
    }

    #[test]
    fn test_primary_drag_pans() {
        let mut c = controller(ModeKind::Slide);
        let start = c.transform().translate();
        c.handle_event(&InputEvent::PointerDown {
            button: MouseButton::Left,
            position: Point::new(10.0, 10.0),
        });
        c.handle_event(&InputEvent::PointerMove {
            position: Point::new(25.0, 4.0),
        });
        c.handle_event(&InputEvent::PointerUp {
            button: MouseButton::Left,
            position: Point::new(25.0, 4.0),
        });
        c.handle_event(&InputEvent::PointerMove {
            position: Point::new(90.0, 90.0),
        });
        let moved = c.transform().translate() - start;
        assert!(approx_eq(moved.x, 15.0));
        assert!(approx_eq(moved.y, -6.0));
    }

    #[test]
    fn test_secondary_button_does_not_pan() {
        let mut c = controller(ModeKind::Slide);
        let before = c.transform().translate();
        c.handle_event(&InputEvent::PointerDown {
            button: MouseButton::Right,
            position: Point::new(10.0, 10.0),
        });
        c.handle_event(&InputEvent::PointerMove {
            position: Point::new(60.0, 60.0),
        });
        assert_eq!(c.transform().translate(), before);
    }

    #[test]
    fn test_pointer_positions_are_clamped() {
        let mut c = controller(ModeKind::Slide);
        let start = c.transform().translate();
        c.handle_event(&InputEvent::PointerDown {
            button: MouseButton::Left,
            position: Point::new(190.0, 50.0),
        });
        c.handle_event(&InputEvent::PointerMove {
            position: Point::new(500.0, 50.0),
        });
        let moved = c.transform().translate() - start;
        assert!(approx_eq(moved.x, 10.0));
    }

    #[test]
    fn test_leave_ends_drag() {
        let mut c = controller(ModeKind::Slide);
        c.handle_event(&InputEvent::PointerDown {
            button: MouseButton::Left,
            position: Point::new(10.0, 10.0),
        });
        c.handle_event(&InputEvent::PointerLeave);
        let before = c.transform().translate();
        c.handle_event(&InputEvent::PointerMove {
            position: Point::new(80.0, 80.0),
        });
        assert_eq!(c.transform().translate(), before);
    }

    #[test]
    fn test_two_up_wheel_in_right_frame_zooms_left_equivalent() {
        let mut right = controller(ModeKind::TwoUp);
        let mut left = controller(ModeKind::TwoUp);
        right.handle_event(&InputEvent::Wheel {
            delta: -100.0,
            position: Point::new(150.0, 40.0),
        });
        left.handle_event(&InputEvent::Wheel {
            delta: -100.0,
            position: Point::new(50.0, 40.0),
        });
        assert_eq!(right.transform(), left.transform());
    }

    #[test]
    fn test_fit_key_restores_camera() {
        let mut c = controller(ModeKind::Overlay);
        let fitted = *c.transform();
        c.handle_event(&InputEvent::Wheel {
            delta: -200.0,
            position: Point::new(30.0, 30.0),
        });
        assert_ne!(c.transform().scale(), fitted.scale());
        c.handle_event(&key(KeyCode::F));
        assert_eq!(c.transform().scale(), fitted.scale());
        assert_eq!(c.transform().translate(), fitted.translate());
    }

    #[test]
    fn test_mode_keys_switch_and_refit() {
        let mut c = controller(ModeKind::Slide);
        c.handle_event(&key(KeyCode::Key1));
        assert_eq!(c.mode_kind(), ModeKind::TwoUp);
        // two-up fits into half the width
        assert!(approx_eq(c.transform().scale(), 1.0));
        assert!(approx_eq(c.transform().translate().x, 0.0));
        c.handle_event(&key(KeyCode::Key3));
        assert_eq!(c.mode_kind(), ModeKind::Overlay);
        assert!(approx_eq(c.transform().scale(), 2.0));
    }

    #[test]
    fn test_diff_is_scheduled_after_first_draw() {
        let mut c = controller(ModeKind::Diff);
        assert_eq!(c.scheduler().pending_jobs(), 0);
        let first = draw(&mut c);
        assert_eq!(first.layers(), vec![Layer::A]);
        assert_eq!(c.scheduler().pending_jobs(), 1);

        // A second frame before the result arrives does not queue another job.
        draw(&mut c);
        assert_eq!(c.scheduler().pending_jobs(), 1);

        let outcomes = c.scheduler_mut().run_jobs();
        for outcome in outcomes {
            assert!(c.accept_diff(outcome));
        }
        assert!(c.is_redraw_pending());
        let second = draw(&mut c);
        assert_eq!(
            second.layers(),
            vec![Layer::A, Layer::DiffAgainstB, Layer::DiffAgainstA]
        );
    }

    #[test]
    fn test_result_after_mode_switch_is_discarded() {
        let mut c = controller(ModeKind::Diff);
        draw(&mut c);
        c.set_mode(ModeKind::Slide);
        let outcomes = c.scheduler_mut().run_jobs();
        assert_eq!(outcomes.len(), 1);
        for outcome in outcomes {
            assert!(!c.accept_diff(outcome));
        }
        assert!(c.diff_masks().is_none());
    }

    #[test]
    fn test_result_after_pair_change_is_discarded() {
        let mut c = controller(ModeKind::Diff);
        draw(&mut c);
        c.set_pair(solid_pair(30, 30, 30, 30));
        for outcome in c.scheduler_mut().run_jobs() {
            assert!(!c.accept_diff(outcome));
        }
        draw(&mut c);
        assert_eq!(c.scheduler().pending_jobs(), 1);
    }

    #[test]
    fn test_hold_to_preview_diff() {
        let mut c = controller(ModeKind::TwoUp);
        let camera = *c.transform();
        c.handle_event(&key(KeyCode::D));
        assert!(c.is_previewing_diff());
        assert_eq!(c.mode_kind(), ModeKind::TwoUp);
        assert_eq!(*c.transform(), camera);

        let preview = draw(&mut c);
        assert_eq!(preview.layers(), vec![Layer::A]);
        assert_eq!(c.scheduler().pending_jobs(), 1);
        let generation = c.diff_generation();

        c.handle_event(&InputEvent::KeyUp { key: KeyCode::D });
        assert!(!c.is_previewing_diff());
        assert_eq!(c.diff_generation(), generation);
        let restored = draw(&mut c);
        assert_eq!(restored.layers(), vec![Layer::A, Layer::B]);
    }

    #[test]
    fn test_destroy_returns_scheduler() {
        let mut c = controller(ModeKind::Diff);
        draw(&mut c);
        let queue = c.destroy();
        assert_eq!(queue.pending_jobs(), 1);
    }

    #[test]
    fn test_resize_carries_overlay_mix() {
        let mut c = controller(ModeKind::Overlay);
        c.handle_event(&InputEvent::PointerMove {
            position: Point::new(150.0, 10.0),
        });
        c.resize(Size::new(400.0, 100.0));
        let list = draw(&mut c);
        let b_paint = list.ops().iter().find_map(|op| match op {
            DrawOp::Blit {
                layer: Layer::B,
                paint,
                ..
            } => Some(*paint),
            _ => None,
        });
        assert_eq!(b_paint, Some(Paint::Image { opacity: 0.75 }));
    }

    #[test]
    fn test_degenerate_viewport_keeps_camera() {
        let mut c = controller(ModeKind::Overlay);
        let before = *c.transform();
        c.resize(Size::new(0.0, 100.0));
        assert_eq!(*c.transform(), before);
        let list = draw(&mut c);
        assert!(list.ops().is_empty());
    }
}
