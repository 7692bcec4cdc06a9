use super::{draw_region, fit_union, full_rect, ModeKind, RenderMode, Scene};
use crate::geometry::{Point, Size};
use crate::source::ImagePair;
use crate::surface::{Layer, Paint, Surface};
use crate::transform::{FitError, Transform};

/// B blended over A; the cursor's horizontal position sets B's opacity.
#[derive(Debug, Clone)]
pub struct Overlay {
    cursor_x: f32,
}

impl Overlay {
    pub fn new(viewport: Size) -> Self {
        Self {
            cursor_x: viewport.width / 2.0,
        }
    }

    /// Opacity of B in `[0, 1]`.
    pub fn mix(&self, viewport: Size) -> f32 {
        if viewport.width > 0.0 {
            (self.cursor_x / viewport.width).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl RenderMode for Overlay {
    fn kind(&self) -> ModeKind {
        ModeKind::Overlay
    }

    fn fit(&self, transform: &mut Transform, pair: &ImagePair, viewport: Size) -> Result<(), FitError> {
        fit_union(transform, pair, viewport)
    }

    fn draw(&self, scene: &Scene<'_>, surface: &mut dyn Surface) {
        let a = scene.pair.a.shared_pixels();
        let b = scene.pair.b.shared_pixels();
        surface.clear(scene.style.background);
        draw_region(surface, Layer::A, a, full_rect(a), scene.transform, Paint::OPAQUE);
        draw_region(
            surface,
            Layer::B,
            b,
            full_rect(b),
            scene.transform,
            Paint::Image {
                opacity: self.mix(scene.viewport),
            },
        );
    }

    fn on_mouse_move(&mut self, cursor: Point, _viewport: Size) {
        self.cursor_x = cursor.x;
    }

    fn on_resize(&mut self, old: Size, new: Size) {
        self.cursor_x = Point::new(self.cursor_x, 0.0).rescale(old, new).x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::test_support::{solid_pair, BLUE, RED};
    use crate::modes::Style;
    use crate::surface::{DrawList, DrawOp, RasterSurface};

    const VIEWPORT: Size = Size {
        width: 200.0,
        height: 100.0,
    };

    #[test]
    fn test_initial_mix_is_half() {
        assert_eq!(Overlay::new(VIEWPORT).mix(VIEWPORT), 0.5);
    }

    #[test]
    fn test_mix_follows_cursor_and_clamps() {
        let mut overlay = Overlay::new(VIEWPORT);
        overlay.on_mouse_move(Point::new(50.0, 10.0), VIEWPORT);
        assert_eq!(overlay.mix(VIEWPORT), 0.25);
        overlay.on_mouse_move(Point::new(400.0, 10.0), VIEWPORT);
        assert_eq!(overlay.mix(VIEWPORT), 1.0);
        overlay.on_mouse_move(Point::new(-3.0, 10.0), VIEWPORT);
        assert_eq!(overlay.mix(VIEWPORT), 0.0);
    }

    #[test]
    fn test_resize_keeps_mix() {
        let mut overlay = Overlay::new(VIEWPORT);
        overlay.on_mouse_move(Point::new(150.0, 10.0), VIEWPORT);
        let narrow = Size::new(100.0, 100.0);
        overlay.on_resize(VIEWPORT, narrow);
        assert_eq!(overlay.mix(narrow), 0.75);
    }

    #[test]
    fn test_b_is_drawn_with_mix_opacity() {
        let mut overlay = Overlay::new(VIEWPORT);
        overlay.on_mouse_move(Point::new(150.0, 0.0), VIEWPORT);
        let pair = solid_pair(10, 10, 10, 10);
        let style = Style::default();
        let t = Transform::identity();
        let scene = Scene {
            transform: &t,
            pair: &pair,
            viewport: VIEWPORT,
            diff: None,
            style: &style,
        };
        let mut list = DrawList::new(VIEWPORT);
        overlay.draw(&scene, &mut list);
        let paints: Vec<Paint> = list
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Blit { paint, .. } => Some(*paint),
                _ => None,
            })
            .collect();
        assert_eq!(paints, vec![Paint::OPAQUE, Paint::Image { opacity: 0.75 }]);
    }

    #[test]
    fn test_extreme_mix_shows_single_image() {
        let pair = solid_pair(200, 100, 200, 100);
        let style = Style::default();
        let t = Transform::identity();
        let scene = Scene {
            transform: &t,
            pair: &pair,
            viewport: VIEWPORT,
            diff: None,
            style: &style,
        };
        let mut overlay = Overlay::new(VIEWPORT);

        overlay.on_mouse_move(Point::new(0.0, 0.0), VIEWPORT);
        let mut raster = RasterSurface::new(200, 100);
        overlay.draw(&scene, &mut raster);
        assert_eq!(*raster.pixels().get_pixel(100, 50), RED);

        overlay.on_mouse_move(Point::new(200.0, 0.0), VIEWPORT);
        let mut raster = RasterSurface::new(200, 100);
        overlay.draw(&scene, &mut raster);
        assert_eq!(*raster.pixels().get_pixel(100, 50), BLUE);
    }
}
