use super::{draw_region, fit_union, full_rect, place, ModeKind, RenderMode, Scene};
use crate::geometry::{Point, Rect, Size};
use crate::source::ImagePair;
use crate::surface::{Layer, Paint, Surface};
use crate::transform::{FitError, Transform};

/// Side-by-side view: A in the left half, B in the right half.
///
/// Both halves share one camera. Each frame first paints the extent of the
/// *other* image in the placeholder color so size differences stand out,
/// then its own image, clamped so it never crosses the midline.
#[derive(Debug, Default)]
pub struct TwoUp;

fn frame_width(viewport: Size) -> f32 {
    viewport.width / 2.0
}

impl RenderMode for TwoUp {
    fn kind(&self) -> ModeKind {
        ModeKind::TwoUp
    }

    fn fit(&self, transform: &mut Transform, pair: &ImagePair, viewport: Size) -> Result<(), FitError> {
        fit_union(
            transform,
            pair,
            Size::new(frame_width(viewport), viewport.height),
        )
    }

    fn draw(&self, scene: &Scene<'_>, surface: &mut dyn Surface) {
        let frame_w = frame_width(scene.viewport);
        let height = scene.viewport.height;
        let style = scene.style;
        let a = scene.pair.a.shared_pixels();
        let b = scene.pair.b.shared_pixels();

        surface.clear(style.background);

        // Left frame: A, clamped at the midline.
        let left = *scene.transform;
        let left_frame = Rect::new(0.0, 0.0, frame_w, height);
        surface.push_clip(left_frame);
        surface.fill_rect(left_frame, style.background);
        surface.fill_rect(place(&left, full_rect(b)), style.placeholder);
        let midline = left.inverse().apply_point(Point::new(frame_w, 0.0)).x;
        let visible_w = (a.width() as f32).min(midline);
        if visible_w > 0.0 {
            let src = Rect::new(0.0, 0.0, visible_w, a.height() as f32);
            draw_region(surface, Layer::A, a, src, &left, Paint::OPAQUE);
        }
        surface.pop_clip();

        // Right frame: B, starting where the midline falls in B's space.
        let right = Transform::translation(frame_w, 0.0).compose(scene.transform);
        let right_frame = Rect::new(frame_w, 0.0, frame_w, height);
        surface.push_clip(right_frame);
        surface.fill_rect(right_frame, style.background);
        surface.fill_rect(place(&right, full_rect(a)), style.placeholder);
        let start = right
            .inverse()
            .apply_point(Point::new(frame_w, 0.0))
            .x
            .max(0.0);
        let b_w = b.width() as f32;
        if start < b_w {
            let src = Rect::new(start, 0.0, b_w - start, b.height() as f32);
            draw_region(surface, Layer::B, b, src, &right, Paint::OPAQUE);
        }
        surface.pop_clip();
    }

    /// A cursor over the right frame zooms the same image point as the
    /// matching position in the left frame.
    fn zoom_origin(&self, cursor: Point, viewport: Size) -> Point {
        let frame_w = frame_width(viewport);
        if cursor.x > frame_w {
            Point::new(cursor.x - frame_w, cursor.y)
        } else {
            cursor
        }
    }
}
