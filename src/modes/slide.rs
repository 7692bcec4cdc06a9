use super::{draw_region, fit_union, full_rect, ModeKind, RenderMode, Scene};
use crate::constants::slide::{BAND_DIVISOR, INDICATOR_WIDTH};
use crate::geometry::{Point, Rect, Size};
use crate::source::ImagePair;
use crate::surface::{Layer, Paint, Surface};
use crate::transform::{FitError, Transform};

/// Direction of the line separating A from B.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitLine {
    /// A on the left, B on the right.
    Vertical,
    /// A above, B below.
    Horizontal,
}

/// Single frame with A and B split at the cursor.
///
/// Moving the cursor into the top or bottom eighth of the viewport turns the
/// split horizontal; the left or right eighth turns it vertical. Anywhere
/// else the orientation is kept.
#[derive(Debug, Clone)]
pub struct Slide {
    line: SplitLine,
    cursor: Point,
}

impl Slide {
    pub fn new(viewport: Size) -> Self {
        Self {
            line: SplitLine::Vertical,
            cursor: Point::new(viewport.width / 2.0, 0.0),
        }
    }

    pub fn line(&self) -> SplitLine {
        self.line
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }
}

fn orientation_for(cursor: Point, viewport: Size, current: SplitLine) -> SplitLine {
    let band_h = viewport.height / BAND_DIVISOR;
    let band_w = viewport.width / BAND_DIVISOR;
    if cursor.y < band_h || cursor.y > viewport.height - band_h {
        SplitLine::Horizontal
    } else if cursor.x < band_w || cursor.x > viewport.width - band_w {
        SplitLine::Vertical
    } else {
        current
    }
}

impl RenderMode for Slide {
    fn kind(&self) -> ModeKind {
        ModeKind::Slide
    }

    fn fit(&self, transform: &mut Transform, pair: &ImagePair, viewport: Size) -> Result<(), FitError> {
        fit_union(transform, pair, viewport)
    }

    fn draw(&self, scene: &Scene<'_>, surface: &mut dyn Surface) {
        let t = scene.transform;
        let a = scene.pair.a.shared_pixels();
        let b = scene.pair.b.shared_pixels();
        let (b_w, b_h) = (b.width() as f32, b.height() as f32);

        surface.clear(scene.style.background);
        draw_region(surface, Layer::A, a, full_rect(a), t, Paint::OPAQUE);

        let split = t.inverse().apply_point(self.cursor);
        let src = match self.line {
            SplitLine::Vertical => {
                let x = split.x.clamp(0.0, b_w);
                Rect::new(x, 0.0, b_w - x, b_h)
            }
            SplitLine::Horizontal => {
                let y = split.y.clamp(0.0, b_h);
                Rect::new(0.0, y, b_w, b_h - y)
            }
        };
        draw_region(surface, Layer::B, b, src, t, Paint::OPAQUE);

        let indicator = match self.line {
            SplitLine::Vertical => {
                Rect::new(self.cursor.x, 0.0, INDICATOR_WIDTH, scene.viewport.height)
            }
            SplitLine::Horizontal => {
                Rect::new(0.0, self.cursor.y, scene.viewport.width, INDICATOR_WIDTH)
            }
        };
        surface.fill_rect(indicator, scene.style.indicator);
    }

    fn on_mouse_move(&mut self, cursor: Point, viewport: Size) {
        let line = orientation_for(cursor, viewport, self.line);
        if line != self.line {
            log::trace!("slide split now {:?}", line);
        }
        self.line = line;
        self.cursor = cursor;
    }

    fn on_resize(&mut self, old: Size, new: Size) {
        self.cursor = self.cursor.rescale(old, new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::test_support::{solid_pair, BLUE, RED};
    use crate::modes::Style;
    use crate::surface::{DrawList, RasterSurface};

    const VIEWPORT: Size = Size {
        width: 100.0,
        height: 80.0,
    };

    #[test]
    fn test_initial_state() {
        let slide = Slide::new(VIEWPORT);
        assert_eq!(slide.line(), SplitLine::Vertical);
        assert_eq!(slide.cursor(), Point::new(50.0, 0.0));
    }

    #[test]
    fn test_edge_bands_pick_orientation() {
        let mut slide = Slide::new(VIEWPORT);
        slide.on_mouse_move(Point::new(50.0, 5.0), VIEWPORT);
        assert_eq!(slide.line(), SplitLine::Horizontal);
        slide.on_mouse_move(Point::new(50.0, 40.0), VIEWPORT);
        assert_eq!(slide.line(), SplitLine::Horizontal);
        slide.on_mouse_move(Point::new(3.0, 40.0), VIEWPORT);
        assert_eq!(slide.line(), SplitLine::Vertical);
        slide.on_mouse_move(Point::new(50.0, 79.0), VIEWPORT);
        assert_eq!(slide.line(), SplitLine::Horizontal);
    }

    #[test]
    fn test_resize_keeps_split_at_same_fraction() {
        let mut slide = Slide::new(VIEWPORT);
        slide.on_mouse_move(Point::new(60.0, 40.0), VIEWPORT);
        let wide = Size::new(200.0, 160.0);
        slide.on_resize(VIEWPORT, wide);
        assert_eq!(slide.cursor(), Point::new(120.0, 80.0));
        assert_eq!(slide.line(), SplitLine::Vertical);

        let pair = solid_pair(100, 80, 100, 80);
        let style = Style::default();
        let t = Transform::new(2.0, 0.0, 0.0);
        let scene = Scene {
            transform: &t,
            pair: &pair,
            viewport: wide,
            diff: None,
            style: &style,
        };
        let mut list = DrawList::new(wide);
        slide.draw(&scene, &mut list);
        let (_, src, dst) = list.blits().nth(1).unwrap();
        assert_eq!(src.x, 60.0);
        assert_eq!(dst.x, 120.0);
    }

    #[test]
    fn test_top_band_wins_in_corners() {
        let mut slide = Slide::new(VIEWPORT);
        slide.on_mouse_move(Point::new(1.0, 1.0), VIEWPORT);
        assert_eq!(slide.line(), SplitLine::Horizontal);
    }

    fn render(slide: &Slide, t: &Transform) -> RasterSurface {
        let pair = solid_pair(100, 80, 100, 80);
        let style = Style::default();
        let scene = Scene {
            transform: t,
            pair: &pair,
            viewport: VIEWPORT,
            diff: None,
            style: &style,
        };
        let mut raster = RasterSurface::new(100, 80);
        slide.draw(&scene, &mut raster);
        raster
    }

    #[test]
    fn test_cursor_near_right_edge_splits_vertically() {
        let mut slide = Slide::new(VIEWPORT);
        slide.on_mouse_move(Point::new(VIEWPORT.width - 1.0, VIEWPORT.height / 2.0), VIEWPORT);
        assert_eq!(slide.line(), SplitLine::Vertical);
        let raster = render(&slide, &Transform::identity());
        assert_eq!(*raster.pixels().get_pixel(50, 40), RED);
        assert_eq!(*raster.pixels().get_pixel(98, 40), RED);

        slide.on_mouse_move(Point::new(60.0, 40.0), VIEWPORT);
        let raster = render(&slide, &Transform::identity());
        assert_eq!(*raster.pixels().get_pixel(30, 40), RED);
        assert_eq!(*raster.pixels().get_pixel(80, 40), BLUE);
    }

    #[test]
    fn test_split_is_computed_in_image_space() {
        let mut slide = Slide::new(VIEWPORT);
        slide.on_mouse_move(Point::new(60.0, 40.0), VIEWPORT);
        let pair = solid_pair(100, 80, 100, 80);
        let style = Style::default();
        let t = Transform::new(2.0, -20.0, 0.0);
        let scene = Scene {
            transform: &t,
            pair: &pair,
            viewport: VIEWPORT,
            diff: None,
            style: &style,
        };
        let mut list = DrawList::new(VIEWPORT);
        slide.draw(&scene, &mut list);
        let (layer, src, dst) = list.blits().nth(1).unwrap();
        assert_eq!(*layer, Layer::B);
        assert_eq!(src.x, 40.0);
        assert_eq!(dst.x, 60.0);
    }

    #[test]
    fn test_split_beyond_image_draws_no_b() {
        let mut slide = Slide::new(VIEWPORT);
        slide.on_mouse_move(Point::new(95.0, 40.0), VIEWPORT);
        let pair = solid_pair(20, 20, 20, 20);
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
        slide.draw(&scene, &mut list);
        assert_eq!(list.layers(), vec![Layer::A]);
    }
}
