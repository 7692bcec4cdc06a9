use super::{draw_region, fit_union, full_rect, ModeKind, RenderMode, Scene};
use crate::geometry::Size;
use crate::source::ImagePair;
use crate::surface::{Layer, Paint, Surface};
use crate::transform::{FitError, Transform};

/// A with every changed pixel painted in the diff marker color.
///
/// Until the controller delivers masks only A is drawn.
#[derive(Debug, Default)]
pub struct DiffMode;

impl RenderMode for DiffMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Diff
    }

    fn fit(&self, transform: &mut Transform, pair: &ImagePair, viewport: Size) -> Result<(), FitError> {
        fit_union(transform, pair, viewport)
    }

    fn draw(&self, scene: &Scene<'_>, surface: &mut dyn Surface) {
        let a = scene.pair.a.shared_pixels();
        surface.clear(scene.style.background);
        draw_region(surface, Layer::A, a, full_rect(a), scene.transform, Paint::OPAQUE);

        let Some(masks) = scene.diff else {
            return;
        };
        let paint = Paint::Mask {
            color: scene.style.diff_mark,
            threshold: scene.style.diff_threshold,
        };
        for (layer, mask) in [
            (Layer::DiffAgainstB, &masks.against_b),
            (Layer::DiffAgainstA, &masks.against_a),
        ] {
            draw_region(surface, layer, mask, full_rect(mask), scene.transform, paint);
        }
    }

    fn needs_diff(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffMasks;
    use crate::modes::test_support::RED;
    use crate::modes::Style;
    use crate::source::SourceImage;
    use crate::surface::{DrawList, RasterSurface};
    use image::{Rgba, RgbaImage};

    const VIEWPORT: Size = Size {
        width: 4.0,
        height: 4.0,
    };

    fn gray_pair() -> ImagePair {
        let a = RgbaImage::from_pixel(4, 4, Rgba([128, 128, 128, 255]));
        let mut b = a.clone();
        b.put_pixel(2, 1, Rgba([128, 128, 140, 255]));
        ImagePair::new(SourceImage::new("a", a), SourceImage::new("b", b))
    }

    #[test]
    fn test_draws_only_a_without_masks() {
        let pair = gray_pair();
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
        DiffMode.draw(&scene, &mut list);
        assert_eq!(list.layers(), vec![Layer::A]);
    }

    #[test]
    fn test_changed_pixels_are_marked() {
        let pair = gray_pair();
        let masks = DiffMasks::compute(pair.a.pixels(), pair.b.pixels());
        let style = Style::default();
        let t = Transform::identity();
        let scene = Scene {
            transform: &t,
            pair: &pair,
            viewport: VIEWPORT,
            diff: Some(&masks),
            style: &style,
        };
        let mut raster = RasterSurface::new(4, 4);
        DiffMode.draw(&scene, &mut raster);
        assert_eq!(*raster.pixels().get_pixel(2, 1), RED);
        assert_eq!(raster.pixels().get_pixel(0, 0).0, [128, 128, 128, 255]);

        let mut list = DrawList::new(VIEWPORT);
        DiffMode.draw(&scene, &mut list);
        assert_eq!(
            list.layers(),
            vec![Layer::A, Layer::DiffAgainstB, Layer::DiffAgainstA]
        );
    }

    #[test]
    fn test_threshold_hides_small_changes() {
        let pair = gray_pair();
        let masks = DiffMasks::compute(pair.a.pixels(), pair.b.pixels());
        let style = Style {
            diff_threshold: 20,
            ..Style::default()
        };
        let t = Transform::identity();
        let scene = Scene {
            transform: &t,
            pair: &pair,
            viewport: VIEWPORT,
            diff: Some(&masks),
            style: &style,
        };
        let mut raster = RasterSurface::new(4, 4);
        DiffMode.draw(&scene, &mut raster);
        assert_eq!(raster.pixels().get_pixel(2, 1).0, [128, 128, 128, 255]);
    }
}
