//! Comparison modes.
//!
//! Exactly one mode is active at a time. A mode decides how the camera is
//! fitted and how the two images (and, for [`DiffMode`], their difference
//! masks) are laid out on the surface. Modes never own the camera: the
//! viewport controller passes it in for every call, and `draw` only reads it.
//!
//! Input hooks default to no-ops; modes with cursor-driven state
//! ([`Slide`], [`Overlay`]) override the ones they need.

mod diff;
mod overlay;
mod slide;
mod two_up;

pub use diff::DiffMode;
pub use overlay::Overlay;
pub use slide::{Slide, SplitLine};
pub use two_up::TwoUp;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::diff::DiffMasks;
use crate::event::{KeyCode, MouseButton};
use crate::geometry::{Point, Rect, Size};
use crate::sampler::regime_for_scale;
use crate::source::ImagePair;
use crate::surface::{Blit, Color, Layer, Paint, Surface};
use crate::transform::{FitError, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeKind {
    #[default]
    TwoUp,
    Slide,
    Overlay,
    Diff,
}

impl ModeKind {
    pub const ALL: [ModeKind; 4] = [
        ModeKind::TwoUp,
        ModeKind::Slide,
        ModeKind::Overlay,
        ModeKind::Diff,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModeKind::TwoUp => "two-up",
            ModeKind::Slide => "slide",
            ModeKind::Overlay => "overlay",
            ModeKind::Diff => "diff",
        }
    }

    /// Fresh mode instance for a viewport of the given size.
    pub fn build(self, viewport: Size) -> Box<dyn RenderMode> {
        match self {
            ModeKind::TwoUp => Box::new(TwoUp),
            ModeKind::Slide => Box::new(Slide::new(viewport)),
            ModeKind::Overlay => Box::new(Overlay::new(viewport)),
            ModeKind::Diff => Box::new(DiffMode),
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode '{0}' (expected two-up, slide, overlay or diff)")]
pub struct ParseModeError(String);

impl FromStr for ModeKind {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "two-up" | "twoup" | "2up" => Ok(ModeKind::TwoUp),
            "slide" => Ok(ModeKind::Slide),
            "overlay" => Ok(ModeKind::Overlay),
            "diff" => Ok(ModeKind::Diff),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Colors and thresholds used while drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub background: Color,
    pub placeholder: Color,
    pub indicator: Color,
    pub diff_mark: Color,
    /// Mask alpha must exceed this for a pixel to be marked as changed.
    pub diff_threshold: u8,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: constants::BACKGROUND,
            placeholder: constants::PLACEHOLDER,
            indicator: constants::INDICATOR,
            diff_mark: constants::DIFF_MARK,
            diff_threshold: 0,
        }
    }
}

/// Everything a mode reads while drawing one frame.
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    pub transform: &'a Transform,
    pub pair: &'a ImagePair,
    pub viewport: Size,
    /// Cached difference masks, once they have been computed.
    pub diff: Option<&'a DiffMasks>,
    pub style: &'a Style,
}

pub trait RenderMode {
    fn kind(&self) -> ModeKind;

    /// Reset the camera so the pair is fully visible.
    fn fit(&self, transform: &mut Transform, pair: &ImagePair, viewport: Size) -> Result<(), FitError>;

    /// Draw one frame. Must not depend on how often it is called.
    fn draw(&self, scene: &Scene<'_>, surface: &mut dyn Surface);

    /// The point zooming should keep fixed when the wheel turns at `cursor`.
    fn zoom_origin(&self, cursor: Point, _viewport: Size) -> Point {
        cursor
    }

    /// Whether drawing uses difference masks.
    fn needs_diff(&self) -> bool {
        false
    }

    fn on_wheel(&mut self, _cursor: Point, _delta: f32, _viewport: Size) {}

    fn on_mouse_move(&mut self, _cursor: Point, _viewport: Size) {}

    fn on_mouse_down(&mut self, _cursor: Point, _button: MouseButton, _viewport: Size) {}

    fn on_mouse_up(&mut self, _cursor: Point, _button: MouseButton, _viewport: Size) {}

    fn on_mouse_leave(&mut self) {}

    /// The viewport changed size; cursor-driven state is in viewport pixels.
    fn on_resize(&mut self, _old: Size, _new: Size) {}

    fn on_key_down(&mut self, _key: KeyCode) {}
}

/// Fit the union bounding box of both images into `bounds`.
fn fit_union(transform: &mut Transform, pair: &ImagePair, bounds: Size) -> Result<(), FitError> {
    let subject = pair.union_size();
    transform.fit(subject.width, subject.height, bounds.width, bounds.height)
}

/// Where an image-local rectangle lands under `placement`.
fn place(placement: &Transform, local: Rect) -> Rect {
    let origin = placement.apply_point(Point::new(local.x, local.y));
    let extent = placement.apply_vector(Point::new(local.width, local.height));
    Rect::new(origin.x, origin.y, extent.x, extent.y)
}

/// Draw the `src` region of `image` at its placed position, sampled for the
/// placement's magnification.
fn draw_region(
    surface: &mut dyn Surface,
    layer: Layer,
    image: &Arc<RgbaImage>,
    src: Rect,
    placement: &Transform,
    paint: Paint,
) {
    if src.is_empty() {
        return;
    }
    surface.blit(&Blit {
        layer,
        image,
        src,
        dst: place(placement, src),
        regime: regime_for_scale(placement.scale()),
        paint,
    });
}

fn full_rect(image: &RgbaImage) -> Rect {
    Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_round_trip() {
        for kind in ModeKind::ALL {
            assert_eq!(kind.name().parse::<ModeKind>(), Ok(kind));
            assert_eq!(kind.build(Size::new(10.0, 10.0)).kind(), kind);
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!("sideways".parse::<ModeKind>().is_err());
    }

    #[test]
    fn test_mode_kind_serde_uses_kebab_case() {
        assert_eq!(serde_json::to_string(&ModeKind::TwoUp).unwrap(), "\"two-up\"");
    }

    #[test]
    fn test_every_blit_uses_regime_for_camera_scale() {
        use crate::sampler::SamplerRegime;
        use crate::surface::DrawList;

        let pair = test_support::solid_pair(400, 400, 400, 400);
        let masks = DiffMasks::compute(pair.a.pixels(), pair.b.pixels());
        let style = Style::default();
        let viewport = Size::new(100.0, 100.0);
        let expected_layers = |kind: ModeKind| match kind {
            ModeKind::TwoUp | ModeKind::Slide | ModeKind::Overlay => vec![Layer::A, Layer::B],
            ModeKind::Diff => vec![Layer::A, Layer::DiffAgainstB, Layer::DiffAgainstA],
        };

        for (scale, regime) in [
            (3.0, SamplerRegime::Crisp),
            (1.0, SamplerRegime::Smooth),
            (0.15, SamplerRegime::Blur),
        ] {
            let t = Transform::new(scale, 0.0, 0.0);
            let scene = Scene {
                transform: &t,
                pair: &pair,
                viewport,
                diff: Some(&masks),
                style: &style,
            };
            for kind in ModeKind::ALL {
                let mut list = DrawList::new(viewport);
                kind.build(viewport).draw(&scene, &mut list);
                let expected: Vec<(Layer, SamplerRegime)> = expected_layers(kind)
                    .into_iter()
                    .map(|layer| (layer, regime))
                    .collect();
                assert_eq!(list.regimes(), expected, "{kind} at scale {scale}");
            }
        }
    }

    #[test]
    fn test_place_maps_rect() {
        let t = Transform::new(2.0, 10.0, 5.0);
        assert_eq!(
            place(&t, Rect::new(1.0, 1.0, 3.0, 4.0)),
            Rect::new(12.0, 7.0, 6.0, 8.0)
        );
    }
}
