//! Camera mathematics shared by every comparison mode.
//!
//! A [`Transform`] is a uniform-scale similarity: `p' = scale * p + translate`.
//! There is no rotation and no independent x/y scale, so aspect ratio is
//! always preserved. The camera also remembers the last drag position
//! (`pan_anchor`) so that pointer moves can be turned into translation deltas.

use thiserror::Error;

use crate::constants::zoom::{DELTA_DIVISOR, MIN_SCALE};
use crate::geometry::{Point, Size};

/// Rejected fit-to-view request.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FitError {
    #[error("cannot fit a subject of {width}x{height}")]
    EmptySubject { width: f32, height: f32 },
    #[error("cannot fit into bounds of {width}x{height}")]
    EmptyBounds { width: f32, height: f32 },
}

/// Uniform scale + translation, plus the drag anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale: f32,
    translate_x: f32,
    translate_y: f32,
    pan_anchor: Point,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn new(scale: f32, translate_x: f32, translate_y: f32) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
            pan_anchor: Point::ORIGIN,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, x, y)
    }

    pub fn scaling(scale: f32) -> Self {
        Self::new(scale, 0.0, 0.0)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translate(&self) -> Point {
        Point::new(self.translate_x, self.translate_y)
    }

    pub fn pan_anchor(&self) -> Point {
        self.pan_anchor
    }

    /// Remember where a drag started.
    pub fn pan_start(&mut self, x: f32, y: f32) {
        self.pan_anchor = Point::new(x, y);
    }

    /// Move the image by the pointer delta since the last anchor.
    pub fn pan_move(&mut self, x: f32, y: f32) {
        self.translate_x += x - self.pan_anchor.x;
        self.translate_y += y - self.pan_anchor.y;
        self.pan_anchor = Point::new(x, y);
    }

    /// Zoom by `1 - delta / 500` keeping the viewport point `(x, y)` fixed.
    ///
    /// A zoom whose resulting scale would not stay above the zoom floor is
    /// dropped and the transform is left exactly as it was. Returns whether
    /// the zoom was applied.
    pub fn zoom_toward(&mut self, x: f32, y: f32, delta: f32) -> bool {
        let factor = 1.0 - delta / DELTA_DIVISOR;
        let candidate = Transform::translation(x, y)
            .compose(&Transform::scaling(factor))
            .compose(&Transform::translation(-x, -y))
            .compose(self);

        let finite = candidate.scale.is_finite()
            && candidate.translate_x.is_finite()
            && candidate.translate_y.is_finite();
        if !finite || candidate.scale <= MIN_SCALE {
            log::trace!(
                "zoom rejected: scale {} -> {} (delta {})",
                self.scale,
                candidate.scale,
                delta
            );
            return false;
        }

        self.scale = candidate.scale;
        self.translate_x = candidate.translate_x;
        self.translate_y = candidate.translate_y;
        true
    }

    /// Place a `subject_w x subject_h` image centered inside the bounds,
    /// as large as possible without cropping.
    ///
    /// Portrait subjects (taller than wide) fill the bounds height and are
    /// centered horizontally; everything else fills the width and is centered
    /// vertically. Degenerate sizes are rejected without touching `self`.
    pub fn fit(
        &mut self,
        subject_w: f32,
        subject_h: f32,
        bounds_w: f32,
        bounds_h: f32,
    ) -> Result<(), FitError> {
        if !Size::new(subject_w, subject_h).is_drawable() {
            return Err(FitError::EmptySubject {
                width: subject_w,
                height: subject_h,
            });
        }
        if !Size::new(bounds_w, bounds_h).is_drawable() {
            return Err(FitError::EmptyBounds {
                width: bounds_w,
                height: bounds_h,
            });
        }

        if subject_h > subject_w {
            self.scale = bounds_h / subject_h;
            self.translate_x = bounds_w / 2.0 - subject_w * self.scale / 2.0;
            self.translate_y = 0.0;
        } else {
            self.scale = bounds_w / subject_w;
            self.translate_x = 0.0;
            self.translate_y = bounds_h / 2.0 - subject_h * self.scale / 2.0;
        }
        Ok(())
    }

    /// Map from viewport space back to image-local space.
    pub fn inverse(&self) -> Transform {
        let inv = 1.0 / self.scale;
        Transform {
            scale: inv,
            translate_x: -self.translate_x * inv,
            translate_y: -self.translate_y * inv,
            pan_anchor: self.pan_anchor,
        }
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    ///
    /// The result carries `self`'s pan anchor.
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform {
            scale: self.scale * other.scale,
            translate_x: self.scale * other.translate_x + self.translate_x,
            translate_y: self.scale * other.translate_y + self.translate_y,
            pan_anchor: self.pan_anchor,
        }
    }

    pub fn apply_point(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }

    /// Scale a direction or extent; translation does not apply.
    pub fn apply_vector(&self, v: Point) -> Point {
        Point::new(v.x * self.scale, v.y * self.scale)
    }
}
