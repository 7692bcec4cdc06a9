//! Decoded images handed to the viewer.

use std::sync::Arc;

use image::RgbaImage;

use crate::geometry::Size;

/// A decoded RGBA image plus the name it is shown under.
///
/// Pixels sit behind an `Arc` so diff jobs can read them from a worker
/// thread while the viewer keeps drawing.
#[derive(Debug, Clone)]
pub struct SourceImage {
    label: String,
    pixels: Arc<RgbaImage>,
}

impl SourceImage {
    pub fn new(label: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            label: label.into(),
            pixels: Arc::new(pixels),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// The shared pixel buffer. Two handles are the same image exactly
    /// when `Arc::ptr_eq` holds.
    pub fn shared_pixels(&self) -> &Arc<RgbaImage> {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::from_pixels(self.width(), self.height())
    }
}

/// The two images being compared. `a` is the reference, `b` the candidate.
#[derive(Debug, Clone)]
pub struct ImagePair {
    pub a: SourceImage,
    pub b: SourceImage,
}

impl ImagePair {
    pub fn new(a: SourceImage, b: SourceImage) -> Self {
        Self { a, b }
    }

    /// Union bounding box of both images anchored at the origin.
    pub fn union_size(&self) -> Size {
        self.a.size().union(self.b.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_size_covers_both() {
        let pair = ImagePair::new(
            SourceImage::new("a", RgbaImage::new(40, 10)),
            SourceImage::new("b", RgbaImage::new(20, 30)),
        );
        assert_eq!(pair.union_size(), Size::new(40.0, 30.0));
    }

    #[test]
    fn test_clones_share_pixels() {
        let img = SourceImage::new("a", RgbaImage::new(4, 4));
        let copy = img.clone();
        assert!(Arc::ptr_eq(img.shared_pixels(), copy.shared_pixels()));
        assert_eq!(copy.label(), "a");
    }
}
