use image::RgbaImage;

use super::{Blit, Color, Paint, Surface};
use crate::geometry::{Rect, Size};
use crate::sampler::{self, SamplerRegime, Texel};

/// CPU compositor writing into an RGBA8 image.
///
/// A pixel is covered by a shape when its center lies inside the shape and
/// the active clip.
pub struct RasterSurface {
    pixels: RgbaImage,
    clips: Vec<Rect>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            clips: Vec::new(),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    fn clip(&self) -> Rect {
        self.clips
            .last()
            .copied()
            .unwrap_or_else(|| Rect::from_size(self.size()))
    }

    /// Pixel index range whose centers fall inside `rect`.
    fn covered(&self, rect: &Rect) -> Option<(u32, u32, u32, u32)> {
        let area = rect.intersect(&self.clip());
        if area.is_empty() {
            return None;
        }
        let (w, h) = self.pixels.dimensions();
        let x0 = (area.x - 0.5).ceil().max(0.0) as u32;
        let y0 = (area.y - 0.5).ceil().max(0.0) as u32;
        let x1 = ((area.right() - 0.5).ceil().max(0.0) as u32).min(w);
        let y1 = ((area.bottom() - 0.5).ceil().max(0.0) as u32).min(h);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    fn blend(&mut self, x: u32, y: u32, src: Texel, coverage: f32) {
        let sa = (src[3] / 255.0 * coverage).clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x, y);
        let da = f32::from(dst.0[3]) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let d = f32::from(dst.0[c]);
            let v = (src[c] * sa + d * da * (1.0 - sa)) / out_a;
            dst.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

fn to_texel(color: Color) -> Texel {
    color.0.map(f32::from)
}

impl Surface for RasterSurface {
    fn size(&self) -> Size {
        Size::from_pixels(self.pixels.width(), self.pixels.height())
    }

    fn clear(&mut self, color: Color) {
        for p in self.pixels.pixels_mut() {
            *p = color;
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.covered(&rect) else {
            return;
        };
        let texel = to_texel(color);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, texel, 1.0);
            }
        }
    }

    fn blit(&mut self, blit: &Blit<'_>) {
        if blit.src.is_empty() || blit.dst.is_empty() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.covered(&blit.dst) else {
            return;
        };
        let texels_per_pixel_x = blit.src.width / blit.dst.width;
        let texels_per_pixel_y = blit.src.height / blit.dst.height;
        let texels_per_pixel = texels_per_pixel_x.max(texels_per_pixel_y);

        for y in y0..y1 {
            let v = blit.src.y + (y as f32 + 0.5 - blit.dst.y) * texels_per_pixel_y;
            for x in x0..x1 {
                let u = blit.src.x + (x as f32 + 0.5 - blit.dst.x) * texels_per_pixel_x;
                match blit.paint {
                    Paint::Image { opacity } => {
                        let texel = sampler::sample(blit.image, u, v, blit.regime, texels_per_pixel);
                        self.blend(x, y, texel, opacity);
                    }
                    Paint::Mask { color, threshold } => {
                        let alpha = match blit.regime {
                            SamplerRegime::Blur => {
                                sampler::sample(blit.image, u, v, blit.regime, texels_per_pixel)[3]
                            }
                            SamplerRegime::Crisp | SamplerRegime::Smooth => {
                                sampler::nearest(blit.image, u, v)[3]
                            }
                        };
                        if alpha > f32::from(threshold) {
                            self.blend(x, y, to_texel(color), 1.0);
                        }
                    }
                }
            }
        }
    }

    fn push_clip(&mut self, rect: Rect) {
        let clipped = rect.intersect(&self.clip());
        self.clips.push(clipped);
    }

    fn pop_clip(&mut self) {
        if self.clips.pop().is_none() {
            log::warn!("pop_clip without matching push_clip");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Layer;
    use image::Rgba;
    use std::sync::Arc;

    const RED: Color = Rgba([255, 0, 0, 255]);
    const WHITE: Color = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_fill_rect_covers_pixel_centers() {
        let mut s = RasterSurface::new(4, 4);
        s.clear(WHITE);
        s.fill_rect(Rect::new(0.6, 0.0, 1.0, 1.0), RED);
        assert_eq!(*s.pixels().get_pixel(0, 0), WHITE);
        assert_eq!(*s.pixels().get_pixel(1, 0), RED);
        assert_eq!(*s.pixels().get_pixel(2, 0), WHITE);
    }

    #[test]
    fn test_clip_limits_fill() {
        let mut s = RasterSurface::new(4, 1);
        s.clear(WHITE);
        s.push_clip(Rect::new(0.0, 0.0, 2.0, 1.0));
        s.fill_rect(Rect::new(0.0, 0.0, 4.0, 1.0), RED);
        s.pop_clip();
        assert_eq!(*s.pixels().get_pixel(1, 0), RED);
        assert_eq!(*s.pixels().get_pixel(2, 0), WHITE);
    }

    #[test]
    fn test_nested_clips_intersect() {
        let mut s = RasterSurface::new(6, 1);
        s.clear(WHITE);
        s.push_clip(Rect::new(0.0, 0.0, 4.0, 1.0));
        s.push_clip(Rect::new(2.0, 0.0, 4.0, 1.0));
        s.fill_rect(Rect::new(0.0, 0.0, 6.0, 1.0), RED);
        let row: Vec<Color> = (0..6).map(|x| *s.pixels().get_pixel(x, 0)).collect();
        assert_eq!(row, vec![WHITE, WHITE, RED, RED, WHITE, WHITE]);
    }

    #[test]
    fn test_blit_scales_image() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 255, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        let img = Arc::new(img);
        let mut s = RasterSurface::new(8, 2);
        s.blit(&Blit {
            layer: Layer::A,
            image: &img,
            src: Rect::new(0.0, 0.0, 2.0, 1.0),
            dst: Rect::new(0.0, 0.0, 8.0, 2.0),
            regime: SamplerRegime::Crisp,
            paint: Paint::OPAQUE,
        });
        assert_eq!(s.pixels().get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(s.pixels().get_pixel(7, 1).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_half_opacity_blends() {
        let img = Arc::new(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])));
        let mut s = RasterSurface::new(1, 1);
        s.clear(WHITE);
        s.blit(&Blit {
            layer: Layer::B,
            image: &img,
            src: Rect::new(0.0, 0.0, 1.0, 1.0),
            dst: Rect::new(0.0, 0.0, 1.0, 1.0),
            regime: SamplerRegime::Smooth,
            paint: Paint::Image { opacity: 0.5 },
        });
        let p = s.pixels().get_pixel(0, 0).0;
        assert!((127..=128).contains(&p[0]));
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_mask_paint_respects_threshold() {
        let mut mask = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 10]));
        mask.put_pixel(1, 0, Rgba([255, 0, 0, 200]));
        let mask = Arc::new(mask);
        let mut s = RasterSurface::new(2, 1);
        s.clear(WHITE);
        s.blit(&Blit {
            layer: Layer::DiffAgainstB,
            image: &mask,
            src: Rect::new(0.0, 0.0, 2.0, 1.0),
            dst: Rect::new(0.0, 0.0, 2.0, 1.0),
            regime: SamplerRegime::Smooth,
            paint: Paint::Mask {
                color: RED,
                threshold: 50,
            },
        });
        assert_eq!(*s.pixels().get_pixel(0, 0), WHITE);
        assert_eq!(*s.pixels().get_pixel(1, 0), RED);
    }

    #[test]
    fn test_mask_threshold_uses_nearest_texel_alpha() {
        // Bilinear alpha reaches 81 at pixel 3, left of the seam.
        let mut mask = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 10]));
        mask.put_pixel(1, 0, Rgba([255, 0, 0, 200]));
        let mask = Arc::new(mask);
        for regime in [SamplerRegime::Crisp, SamplerRegime::Smooth] {
            let mut s = RasterSurface::new(8, 1);
            s.clear(WHITE);
            s.blit(&Blit {
                layer: Layer::DiffAgainstA,
                image: &mask,
                src: Rect::new(0.0, 0.0, 2.0, 1.0),
                dst: Rect::new(0.0, 0.0, 8.0, 1.0),
                regime,
                paint: Paint::Mask {
                    color: RED,
                    threshold: 50,
                },
            });
            let row: Vec<Color> = (0..8).map(|x| *s.pixels().get_pixel(x, 0)).collect();
            assert_eq!(row[..4], [WHITE; 4], "{regime:?}");
            assert_eq!(row[4..], [RED; 4], "{regime:?}");
        }
    }
}
