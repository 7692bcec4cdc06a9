//! Magnification-dependent sampling.
//!
//! Every image drawn by a mode is sampled according to the current camera
//! scale: snapped texels when strongly magnified, a small diagonal blur when
//! strongly minified, and plain bilinear filtering in between. Coordinates
//! are in texel space, with texel `i` covering `[i, i + 1)` and its center at
//! `i + 0.5`.

use image::RgbaImage;

use crate::constants::sampler::{BLUR_BELOW, CRISP_ABOVE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerRegime {
    /// Texel-snapped with one-screen-pixel antialiased seams.
    Crisp,
    /// Bilinear.
    Smooth,
    /// 5-tap diagonal blur of bilinear taps.
    Blur,
}

/// Boundaries (exactly 2.0 and 0.2) select [`SamplerRegime::Smooth`].
pub fn regime_for_scale(scale: f32) -> SamplerRegime {
    if scale > CRISP_ABOVE {
        SamplerRegime::Crisp
    } else if scale < BLUR_BELOW {
        SamplerRegime::Blur
    } else {
        SamplerRegime::Smooth
    }
}

const BLUR_WEIGHTS: [f32; 3] = [0.227_027_03, 0.316_216_22, 0.070_270_27];
const BLUR_OFFSETS: [f32; 3] = [0.0, 1.384_615_4, 3.230_769_3];

/// Straight (non-premultiplied) RGBA, channels in 0..=255.
pub type Texel = [f32; 4];

/// Sample `image` at texel-space position `(u, v)`.
///
/// `texels_per_pixel` is how many texels one screen pixel spans (the inverse
/// of the camera scale); only the crisp regime uses it.
pub fn sample(image: &RgbaImage, u: f32, v: f32, regime: SamplerRegime, texels_per_pixel: f32) -> Texel {
    match regime {
        SamplerRegime::Smooth => bilinear(image, u, v),
        SamplerRegime::Crisp => {
            let (su, sv) = snap(u, v, texels_per_pixel);
            bilinear(image, su, sv)
        }
        SamplerRegime::Blur => blur5(image, u, v),
    }
}

/// Pull a position onto the nearest texel center unless it lies within one
/// screen pixel of a texel seam, where it ramps linearly across the seam.
fn snap(u: f32, v: f32, texels_per_pixel: f32) -> (f32, f32) {
    let dudv = texels_per_pixel.max(f32::EPSILON);
    let axis = |p: f32| {
        let seam = (p + 0.5).floor();
        seam + ((p - seam) / dudv).clamp(-0.5, 0.5)
    };
    (axis(u), axis(v))
}

fn blur5(image: &RgbaImage, u: f32, v: f32) -> Texel {
    let mut acc = [0.0_f32; 4];
    let mut add = |offset: f32, weight: f32| {
        let t = bilinear(image, u + offset, v + offset);
        for (a, c) in acc.iter_mut().zip(t) {
            *a += c * weight;
        }
    };
    add(BLUR_OFFSETS[0], BLUR_WEIGHTS[0]);
    for (&offset, &weight) in BLUR_OFFSETS.iter().zip(&BLUR_WEIGHTS).skip(1) {
        add(offset, weight);
        add(-offset, weight);
    }
    acc
}

fn texel(image: &RgbaImage, x: i64, y: i64) -> Texel {
    let (w, h) = image.dimensions();
    let x = x.clamp(0, i64::from(w) - 1) as u32;
    let y = y.clamp(0, i64::from(h) - 1) as u32;
    let p = image.get_pixel(x, y).0;
    [
        f32::from(p[0]),
        f32::from(p[1]),
        f32::from(p[2]),
        f32::from(p[3]),
    ]
}

/// The texel containing `(u, v)`, clamped to the image.
pub fn nearest(image: &RgbaImage, u: f32, v: f32) -> Texel {
    if image.width() == 0 || image.height() == 0 {
        return [0.0; 4];
    }
    texel(image, u.floor() as i64, v.floor() as i64)
}

/// Bilinear filtering with clamp-to-edge addressing.
pub fn bilinear(image: &RgbaImage, u: f32, v: f32) -> Texel {
    if image.width() == 0 || image.height() == 0 {
        return [0.0; 4];
    }
    let x = u - 0.5;
    let y = v - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let t00 = texel(image, x0, y0);
    let t10 = texel(image, x0 + 1, y0);
    let t01 = texel(image, x0, y0 + 1);
    let t11 = texel(image, x0 + 1, y0 + 1);

    let mut out = [0.0; 4];
    for c in 0..4 {
        let top = t00[c] + (t10[c] - t00[c]) * fx;
        let bottom = t01[c] + (t11[c] - t01[c]) * fx;
        out[c] = top + (bottom - top) * fy;
    }
    out
}
