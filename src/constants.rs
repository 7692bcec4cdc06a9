//! Global constants for the CloseUp viewer.

use image::Rgba;

/// Camera constants.
pub mod zoom {
    /// Wheel delta that maps to a zoom factor of zero (`factor = 1 - delta / DIVISOR`).
    pub const DELTA_DIVISOR: f32 = 500.0;
    /// Zooms whose resulting scale is not above this are rejected.
    pub const MIN_SCALE: f32 = 0.1;
    /// Pixels per wheel "line" when the platform reports line deltas.
    pub const WHEEL_LINE_PIXELS: f32 = 100.0;
}

/// Magnification thresholds for the sampler regimes.
pub mod sampler {
    /// Above this scale texels are snapped (crisp magnification).
    pub const CRISP_ABOVE: f32 = 2.0;
    /// Below this scale the image is pre-blurred to suppress aliasing.
    pub const BLUR_BELOW: f32 = 0.2;
}

/// Slide mode layout.
pub mod slide {
    /// The edge bands that switch the split orientation are 1/BAND_DIVISOR of the viewport.
    pub const BAND_DIVISOR: f32 = 8.0;
    /// Width of the split indicator line in pixels.
    pub const INDICATOR_WIDTH: f32 = 1.0;
}

/// Viewport background behind two-up frames.
pub const BACKGROUND: Rgba<u8> = Rgba([0xf6, 0xf6, 0xf6, 0xff]);

/// Placeholder drawn where the other image of a two-up pair would extend.
pub const PLACEHOLDER: Rgba<u8> = Rgba([0xfe, 0xcb, 0x4d, 0xff]);

/// Slide split indicator.
pub const INDICATOR: Rgba<u8> = Rgba([0xff, 0xda, 0x3a, 0xff]);

/// Highlight for changed pixels in diff mode.
pub const DIFF_MARK: Rgba<u8> = Rgba([0xff, 0x00, 0x00, 0xff]);

/// Default window size for the native viewer.
pub const DEFAULT_WINDOW_WIDTH: u32 = 1024;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 768;
