//! Pixel difference masks.
//!
//! A mask has the size of its source operand. Each pixel's alpha is the
//! summed absolute RGB difference against the other image (clamped to 255),
//! and its color is pure red wherever that difference is non-zero. Pixels
//! the other image does not cover are compared against transparent black.
//!
//! Masks are computed once per image pair and can be slow for large images,
//! so the work is packaged as a [`DiffJob`] the host may run anywhere. Each
//! job carries the cache generation it was issued for; results arriving after
//! the pair or mode changed are dropped.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use web_time::Instant;

use crate::source::ImagePair;

const CHANGED: [u8; 3] = [255, 0, 0];
const UNCHANGED: [u8; 3] = [0, 0, 0];

/// Compare every pixel of `src` with the pixel at the same position in `other`.
pub fn diff_mask(src: &RgbaImage, other: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let s = src.get_pixel(x, y).0;
        let o = other.get_pixel_checked(x, y).map_or([0; 4], |p| p.0);
        let d: u32 = (0..3).map(|c| u32::from(s[c].abs_diff(o[c]))).sum();
        let [r, g, b] = if d > 0 { CHANGED } else { UNCHANGED };
        Rgba([r, g, b, d.min(255) as u8])
    })
}

/// Both directional masks of a pair.
#[derive(Debug, Clone)]
pub struct DiffMasks {
    /// `diff(A, B)`, in A's pixel space.
    pub against_b: Arc<RgbaImage>,
    /// `diff(B, A)`, in B's pixel space.
    pub against_a: Arc<RgbaImage>,
}

impl DiffMasks {
    pub fn compute(a: &RgbaImage, b: &RgbaImage) -> Self {
        Self {
            against_b: Arc::new(diff_mask(a, b)),
            against_a: Arc::new(diff_mask(b, a)),
        }
    }
}

/// A deferred mask computation for one generation of the cache.
#[derive(Debug, Clone)]
pub struct DiffJob {
    generation: u64,
    a: Arc<RgbaImage>,
    b: Arc<RgbaImage>,
}

impl DiffJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn run(self) -> DiffOutcome {
        let start = Instant::now();
        let masks = DiffMasks::compute(&self.a, &self.b);
        log::debug!(
            "diff masks for generation {} computed in {:.1}ms",
            self.generation,
            start.elapsed().as_secs_f64() * 1000.0
        );
        DiffOutcome {
            generation: self.generation,
            masks,
        }
    }
}

/// Finished masks tagged with the generation they were requested for.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    pub generation: u64,
    pub masks: DiffMasks,
}

#[derive(Debug, Default)]
enum DiffState {
    #[default]
    Empty,
    Pending,
    Ready(DiffMasks),
}

/// Masks for the current image pair, or the record that they are on the way.
#[derive(Debug, Default)]
pub struct DiffCache {
    generation: u64,
    state: DiffState,
}

impl DiffCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop cached masks and orphan any job in flight.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.state = DiffState::Empty;
    }

    /// Hand out a job unless masks are already cached or pending.
    pub fn request(&mut self, pair: &ImagePair) -> Option<DiffJob> {
        if !matches!(self.state, DiffState::Empty) {
            return None;
        }
        self.state = DiffState::Pending;
        Some(DiffJob {
            generation: self.generation,
            a: Arc::clone(pair.a.shared_pixels()),
            b: Arc::clone(pair.b.shared_pixels()),
        })
    }

    /// Install a finished job. Returns `false` for stale results.
    pub fn accept(&mut self, outcome: DiffOutcome) -> bool {
        if outcome.generation != self.generation || !matches!(self.state, DiffState::Pending) {
            log::debug!(
                "discarding diff result for generation {} (current {})",
                outcome.generation,
                self.generation
            );
            return false;
        }
        self.state = DiffState::Ready(outcome.masks);
        true
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DiffState::Pending)
    }

    pub fn masks(&self) -> Option<&DiffMasks> {
        match &self.state {
            DiffState::Ready(masks) => Some(masks),
            _ => None,
        }
    }
}
