use std::sync::Arc;

use closeup_gpu::{ClearColor, Compositor, DrawCommand, DrawPaint, DrawUniform, PresentOutcome, Sampling};
use image::RgbaImage;

use super::{Blit, Color, Layer, Paint, Surface};
use crate::geometry::{Rect, Size};
use crate::sampler::SamplerRegime;

const LAYER_SLOTS: usize = 4;

fn slot(layer: Layer) -> usize {
    match layer {
        Layer::A => 0,
        Layer::B => 1,
        Layer::DiffAgainstB => 2,
        Layer::DiffAgainstA => 3,
    }
}

fn sampling(regime: SamplerRegime) -> Sampling {
    match regime {
        SamplerRegime::Crisp => Sampling::Crisp,
        SamplerRegime::Smooth => Sampling::Smooth,
        SamplerRegime::Blur => Sampling::Blur,
    }
}

fn normalized(color: Color) -> [f32; 4] {
    color.0.map(|c| f32::from(c) / 255.0)
}

fn draw_paint(paint: Paint) -> DrawPaint {
    match paint {
        Paint::Image { opacity } => DrawPaint::Image { opacity },
        Paint::Mask { color, threshold } => DrawPaint::Mask {
            color: normalized(color),
            threshold: f32::from(threshold) / 255.0,
        },
    }
}

fn clear_color(color: Color) -> ClearColor {
    let [r, g, b, a] = color.0.map(|c| f64::from(c) / 255.0);
    ClearColor { r, g, b, a }
}

/// Scale and translation taking `src` (texels) onto `dst` (pixels).
fn placement(src: &Rect, dst: &Rect) -> (f32, [f32; 2]) {
    let scale = dst.width / src.width;
    (scale, [dst.x - scale * src.x, dst.y - scale * src.y])
}

/// Pixels whose centers lie inside `clip`, as x, y, width, height.
fn scissor(clip: &Rect, width: u32, height: u32) -> Option<[u32; 4]> {
    let edge = |v: f32, max: u32| ((v - 0.5).ceil().max(0.0) as u32).min(max);
    let x0 = edge(clip.x, width);
    let y0 = edge(clip.y, height);
    let x1 = edge(clip.right(), width);
    let y1 = edge(clip.bottom(), height);
    (x0 < x1 && y0 < y1).then_some([x0, y0, x1 - x0, y1 - y0])
}

/// Records a frame as compositor draws and presents it on [`GpuSurface::finish`].
///
/// Layer images are uploaded once and kept until a different image shows up
/// for the same layer.
pub struct GpuSurface {
    compositor: Compositor,
    uploaded: [Option<Arc<RgbaImage>>; LAYER_SLOTS],
    clear: Option<ClearColor>,
    clips: Vec<Rect>,
    draws: Vec<DrawCommand>,
}

impl GpuSurface {
    pub fn new(compositor: Compositor) -> Self {
        Self {
            compositor,
            uploaded: Default::default(),
            clear: None,
            clips: Vec::new(),
            draws: Vec::new(),
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.compositor.size()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.compositor.resize(width, height);
        self.clips.clear();
    }

    /// Present the recorded frame and start a new one.
    pub fn finish(&mut self) -> PresentOutcome {
        if !self.clips.is_empty() {
            log::warn!("frame finished with {} clips still pushed", self.clips.len());
            self.clips.clear();
        }
        let draws = std::mem::take(&mut self.draws);
        self.compositor.present(self.clear.take(), &draws)
    }

    fn clip(&self) -> Rect {
        self.clips
            .last()
            .copied()
            .unwrap_or_else(|| Rect::from_size(self.size()))
    }

    fn current_scissor(&self) -> Option<[u32; 4]> {
        let (width, height) = self.compositor.size();
        scissor(&self.clip(), width, height)
    }

    /// Make sure `image` is the texture bound to `layer`.
    fn ensure_uploaded(&mut self, layer: Layer, image: &Arc<RgbaImage>) -> bool {
        let slot = slot(layer);
        if self.uploaded[slot]
            .as_ref()
            .is_some_and(|held| Arc::ptr_eq(held, image))
        {
            return true;
        }
        match self
            .compositor
            .upload_layer(slot, image.width(), image.height(), image.as_raw())
        {
            Ok(()) => {
                log::debug!("uploaded {:?} layer ({}x{})", layer, image.width(), image.height());
                self.uploaded[slot] = Some(Arc::clone(image));
                true
            }
            Err(e) => {
                log::warn!("Failed to upload {:?} layer: {}", layer, e);
                self.uploaded[slot] = None;
                false
            }
        }
    }
}

impl Surface for GpuSurface {
    fn size(&self) -> Size {
        let (width, height) = self.compositor.size();
        Size::from_pixels(width, height)
    }

    fn clear(&mut self, color: Color) {
        self.draws.clear();
        self.clear = Some(clear_color(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        let Some(scissor) = self.current_scissor() else {
            return;
        };
        let (width, height) = self.compositor.size();
        self.draws.push(DrawCommand {
            layer: None,
            uniform: DrawUniform::solid(
                [rect.x, rect.y, rect.width, rect.height],
                normalized(color),
                [width, height],
            ),
            scissor,
        });
    }

    fn blit(&mut self, blit: &Blit<'_>) {
        if blit.src.is_empty() || blit.dst.is_empty() {
            return;
        }
        let Some(scissor) = self.current_scissor() else {
            return;
        };
        if !self.ensure_uploaded(blit.layer, blit.image) {
            return;
        }
        let (scale, translate) = placement(&blit.src, &blit.dst);
        let (width, height) = self.compositor.size();
        self.draws.push(DrawCommand {
            layer: Some(slot(blit.layer)),
            uniform: DrawUniform::new(
                [blit.src.x, blit.src.y, blit.src.width, blit.src.height],
                scale,
                translate,
                [blit.image.width(), blit.image.height()],
                [width, height],
                sampling(blit.regime),
                draw_paint(blit.paint),
            ),
            scissor,
        });
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
