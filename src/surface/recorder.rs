use super::{Blit, Color, Layer, Paint, Surface};
use crate::geometry::{Rect, Size};
use crate::sampler::SamplerRegime;

/// A recorded [`Surface`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    FillRect {
        rect: Rect,
        color: Color,
    },
    Blit {
        layer: Layer,
        src: Rect,
        dst: Rect,
        regime: SamplerRegime,
        paint: Paint,
    },
    PushClip(Rect),
    PopClip,
}

/// Surface that only remembers what was drawn.
#[derive(Debug, Clone)]
pub struct DrawList {
    size: Size,
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Blits in draw order as `(layer, src, dst)`.
    pub fn blits(&self) -> impl Iterator<Item = (&Layer, &Rect, &Rect)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Blit { layer, src, dst, .. } => Some((layer, src, dst)),
            _ => None,
        })
    }

    pub fn layers(&self) -> Vec<Layer> {
        self.blits().map(|(layer, _, _)| *layer).collect()
    }

    /// Every blit's layer paired with the regime it was drawn with.
    pub fn regimes(&self) -> Vec<(Layer, SamplerRegime)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Blit { layer, regime, .. } => Some((*layer, *regime)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for DrawList {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn blit(&mut self, blit: &Blit<'_>) {
        self.ops.push(DrawOp::Blit {
            layer: blit.layer,
            src: blit.src,
            dst: blit.dst,
            regime: blit.regime,
            paint: blit.paint,
        });
    }

    fn push_clip(&mut self, rect: Rect) {
        self.ops.push(DrawOp::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.ops.push(DrawOp::PopClip);
    }
}
