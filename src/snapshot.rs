//! Headless rendering of one settled frame.
//!
//! Drives a [`ViewportController`] with an in-process [`TaskQueue`]: frames
//! are drawn and deferred diff jobs run until nothing is pending, so the
//! result matches what a window shows once it has stopped updating.

use std::path::Path;

use image::RgbaImage;
use thiserror::Error;

use crate::event::InputEvent;
use crate::geometry::Size;
use crate::scheduler::TaskQueue;
use crate::source::ImagePair;
use crate::surface::RasterSurface;
use crate::viewport::{ViewportController, ViewportOptions};

/// Upper bound on frame/job rounds; a settled viewport needs at most two.
const MAX_ROUNDS: usize = 8;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot size must be non-zero, got {width}x{height}")]
    EmptySize { width: u32, height: u32 },

    #[error("Failed to write snapshot: {0}")]
    Write(#[from] image::ImageError),
}

/// Render `pair` at `width x height` after replaying `events`.
pub fn render_snapshot(
    pair: ImagePair,
    width: u32,
    height: u32,
    options: ViewportOptions,
    events: &[InputEvent],
) -> Result<RgbaImage, SnapshotError> {
    if width == 0 || height == 0 {
        return Err(SnapshotError::EmptySize { width, height });
    }
    let mut controller = ViewportController::create(
        pair,
        Size::from_pixels(width, height),
        options,
        TaskQueue::new(),
    );
    for event in events {
        controller.handle_event(event);
    }

    let mut surface = RasterSurface::new(width, height);
    for round in 0..MAX_ROUNDS {
        controller.frame(&mut surface);
        let outcomes = controller.scheduler_mut().run_jobs();
        for outcome in outcomes {
            controller.accept_diff(outcome);
        }
        if !controller.is_redraw_pending() {
            log::debug!("snapshot settled after {} frame(s)", round + 1);
            break;
        }
    }
    controller.destroy();
    Ok(surface.into_pixels())
}

/// Render and write a PNG (format chosen from the file extension).
pub fn save_snapshot(
    path: &Path,
    pair: ImagePair,
    size: Size,
    options: ViewportOptions,
) -> Result<(), SnapshotError> {
    let (width, height) = (size.width.round() as u32, size.height.round() as u32);
    let pixels = render_snapshot(pair, width, height, options, &[])?;
    pixels.save(path)?;
    log::info!("Wrote {}x{} snapshot to {:?}", width, height, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyCode;
    use crate::geometry::Point;
    use crate::modes::ModeKind;
    use crate::source::SourceImage;
    use image::Rgba;

    fn pair() -> ImagePair {
        let a = RgbaImage::from_pixel(8, 8, Rgba([20, 20, 20, 255]));
        let mut b = a.clone();
        b.put_pixel(6, 2, Rgba([220, 20, 20, 255]));
        ImagePair::new(SourceImage::new("a", a), SourceImage::new("b", b))
    }

    fn options(mode: ModeKind) -> ViewportOptions {
        ViewportOptions {
            mode,
            ..ViewportOptions::default()
        }
    }

    #[test]
    fn test_diff_snapshot_includes_masks() {
        let img = render_snapshot(pair(), 8, 8, options(ModeKind::Diff), &[]).unwrap();
        assert_eq!(img.get_pixel(6, 2).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [20, 20, 20, 255]);
    }

    #[test]
    fn test_events_are_replayed() {
        let events = [
            InputEvent::KeyDown {
                key: KeyCode::Key3,
                repeat: false,
            },
            InputEvent::PointerMove {
                position: Point::new(0.0, 4.0),
            },
        ];
        // overlay with mix 0 shows A only
        let img = render_snapshot(pair(), 8, 8, options(ModeKind::TwoUp), &events).unwrap();
        assert_eq!(img.get_pixel(6, 2).0, [20, 20, 20, 255]);
    }

    #[test]
    fn test_empty_size_is_rejected() {
        assert!(matches!(
            render_snapshot(pair(), 0, 8, options(ModeKind::Slide), &[]),
            Err(SnapshotError::EmptySize { .. })
        ));
    }
}
