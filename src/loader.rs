//! Decoding image files into [`SourceImage`]s.
//!
//! Decoding stays outside the comparison core. [`spawn_pair_loader`] runs it
//! on a named background thread and reports through a callback, so a
//! windowed host can keep its event loop responsive while large files load.

use std::path::{Path, PathBuf};
use std::thread;

use thiserror::Error;
use web_time::Instant;

use crate::source::{ImagePair, SourceImage};

/// File extensions the loader accepts in file dialogs.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff", "tif", "webp"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {label}: {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{label} has no pixels")]
    Empty { label: String },

    #[error("Failed to start loader thread: {0}")]
    Thread(std::io::Error),
}

fn label_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decode an in-memory encoded image.
pub fn decode_source_image(label: impl Into<String>, bytes: &[u8]) -> Result<SourceImage, LoadError> {
    let label = label.into();
    let pixels = match image::load_from_memory(bytes) {
        Ok(img) => img.to_rgba8(),
        Err(source) => return Err(LoadError::Decode { label, source }),
    };
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(LoadError::Empty { label });
    }
    Ok(SourceImage::new(label, pixels))
}

pub fn load_source_image(path: &Path) -> Result<SourceImage, LoadError> {
    let start = Instant::now();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decode_source_image(label_for(path), &bytes)?;
    log::info!(
        "Loaded {} ({}x{}) in {:.1}ms",
        image.label(),
        image.width(),
        image.height(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(image)
}

pub fn load_pair(a: &Path, b: &Path) -> Result<ImagePair, LoadError> {
    Ok(ImagePair::new(load_source_image(a)?, load_source_image(b)?))
}

/// Load both images on a background thread and hand the result to `on_done`
/// (called on that thread).
pub fn spawn_pair_loader<F>(a: PathBuf, b: PathBuf, on_done: F) -> Result<thread::JoinHandle<()>, LoadError>
where
    F: FnOnce(Result<ImagePair, LoadError>) + Send + 'static,
{
    thread::Builder::new()
        .name("closeup-loader".to_string())
        .spawn(move || {
            log::debug!("loading pair {:?} / {:?}", a, b);
            on_done(load_pair(&a, &b));
        })
        .map_err(LoadError::Thread)
}
