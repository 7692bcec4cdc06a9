//! CloseUp - two-image comparison viewer
//!
//! Shows a pair of images under one shared pan/zoom camera in one of four
//! modes: side by side (two-up), split by a draggable line (slide), blended
//! by cursor position (overlay), or as a per-pixel difference mask (diff).
//!
//! The comparison core ([`viewport`], [`modes`], [`transform`], [`diff`]) is
//! free of windowing code. It draws into any [`surface::Surface`] and asks a
//! [`scheduler::FrameScheduler`] for redraws, so the same controller runs in
//! a window ([`native`]) or headlessly ([`snapshot`]).

pub mod config;
pub mod constants;
pub mod diff;
pub mod event;
pub mod geometry;
pub mod keybindings;
pub mod loader;
pub mod modes;
pub mod sampler;
pub mod scheduler;
pub mod snapshot;
pub mod source;
pub mod surface;
pub mod transform;
pub mod viewport;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
