//! Rendering-side types for voxview.
//!
//! This crate provides everything that touches the view side of the toolkit:
//! - [`Camera`] and [`Renderer`] with the viewport/world coordinate pipeline
//! - [`FrameBuffer`], [`RenderSurface`], and screen capture
//! - Transfer functions and the caller-owned [`SurfaceActor`] / [`VolumeActor`]
//!
//! Rasterization itself is the embedder's concern: capture drives a
//! [`RenderSurface`] supplied by the application.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod camera;
pub mod capture;
pub mod renderer;
pub mod transfer;

pub use actor::{Interpolation, SurfaceActor, VolumeActor, VolumeRenderOptions};
pub use camera::{Camera, ProjectionMode};
pub use capture::{capture_to_file, encode_png, CaptureError, CaptureOptions, FrameBuffer, RenderSurface};
pub use renderer::{Renderer, Viewport};
pub use transfer::{ColorTransferFunction, PiecewiseFunction};
