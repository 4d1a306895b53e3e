//! voxview: a Rust-native toolkit for volumetric image viewing.
//!
//! voxview glues volumetric scalar images to a 3D viewer: it extracts
//! iso-surface and label-boundary actors, configures volume-rendering
//! transfer functions, captures the rendered scene to disk, converts between
//! viewport and world coordinates, and traces live-wire paths on image
//! slices.
//!
//! # Quick Start
//!
//! ```no_run
//! use voxview::*;
//!
//! fn main() -> Result<()> {
//!     init();
//!
//!     // A caller-owned volume and actor.
//!     let volume = ScalarVolume::filled(
//!         UVec3::splat(32),
//!         Vec3::ONE,
//!         Vec3::ZERO,
//!         0.0,
//!     )?;
//!     let mut actor = SurfaceActor::new();
//!
//!     // Extract the surface of everything between 100 and 200.
//!     build_contour_actor(&volume, 100.0, 200.0, &mut actor, &ContourOptions::default())?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! All operations are stateless free functions over caller-owned objects:
//!
//! - A [`Renderer`] (camera + viewport) supplies the coordinate pipeline.
//! - A [`ScalarVolume`] supplies the image data, read-only.
//! - A [`SurfaceActor`] or [`VolumeActor`] receives the build output in
//!   place.
//! - A [`RenderSurface`] supplied by the embedder produces frames for
//!   capture.

mod settings;
mod utils;

// Re-export core types
pub use voxview_core::{
    error::{Result, VoxviewError},
    geometry::SurfaceGeometry,
    livewire::CostMap,
    volume::{ScalarVolume, SlicePlane, VolumeExtent, VolumeSlice},
    Mat4, UVec3, Vec2, Vec3,
};

// Re-export render types
pub use voxview_render::{
    Camera, CaptureError, CaptureOptions, ColorTransferFunction, FrameBuffer, Interpolation,
    PiecewiseFunction, ProjectionMode, RenderSurface, Renderer, SurfaceActor, Viewport,
    VolumeActor, VolumeRenderOptions,
};

pub use settings::ViewerSettings;
pub use utils::{
    build_contour_actor, build_label_contour_actor, build_volume_actor, livewire_points,
    normalized_viewport_to_world, normalized_viewport_to_world_at_depth, screen_capture,
    viewport_to_world, viewport_to_world_at_depth, world_to_viewport, ContourOptions,
};

/// Initializes logging for the toolkit (best-effort; safe to call more than
/// once).
pub fn init() {
    let _ = env_logger::try_init();
    log::info!("voxview {} initialized", env!("CARGO_PKG_VERSION"));
}
