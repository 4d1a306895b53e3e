//! The convenience surface: free functions gluing volumes, actors, and the
//! renderer together.
//!
//! Every function here is a one-shot synchronous operation over caller-owned
//! objects; nothing holds state between calls.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use voxview_core::error::{Result, VoxviewError};
use voxview_core::volume::{ScalarVolume, SlicePlane, VolumeExtent};
use voxview_core::{extract_label_surface, extract_threshold_surface, livewire_path};
use voxview_render::capture::{self, CaptureError, CaptureOptions, RenderSurface};
use voxview_render::renderer::Renderer;
use voxview_render::transfer::ColorTransferFunction;
use voxview_render::{SurfaceActor, VolumeActor};

/// Options for the contour builders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ContourOptions {
    /// Laplacian smoothing passes applied to the extracted surface.
    pub smooth_iterations: u32,
    /// Restricts extraction to a sub-region; None processes the whole volume.
    pub extent: Option<VolumeExtent>,
    /// Keep every disconnected region instead of only the largest.
    pub all_regions: bool,
}

/// Renders the current scene and writes it to `filename`.
///
/// The output size is the renderer's viewport scaled by the options'
/// magnification; anti-aliasing supersamples the render 2x and filters back
/// down. The format follows the file extension.
///
/// # Errors
/// Fails when the surface cannot render, the extension is unsupported, or
/// the file cannot be written.
pub fn screen_capture(
    surface: &mut dyn RenderSurface,
    renderer: &Renderer,
    filename: &str,
    options: &CaptureOptions,
) -> std::result::Result<(), CaptureError> {
    let viewport = renderer.viewport();
    capture::capture_to_file(
        surface,
        viewport.width.round() as u32,
        viewport.height.round() as u32,
        filename,
        options,
    )
}

/// Converts a 2D viewport position (pixels) to world space at the
/// focal-plane depth.
#[must_use]
pub fn viewport_to_world(renderer: &Renderer, x: f32, y: f32) -> Vec3 {
    renderer.viewport_to_world(x, y)
}

/// Converts a viewport position with explicit NDC depth to world space.
#[must_use]
pub fn viewport_to_world_at_depth(renderer: &Renderer, x: f32, y: f32, z: f32) -> Vec3 {
    renderer.viewport_to_world_at_depth(x, y, z)
}

/// Converts a normalized [0, 1] viewport position to world space at the
/// focal-plane depth.
#[must_use]
pub fn normalized_viewport_to_world(renderer: &Renderer, x: f32, y: f32) -> Vec3 {
    renderer.normalized_viewport_to_world(x, y)
}

/// Converts a normalized [0, 1] viewport position with explicit NDC depth to
/// world space.
#[must_use]
pub fn normalized_viewport_to_world_at_depth(renderer: &Renderer, x: f32, y: f32, z: f32) -> Vec3 {
    renderer.normalized_viewport_to_world_at_depth(x, y, z)
}

/// Projects a world-space position into viewport coordinates; z is NDC depth
/// in [0, 1].
#[must_use]
pub fn world_to_viewport(renderer: &Renderer, world: Vec3) -> Vec3 {
    renderer.world_to_viewport(world)
}

/// Extracts the iso-surface of the threshold band `[lower, upper]` into the
/// actor.
///
/// The actor's previous geometry is cleared first, so a failed build never
/// leaves stale geometry behind. Unless `all_regions` is set, only the
/// largest connected region is kept.
///
/// # Errors
/// Fails with [`VoxviewError::EmptyVolume`] for an empty volume,
/// [`VoxviewError::InvalidThreshold`] for an inverted band, and
/// [`VoxviewError::EmptySurface`] when nothing crosses the threshold.
pub fn build_contour_actor(
    volume: &ScalarVolume,
    lower: f32,
    upper: f32,
    actor: &mut SurfaceActor,
    options: &ContourOptions,
) -> Result<()> {
    build_surface(volume, lower, upper, actor, options, extract_threshold_surface)
}

/// Extracts the boundary surface of a label (segmentation) volume into the
/// actor.
///
/// Labels are the rounded voxel values; walls are emitted wherever two
/// different labels (or a label and background) meet. Same failure and
/// clearing semantics as [`build_contour_actor`].
///
/// # Errors
/// Same as [`build_contour_actor`].
pub fn build_label_contour_actor(
    volume: &ScalarVolume,
    lower: f32,
    upper: f32,
    actor: &mut SurfaceActor,
    options: &ContourOptions,
) -> Result<()> {
    build_surface(volume, lower, upper, actor, options, extract_label_surface)
}

fn build_surface(
    volume: &ScalarVolume,
    lower: f32,
    upper: f32,
    actor: &mut SurfaceActor,
    options: &ContourOptions,
    extract: fn(&ScalarVolume, f32, f32, &VolumeExtent) -> voxview_core::SurfaceGeometry,
) -> Result<()> {
    actor.clear();
    if volume.is_empty() {
        return Err(VoxviewError::EmptyVolume);
    }
    if lower > upper {
        return Err(VoxviewError::InvalidThreshold { lower, upper });
    }

    let extent = options.extent.unwrap_or_else(|| volume.full_extent());
    let mut geometry = extract(volume, lower, upper, &extent);
    if geometry.is_empty() {
        return Err(VoxviewError::EmptySurface);
    }
    if !options.all_regions {
        geometry.keep_largest_region();
    }
    geometry.smooth(options.smooth_iterations);

    log::debug!(
        "built surface for band [{lower}, {upper}]: {} triangles",
        geometry.num_triangles()
    );
    actor.set_geometry(geometry);
    Ok(())
}

/// Configures a volume-rendering actor for the threshold band
/// `[lower, upper]`.
///
/// Opacity ramps linearly from 0 at `lower` to the configured maximum at
/// `upper`, the color ramp is grayscale over the band, and shading/sampling
/// are reset to the defaults. The actor is reset first; on failure it stays
/// unconfigured.
///
/// # Errors
/// Fails with [`VoxviewError::EmptyVolume`] for an empty volume and
/// [`VoxviewError::InvalidThreshold`] for an inverted band.
pub fn build_volume_actor(
    volume: &ScalarVolume,
    lower: f32,
    upper: f32,
    actor: &mut VolumeActor,
) -> Result<()> {
    actor.clear();
    if volume.is_empty() {
        return Err(VoxviewError::EmptyVolume);
    }
    if lower > upper {
        return Err(VoxviewError::InvalidThreshold { lower, upper });
    }

    let max_opacity = actor.options.max_opacity;
    actor
        .scalar_opacity
        .add_point(lower, 0.0)
        .add_point(upper, max_opacity);
    actor.color = ColorTransferFunction::grayscale_ramp(lower, upper);
    actor.visible = true;
    log::debug!("configured volume actor for band [{lower}, {upper}]");
    Ok(())
}

/// Computes a live-wire path between two world-space points on one slice of
/// the volume and appends it to `points`.
///
/// Endpoints are snapped into the slice; equal endpoints append a single
/// point. On error `points` is left untouched.
///
/// # Errors
/// Fails with [`VoxviewError::SliceOutOfRange`] for a bad slice index and
/// [`VoxviewError::EmptyVolume`] for an empty volume.
pub fn livewire_points(
    volume: &ScalarVolume,
    plane: SlicePlane,
    slice_index: u32,
    start: Vec3,
    end: Vec3,
    points: &mut Vec<Vec3>,
) -> Result<()> {
    let path = livewire_path(volume, plane, slice_index, start, end)?;
    points.extend(path);
    Ok(())
}
