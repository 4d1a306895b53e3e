//! Caller-owned actors populated by the build operations.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use voxview_core::geometry::SurfaceGeometry;

use crate::transfer::{ColorTransferFunction, PiecewiseFunction};

/// A renderable surface: extracted geometry plus display state.
///
/// The geometry is populated in place by the contour builders; the actor's
/// lifetime is entirely the caller's.
#[derive(Debug, Clone)]
pub struct SurfaceActor {
    /// The triangle surface.
    pub geometry: SurfaceGeometry,
    /// Model-to-world transform.
    pub transform: Mat4,
    /// Base color.
    pub color: Vec3,
    /// Opacity in [0, 1].
    pub opacity: f32,
    /// Whether the actor is drawn.
    pub visible: bool,
}

impl SurfaceActor {
    /// Creates an empty, visible actor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the actor's geometry.
    pub fn set_geometry(&mut self, geometry: SurfaceGeometry) {
        self.geometry = geometry;
    }

    /// Empties the actor's geometry.
    pub fn clear(&mut self) {
        self.geometry.clear();
    }

    /// Returns true if the actor carries no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }
}

impl Default for SurfaceActor {
    fn default() -> Self {
        Self {
            geometry: SurfaceGeometry::default(),
            transform: Mat4::IDENTITY,
            color: Vec3::new(0.8, 0.8, 0.8),
            opacity: 1.0,
            visible: true,
        }
    }
}

/// Sample interpolation mode for volume rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Interpolation {
    /// Nearest-neighbour sampling.
    Nearest,
    /// Trilinear sampling.
    #[default]
    Linear,
}

/// Default shading and sampling settings applied when a volume actor is
/// (re)configured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumeRenderOptions {
    /// Sample interpolation mode.
    pub interpolation: Interpolation,
    /// Whether shading is applied during compositing.
    pub shade: bool,
    /// Ambient lighting coefficient.
    pub ambient: f32,
    /// Diffuse lighting coefficient.
    pub diffuse: f32,
    /// Specular lighting coefficient.
    pub specular: f32,
    /// Specular exponent.
    pub specular_power: f32,
    /// Ray sample distance in world units.
    pub sample_distance: f32,
    /// Opacity assigned at the top of the threshold band.
    pub max_opacity: f32,
}

impl Default for VolumeRenderOptions {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Linear,
            shade: true,
            ambient: 0.1,
            diffuse: 0.7,
            specular: 0.2,
            specular_power: 10.0,
            sample_distance: 1.0,
            max_opacity: 0.8,
        }
    }
}

/// A volume-rendering actor: transfer functions plus compositing settings.
///
/// Configured in place by the volume builder; holds no image data itself.
#[derive(Debug, Clone, Default)]
pub struct VolumeActor {
    /// Scalar-to-opacity transfer function.
    pub scalar_opacity: PiecewiseFunction,
    /// Scalar-to-color transfer function.
    pub color: ColorTransferFunction,
    /// Optional gradient-magnitude opacity modulation.
    pub gradient_opacity: Option<PiecewiseFunction>,
    /// Shading and sampling settings.
    pub options: VolumeRenderOptions,
    /// Whether the actor is drawn.
    pub visible: bool,
}

impl VolumeActor {
    /// Creates an unconfigured actor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    /// Resets the actor to its unconfigured state.
    pub fn clear(&mut self) {
        self.scalar_opacity.clear();
        self.color.clear();
        self.gradient_opacity = None;
        self.options = VolumeRenderOptions::default();
    }

    /// Returns true if no transfer function has been configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.scalar_opacity.points().is_empty()
    }
}
