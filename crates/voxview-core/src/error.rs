//! Error types for voxview.

use thiserror::Error;

/// The main error type for voxview operations.
#[derive(Error, Debug)]
pub enum VoxviewError {
    /// Data size does not match the declared grid dimensions.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Voxel spacing has a non-positive component.
    #[error("invalid voxel spacing: ({0}, {1}, {2})")]
    InvalidSpacing(f32, f32, f32),

    /// The volume contains no voxels.
    #[error("volume is empty")]
    EmptyVolume,

    /// A threshold band with lower bound above upper bound.
    #[error("invalid threshold band: [{lower}, {upper}]")]
    InvalidThreshold { lower: f32, upper: f32 },

    /// Surface extraction produced no geometry.
    #[error("extraction produced no surface for the requested threshold band")]
    EmptySurface,

    /// A slice index beyond the extent of the selected plane axis.
    #[error("slice index {index} out of range (axis has {count} slices)")]
    SliceOutOfRange { index: u32, count: u32 },

    /// Rendering error reported by the embedding render surface.
    #[error("render error: {0}")]
    RenderError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for voxview operations.
pub type Result<T> = std::result::Result<T, VoxviewError>;
