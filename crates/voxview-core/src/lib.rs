//! Core abstractions for voxview.
//!
//! This crate provides the data model and extraction algorithms used
//! throughout voxview:
//! - [`ScalarVolume`] and [`VolumeSlice`] for volumetric image buffers
//! - [`SurfaceGeometry`] for extracted triangle surfaces
//! - Threshold iso-surface and label-boundary extraction
//! - Live-wire minimum-cost path computation on slices
//!
//! Nothing here renders; rendering-side types live in `voxview-render`.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod geometry;
pub mod label_surface;
pub mod livewire;
pub mod marching_cubes;
pub mod volume;

pub use error::{Result, VoxviewError};
pub use geometry::SurfaceGeometry;
pub use label_surface::extract_label_surface;
pub use livewire::{livewire_path, CostMap};
pub use marching_cubes::extract_threshold_surface;
pub use volume::{ScalarVolume, SlicePlane, VolumeExtent, VolumeSlice};

// Re-export glam types for convenience
pub use glam::{Mat4, UVec3, Vec2, Vec3};
