//! Volumetric scalar image buffers and slicing.

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoxviewError};

/// Anatomical plane selecting a 2D cross-section of a volume.
///
/// The variant names follow the medical-imaging convention: sagittal fixes the
/// x axis, coronal fixes the y axis, axial fixes the z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SlicePlane {
    /// Plane of constant x.
    Sagittal,
    /// Plane of constant y.
    Coronal,
    /// Plane of constant z.
    #[default]
    Axial,
}

impl SlicePlane {
    /// Returns the axis held fixed by this plane (0 = x, 1 = y, 2 = z).
    #[must_use]
    pub fn fixed_axis(self) -> usize {
        match self {
            SlicePlane::Sagittal => 0,
            SlicePlane::Coronal => 1,
            SlicePlane::Axial => 2,
        }
    }

    /// Returns the two in-plane axes, in (u, v) order.
    #[must_use]
    pub fn in_plane_axes(self) -> (usize, usize) {
        match self {
            SlicePlane::Sagittal => (1, 2),
            SlicePlane::Coronal => (0, 2),
            SlicePlane::Axial => (0, 1),
        }
    }

    /// Converts from a plane index (0 = sagittal, 1 = coronal, 2 = axial).
    /// Out-of-range indices map to axial.
    #[must_use]
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => SlicePlane::Sagittal,
            1 => SlicePlane::Coronal,
            _ => SlicePlane::Axial,
        }
    }
}

/// An inclusive voxel-index box restricting an operation to a sub-region of a
/// volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeExtent {
    /// Minimum corner (inclusive).
    pub min: UVec3,
    /// Maximum corner (inclusive).
    pub max: UVec3,
}

impl VolumeExtent {
    /// Creates an extent from inclusive corner indices.
    #[must_use]
    pub fn new(min: UVec3, max: UVec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Creates an extent from the `[i0, i1, j0, j1, k0, k1]` array form used
    /// by image-processing interfaces.
    #[must_use]
    pub fn from_array(ext: [u32; 6]) -> Self {
        Self::new(
            UVec3::new(ext[0], ext[2], ext[4]),
            UVec3::new(ext[1], ext[3], ext[5]),
        )
    }

    /// Returns the number of nodes along each axis.
    #[must_use]
    pub fn node_dims(&self) -> UVec3 {
        self.max - self.min + UVec3::ONE
    }

    /// Returns the total number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> u64 {
        let d = self.node_dims();
        u64::from(d.x) * u64::from(d.y) * u64::from(d.z)
    }

    /// Returns true if the voxel index lies inside the extent.
    #[must_use]
    pub fn contains(&self, p: UVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Clamps this extent to the valid index range of the given volume.
    #[must_use]
    pub fn clamped_to(&self, volume: &ScalarVolume) -> Self {
        let hi = volume.dims().saturating_sub(UVec3::ONE);
        Self {
            min: self.min.min(hi),
            max: self.max.min(hi),
        }
    }
}

/// An owned 3D scalar grid with world-space geometry.
///
/// Samples live on grid nodes; `spacing` is the world distance between
/// adjacent nodes and `origin` the world position of node (0, 0, 0). Data is
/// stored x-fastest: the value for node (i, j, k) is at
/// `i + j * nx + k * nx * ny`.
#[derive(Debug, Clone)]
pub struct ScalarVolume {
    dims: UVec3,
    spacing: Vec3,
    origin: Vec3,
    data: Vec<f32>,
}

impl ScalarVolume {
    /// Creates a volume from raw samples.
    ///
    /// # Errors
    /// Returns [`VoxviewError::SizeMismatch`] if `data.len()` does not equal
    /// the product of the dimensions, and [`VoxviewError::InvalidSpacing`] if
    /// any spacing component is not strictly positive.
    pub fn new(dims: UVec3, spacing: Vec3, origin: Vec3, data: Vec<f32>) -> Result<Self> {
        let expected = dims.x as usize * dims.y as usize * dims.z as usize;
        if data.len() != expected {
            return Err(VoxviewError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        if spacing.cmple(Vec3::ZERO).any() {
            return Err(VoxviewError::InvalidSpacing(
                spacing.x, spacing.y, spacing.z,
            ));
        }
        Ok(Self {
            dims,
            spacing,
            origin,
            data,
        })
    }

    /// Creates a volume filled with a constant value.
    ///
    /// # Errors
    /// Returns [`VoxviewError::InvalidSpacing`] if any spacing component is
    /// not strictly positive.
    pub fn filled(dims: UVec3, spacing: Vec3, origin: Vec3, value: f32) -> Result<Self> {
        let n = dims.x as usize * dims.y as usize * dims.z as usize;
        Self::new(dims, spacing, origin, vec![value; n])
    }

    /// Returns the number of nodes along each axis.
    #[must_use]
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Returns the world distance between adjacent nodes.
    #[must_use]
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Returns the world position of node (0, 0, 0).
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Returns the raw sample buffer.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns a mutable view of the raw sample buffer.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns the total number of nodes.
    #[must_use]
    pub fn num_voxels(&self) -> u64 {
        u64::from(self.dims.x) * u64::from(self.dims.y) * u64::from(self.dims.z)
    }

    /// Returns true if the volume holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flattens a 3D node index to a linear index.
    #[must_use]
    pub fn flatten_index(&self, i: u32, j: u32, k: u32) -> usize {
        i as usize + j as usize * self.dims.x as usize + k as usize * self.dims.x as usize * self.dims.y as usize
    }

    /// Unflattens a linear node index to a 3D index.
    #[must_use]
    pub fn unflatten_index(&self, idx: usize) -> UVec3 {
        let nx = self.dims.x as usize;
        let ny = self.dims.y as usize;
        UVec3::new(
            (idx % nx) as u32,
            ((idx / nx) % ny) as u32,
            (idx / (nx * ny)) as u32,
        )
    }

    /// Returns the sample at node (i, j, k).
    ///
    /// # Panics
    /// Panics if the index is out of range.
    #[must_use]
    pub fn value(&self, i: u32, j: u32, k: u32) -> f32 {
        self.data[self.flatten_index(i, j, k)]
    }

    /// Sets the sample at node (i, j, k).
    ///
    /// # Panics
    /// Panics if the index is out of range.
    pub fn set_value(&mut self, i: u32, j: u32, k: u32, value: f32) {
        let idx = self.flatten_index(i, j, k);
        self.data[idx] = value;
    }

    /// Returns true if (i, j, k) addresses a node of this volume.
    #[must_use]
    pub fn contains_voxel(&self, i: i64, j: i64, k: i64) -> bool {
        i >= 0
            && j >= 0
            && k >= 0
            && i < i64::from(self.dims.x)
            && j < i64::from(self.dims.y)
            && k < i64::from(self.dims.z)
    }

    /// Maps continuous voxel coordinates to world space.
    #[must_use]
    pub fn voxel_to_world(&self, voxel: Vec3) -> Vec3 {
        self.origin + voxel * self.spacing
    }

    /// Maps world coordinates to continuous voxel coordinates.
    #[must_use]
    pub fn world_to_voxel(&self, world: Vec3) -> Vec3 {
        (world - self.origin) / self.spacing
    }

    /// Returns the (min, max) of the sample values, or (0, 0) for an empty
    /// volume.
    #[must_use]
    pub fn scalar_range(&self) -> (f32, f32) {
        let mut range: Option<(f32, f32)> = None;
        for &v in &self.data {
            range = Some(match range {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        range.unwrap_or((0.0, 0.0))
    }

    /// Returns the extent covering the whole volume.
    ///
    /// # Panics
    /// Panics if the volume is empty.
    #[must_use]
    pub fn full_extent(&self) -> VolumeExtent {
        assert!(!self.is_empty(), "empty volume has no extent");
        VolumeExtent::new(UVec3::ZERO, self.dims - UVec3::ONE)
    }

    /// Extracts the 2D cross-section of one plane at the given slice index.
    ///
    /// # Errors
    /// Returns [`VoxviewError::SliceOutOfRange`] when the index exceeds the
    /// node count of the plane's fixed axis, and [`VoxviewError::EmptyVolume`]
    /// for an empty volume.
    pub fn slice(&self, plane: SlicePlane, index: u32) -> Result<VolumeSlice> {
        if self.is_empty() {
            return Err(VoxviewError::EmptyVolume);
        }
        let axis = plane.fixed_axis();
        let count = self.dims[axis];
        if index >= count {
            return Err(VoxviewError::SliceOutOfRange { index, count });
        }

        let (ua, va) = plane.in_plane_axes();
        let dims = [self.dims[ua], self.dims[va]];
        let mut data = Vec::with_capacity(dims[0] as usize * dims[1] as usize);
        let mut p = [0u32; 3];
        p[axis] = index;
        for v in 0..dims[1] {
            for u in 0..dims[0] {
                p[ua] = u;
                p[va] = v;
                data.push(self.value(p[0], p[1], p[2]));
            }
        }

        Ok(VolumeSlice {
            plane,
            index,
            dims,
            parent_spacing: self.spacing,
            parent_origin: self.origin,
            data,
        })
    }
}

/// An owned 2D cross-section of a [`ScalarVolume`].
///
/// Keeps enough of the parent geometry to map slice pixels back to voxel and
/// world coordinates. Data is stored u-fastest.
#[derive(Debug, Clone)]
pub struct VolumeSlice {
    plane: SlicePlane,
    index: u32,
    dims: [u32; 2],
    parent_spacing: Vec3,
    parent_origin: Vec3,
    data: Vec<f32>,
}

impl VolumeSlice {
    /// Returns the plane this slice was cut along.
    #[must_use]
    pub fn plane(&self) -> SlicePlane {
        self.plane
    }

    /// Returns the slice index along the plane's fixed axis.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the (u, v) pixel dimensions.
    #[must_use]
    pub fn dims(&self) -> [u32; 2] {
        self.dims
    }

    /// Returns the raw sample buffer.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the sample at pixel (u, v).
    ///
    /// # Panics
    /// Panics if the pixel is out of range.
    #[must_use]
    pub fn value(&self, u: u32, v: u32) -> f32 {
        self.data[u as usize + v as usize * self.dims[0] as usize]
    }

    /// Maps continuous slice coordinates to continuous voxel coordinates of
    /// the parent volume.
    #[must_use]
    pub fn slice_to_voxel(&self, u: f32, v: f32) -> Vec3 {
        let (ua, va) = self.plane.in_plane_axes();
        let mut p = Vec3::ZERO;
        p[self.plane.fixed_axis()] = self.index as f32;
        p[ua] = u;
        p[va] = v;
        p
    }

    /// Maps continuous slice coordinates to world space.
    #[must_use]
    pub fn slice_to_world(&self, u: f32, v: f32) -> Vec3 {
        self.parent_origin + self.slice_to_voxel(u, v) * self.parent_spacing
    }

    /// Maps world coordinates to continuous (u, v) slice coordinates,
    /// discarding the out-of-plane component.
    #[must_use]
    pub fn world_to_slice(&self, world: Vec3) -> (f32, f32) {
        let voxel = (world - self.parent_origin) / self.parent_spacing;
        let (ua, va) = self.plane.in_plane_axes();
        (voxel[ua], voxel[va])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gradient_volume(dims: UVec3) -> ScalarVolume {
        let mut v = ScalarVolume::filled(dims, Vec3::ONE, Vec3::ZERO, 0.0).unwrap();
        for k in 0..dims.z {
            for j in 0..dims.y {
                for i in 0..dims.x {
                    v.set_value(i, j, k, (i + 10 * j + 100 * k) as f32);
                }
            }
        }
        v
    }

    #[test]
    fn test_new_rejects_size_mismatch() {
        let err = ScalarVolume::new(UVec3::new(2, 2, 2), Vec3::ONE, Vec3::ZERO, vec![0.0; 7]);
        assert!(matches!(
            err,
            Err(VoxviewError::SizeMismatch {
                expected: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_new_rejects_bad_spacing() {
        let err = ScalarVolume::filled(UVec3::splat(2), Vec3::new(1.0, 0.0, 1.0), Vec3::ZERO, 0.0);
        assert!(matches!(err, Err(VoxviewError::InvalidSpacing(..))));
    }

    #[test]
    fn test_scalar_range() {
        let volume = gradient_volume(UVec3::new(3, 3, 3));
        assert_eq!(volume.scalar_range(), (0.0, 222.0));

        let empty = ScalarVolume::new(UVec3::ZERO, Vec3::ONE, Vec3::ZERO, vec![]).unwrap();
        assert_eq!(empty.scalar_range(), (0.0, 0.0));
    }

    #[test]
    fn test_voxel_world_round_trip() {
        let volume = ScalarVolume::filled(
            UVec3::splat(4),
            Vec3::new(0.5, 1.0, 2.0),
            Vec3::new(-3.0, 7.0, 0.25),
            0.0,
        )
        .unwrap();
        let p = Vec3::new(1.5, 2.0, 3.25);
        let back = volume.world_to_voxel(volume.voxel_to_world(p));
        assert!((back - p).length() < 1e-5);
    }

    #[test]
    fn test_slice_out_of_range() {
        let volume = gradient_volume(UVec3::new(3, 4, 5));
        assert!(matches!(
            volume.slice(SlicePlane::Coronal, 4),
            Err(VoxviewError::SliceOutOfRange { index: 4, count: 4 })
        ));
    }

    #[test]
    fn test_slice_agrees_with_volume() {
        let volume = gradient_volume(UVec3::new(3, 4, 5));
        let slice = volume.slice(SlicePlane::Coronal, 2).unwrap();
        assert_eq!(slice.dims(), [3, 5]);
        for v in 0..5 {
            for u in 0..3 {
                assert_eq!(slice.value(u, v), volume.value(u, 2, v));
                let world = slice.slice_to_world(u as f32, v as f32);
                assert!((world - volume.voxel_to_world(Vec3::new(u as f32, 2.0, v as f32))).length() < 1e-6);
            }
        }
    }

    #[test]
    fn test_extent_clamp_and_contains() {
        let volume = gradient_volume(UVec3::new(3, 3, 3));
        let extent = VolumeExtent::from_array([0, 10, 1, 10, 0, 1]).clamped_to(&volume);
        assert_eq!(extent.max, UVec3::new(2, 2, 1));
        assert!(extent.contains(UVec3::new(1, 1, 0)));
        assert!(!extent.contains(UVec3::new(0, 0, 0)));
        assert_eq!(extent.node_dims(), UVec3::new(3, 2, 2));
    }

    proptest! {
        #[test]
        fn prop_flatten_unflatten_inverse(
            i in 0u32..7, j in 0u32..5, k in 0u32..6
        ) {
            let volume = ScalarVolume::filled(UVec3::new(7, 5, 6), Vec3::ONE, Vec3::ZERO, 0.0).unwrap();
            let idx = volume.flatten_index(i, j, k);
            prop_assert_eq!(volume.unflatten_index(idx), UVec3::new(i, j, k));
        }
    }
}
