//! Boundary-surface extraction for label (segmentation) volumes.
//!
//! Values are treated as discrete labels rather than a continuous field: the
//! output is the set of axis-aligned voxel faces separating voxels whose
//! rounded labels differ (a "cuberille" surface). Mesh relaxation afterwards
//! is the caller's choice, via [`SurfaceGeometry::smooth`].

use std::collections::HashMap;

use glam::Vec3;

use crate::geometry::SurfaceGeometry;
use crate::volume::{ScalarVolume, VolumeExtent};

/// The six face directions of a voxel, each with its outward axis offset and
/// the four cell-corner offsets of the face in outward-facing winding order.
const FACES: [([i64; 3], [[u32; 3]; 4]); 6] = [
    ([1, 0, 0], [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]]),
    ([-1, 0, 0], [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]]),
    ([0, 1, 0], [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]]),
    ([0, -1, 0], [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]]),
    ([0, 0, 1], [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]]),
    ([0, 0, -1], [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]]),
];

/// Extracts the boundary surface of a label volume, restricted to `extent`.
///
/// A voxel is selected when its rounded label is non-zero and lies in
/// `[lower, upper]`. For every selected voxel a wall is emitted on each face
/// whose neighbour carries a different label; between two selected voxels
/// with different labels the wall is owned by the higher label, so adjacent
/// segments meet at a single shared boundary surface. Neighbours outside the
/// extent count as background.
///
/// Vertices are in world space: each voxel spans half a spacing step around
/// its node position. Corner vertices are shared between adjacent faces.
#[must_use]
pub fn extract_label_surface(
    volume: &ScalarVolume,
    lower: f32,
    upper: f32,
    extent: &VolumeExtent,
) -> SurfaceGeometry {
    if volume.is_empty() {
        return SurfaceGeometry::default();
    }
    let extent = extent.clamped_to(volume);

    let label_of = |i: i64, j: i64, k: i64| -> f32 {
        if i < i64::from(extent.min.x)
            || j < i64::from(extent.min.y)
            || k < i64::from(extent.min.z)
            || i > i64::from(extent.max.x)
            || j > i64::from(extent.max.y)
            || k > i64::from(extent.max.z)
        {
            return 0.0;
        }
        volume.value(i as u32, j as u32, k as u32).round()
    };
    let selected = |label: f32| label != 0.0 && label >= lower && label <= upper;

    let mut geometry = SurfaceGeometry::default();
    let mut corner_cache: HashMap<(u32, u32, u32), u32> = HashMap::new();

    for k in extent.min.z..=extent.max.z {
        for j in extent.min.y..=extent.max.y {
            for i in extent.min.x..=extent.max.x {
                let label = label_of(i64::from(i), i64::from(j), i64::from(k));
                if !selected(label) {
                    continue;
                }
                for (offset, corners) in &FACES {
                    let neighbour = label_of(
                        i64::from(i) + offset[0],
                        i64::from(j) + offset[1],
                        i64::from(k) + offset[2],
                    );
                    if neighbour == label {
                        continue;
                    }
                    // A wall between two selected labels belongs to the
                    // higher one; emitting it from both sides would duplicate
                    // coincident geometry.
                    if selected(neighbour) && neighbour > label {
                        continue;
                    }

                    let quad: Vec<u32> = corners
                        .iter()
                        .map(|c| {
                            let key = (i + c[0], j + c[1], k + c[2]);
                            *corner_cache.entry(key).or_insert_with(|| {
                                let idx = geometry.positions.len() as u32;
                                let voxel = Vec3::new(
                                    key.0 as f32 - 0.5,
                                    key.1 as f32 - 0.5,
                                    key.2 as f32 - 0.5,
                                );
                                geometry.positions.push(volume.voxel_to_world(voxel));
                                idx
                            })
                        })
                        .collect();
                    geometry
                        .indices
                        .extend_from_slice(&[quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]]);
                }
            }
        }
    }

    geometry.recompute_normals();
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    fn labelled_volume(dims: UVec3) -> ScalarVolume {
        ScalarVolume::filled(dims, Vec3::ONE, Vec3::ZERO, 0.0).unwrap()
    }

    #[test]
    fn test_all_zero_volume_yields_empty_surface() {
        let volume = labelled_volume(UVec3::splat(4));
        let surface = extract_label_surface(&volume, 1.0, 10.0, &volume.full_extent());
        assert!(surface.is_empty());
    }

    #[test]
    fn test_single_voxel_yields_cube() {
        let mut volume = labelled_volume(UVec3::splat(3));
        volume.set_value(1, 1, 1, 4.0);
        let surface = extract_label_surface(&volume, 1.0, 10.0, &volume.full_extent());
        // 6 faces, 2 triangles each, 8 shared corners.
        assert_eq!(surface.num_triangles(), 12);
        assert_eq!(surface.positions.len(), 8);

        // The cube spans half a voxel around the node.
        let (min, max) = surface.bounding_box().unwrap();
        assert!((min - Vec3::splat(0.5)).length() < 1e-6);
        assert!((max - Vec3::splat(1.5)).length() < 1e-6);
    }

    #[test]
    fn test_adjacent_labels_share_one_wall() {
        let mut volume = labelled_volume(UVec3::new(4, 3, 3));
        volume.set_value(1, 1, 1, 2.0);
        volume.set_value(2, 1, 1, 5.0);
        let surface = extract_label_surface(&volume, 1.0, 10.0, &volume.full_extent());

        // Two cubes = 24 triangles if walls were doubled; the shared wall is
        // emitted once, so 11 faces * 2 triangles.
        assert_eq!(surface.num_triangles(), 22);

        // There is exactly one wall at the shared plane x = 1.5.
        let wall_tris = surface
            .indices
            .chunks_exact(3)
            .filter(|tri| {
                tri.iter()
                    .all(|&v| (surface.positions[v as usize].x - 1.5).abs() < 1e-6)
            })
            .count();
        assert_eq!(wall_tris, 2);
    }

    #[test]
    fn test_labels_outside_band_ignored() {
        let mut volume = labelled_volume(UVec3::splat(3));
        volume.set_value(1, 1, 1, 42.0);
        let surface = extract_label_surface(&volume, 1.0, 10.0, &volume.full_extent());
        assert!(surface.is_empty());
    }

    #[test]
    fn test_extent_crops_selection() {
        let mut volume = labelled_volume(UVec3::new(5, 3, 3));
        volume.set_value(1, 1, 1, 3.0);
        volume.set_value(3, 1, 1, 3.0);
        let extent = VolumeExtent::from_array([0, 1, 0, 2, 0, 2]);
        let surface = extract_label_surface(&volume, 1.0, 10.0, &extent);
        // Only the voxel inside the extent contributes.
        assert_eq!(surface.num_triangles(), 12);
        let (_, max) = surface.bounding_box().unwrap();
        assert!(max.x < 2.0);
    }

    #[test]
    fn test_normals_point_outward_for_single_voxel() {
        let mut volume = labelled_volume(UVec3::splat(3));
        volume.set_value(1, 1, 1, 1.0);
        let surface = extract_label_surface(&volume, 1.0, 1.0, &volume.full_extent());
        let center = Vec3::splat(1.0);
        for (p, n) in surface.positions.iter().zip(&surface.normals) {
            assert!(n.dot(*p - center) > 0.0, "normal {n:?} at {p:?} points inward");
        }
    }
}
