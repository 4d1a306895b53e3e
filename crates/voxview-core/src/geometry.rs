//! Triangle surface container and mesh post-processing.

use std::path::Path;

use glam::Vec3;

use crate::error::Result;

/// An indexed triangle surface, the populated output of the contour builders.
///
/// Positions and normals are parallel arrays; every 3 consecutive indices form
/// one triangle.
#[derive(Debug, Clone, Default)]
pub struct SurfaceGeometry {
    /// Vertex positions in world space.
    pub positions: Vec<Vec3>,
    /// Per-vertex unit normals.
    pub normals: Vec<Vec3>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl SurfaceGeometry {
    /// Returns the number of triangles.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns true if the surface has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Removes all geometry.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }

    /// Returns the axis-aligned bounding box, or None for an empty surface.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        if self.positions.is_empty() {
            return None;
        }
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for &p in &self.positions {
            min = min.min(p);
            max = max.max(p);
        }
        Some((min, max))
    }

    /// Recomputes per-vertex normals by accumulating area-weighted face
    /// normals and normalizing.
    pub fn recompute_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.positions.len(), Vec3::ZERO);
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let n = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            self.normals[a] += n;
            self.normals[b] += n;
            self.normals[c] += n;
        }
        for normal in &mut self.normals {
            let len = normal.length();
            if len > 1e-10 {
                *normal /= len;
            }
        }
    }

    /// Relaxes the surface with uniform Laplacian smoothing.
    ///
    /// Each pass moves every vertex halfway toward the centroid of its edge
    /// neighbours. Normals are recomputed afterwards. A no-op for 0 iterations
    /// or empty geometry.
    pub fn smooth(&mut self, iterations: u32) {
        if iterations == 0 || self.is_empty() {
            return;
        }

        let mut adjacency: Vec<Vec<u32>> = vec![Vec::new(); self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if !adjacency[a as usize].contains(&b) {
                    adjacency[a as usize].push(b);
                }
                if !adjacency[b as usize].contains(&a) {
                    adjacency[b as usize].push(a);
                }
            }
        }

        let mut next = self.positions.clone();
        for _ in 0..iterations {
            for (i, neighbours) in adjacency.iter().enumerate() {
                if neighbours.is_empty() {
                    continue;
                }
                let mut centroid = Vec3::ZERO;
                for &n in neighbours {
                    centroid += self.positions[n as usize];
                }
                centroid /= neighbours.len() as f32;
                next[i] = self.positions[i].lerp(centroid, 0.5);
            }
            std::mem::swap(&mut self.positions, &mut next);
        }

        self.recompute_normals();
    }

    /// Keeps only the connected component with the most triangles.
    ///
    /// Components are connected through shared vertex indices. Vertex arrays
    /// are compacted so unused vertices are dropped. A no-op when the surface
    /// is empty or already a single component.
    pub fn keep_largest_region(&mut self) {
        if self.is_empty() {
            return;
        }

        let mut forest = UnionFind::new(self.positions.len());
        for tri in self.indices.chunks_exact(3) {
            forest.union(tri[0] as usize, tri[1] as usize);
            forest.union(tri[1] as usize, tri[2] as usize);
        }

        // Count triangles per component root.
        let mut tri_counts = vec![0u32; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            tri_counts[forest.find(tri[0] as usize)] += 1;
        }
        let Some(largest_root) = tri_counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(root, _)| root)
        else {
            return;
        };
        if tri_counts[largest_root] as usize == self.num_triangles() {
            return;
        }

        // Drop triangles outside the winning component, then compact vertices.
        let kept_indices: Vec<u32> = self
            .indices
            .chunks_exact(3)
            .filter(|tri| forest.find(tri[0] as usize) == largest_root)
            .flatten()
            .copied()
            .collect();

        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::with_capacity(kept_indices.len());
        for old in kept_indices {
            if remap[old as usize] == u32::MAX {
                remap[old as usize] = positions.len() as u32;
                positions.push(self.positions[old as usize]);
                normals.push(self.normals[old as usize]);
            }
            indices.push(remap[old as usize]);
        }
        self.positions = positions;
        self.normals = normals;
        self.indices = indices;
    }

    /// Writes the surface as binary little-endian PLY with position and
    /// normal vertex properties.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write_ply(&self, path: &Path) -> Result<()> {
        use ply_rs::ply::{
            Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef,
            PropertyType, ScalarType,
        };
        use ply_rs::writer::Writer;

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = Encoding::BinaryLittleEndian;

        let mut vertex_def = ElementDef::new("vertex".to_string());
        for name in ["x", "y", "z", "nx", "ny", "nz"] {
            vertex_def.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        }
        ply.header.elements.add(vertex_def);

        let mut face_def = ElementDef::new("face".to_string());
        face_def.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::UInt),
        ));
        ply.header.elements.add(face_def);

        let mut vertices = Vec::with_capacity(self.positions.len());
        for (p, n) in self.positions.iter().zip(&self.normals) {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(p.x));
            element.insert("y".to_string(), Property::Float(p.y));
            element.insert("z".to_string(), Property::Float(p.z));
            element.insert("nx".to_string(), Property::Float(n.x));
            element.insert("ny".to_string(), Property::Float(n.y));
            element.insert("nz".to_string(), Property::Float(n.z));
            vertices.push(element);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let mut faces = Vec::with_capacity(self.num_triangles());
        for tri in self.indices.chunks_exact(3) {
            let mut element = DefaultElement::new();
            element.insert("vertex_indices".to_string(), Property::ListUInt(tri.to_vec()));
            faces.push(element);
        }
        ply.payload.insert("face".to_string(), faces);

        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        Writer::new().write_ply(&mut file, &mut ply)?;
        Ok(())
    }
}

/// Disjoint-set forest with path compression, used for region labelling.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles sharing an edge, plus one far-away triangle.
    fn two_region_surface() -> SurfaceGeometry {
        let mut geometry = SurfaceGeometry {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(11.0, 0.0, 0.0),
                Vec3::new(10.0, 1.0, 0.0),
            ],
            normals: vec![],
            indices: vec![0, 1, 2, 1, 3, 2, 4, 5, 6],
        };
        geometry.recompute_normals();
        geometry
    }

    #[test]
    fn test_keep_largest_region() {
        let mut geometry = two_region_surface();
        geometry.keep_largest_region();
        assert_eq!(geometry.num_triangles(), 2);
        assert_eq!(geometry.positions.len(), 4);
        // The far triangle is gone.
        assert!(geometry.positions.iter().all(|p| p.x < 5.0));
        assert!(geometry.indices.iter().all(|&i| (i as usize) < geometry.positions.len()));
    }

    #[test]
    fn test_keep_largest_region_single_component_untouched() {
        let mut geometry = two_region_surface();
        geometry.indices.truncate(6);
        let before = geometry.clone();
        geometry.keep_largest_region();
        assert_eq!(geometry.positions.len(), before.positions.len());
        assert_eq!(geometry.indices, before.indices);
    }

    #[test]
    fn test_smooth_preserves_invariants() {
        let mut geometry = two_region_surface();
        geometry.smooth(3);
        assert_eq!(geometry.positions.len(), geometry.normals.len());
        assert_eq!(geometry.indices.len() % 3, 0);
        for n in &geometry.normals {
            assert!((n.length() - 1.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_smooth_contracts_toward_neighbours() {
        let mut geometry = two_region_surface();
        let (min0, max0) = geometry.bounding_box().unwrap();
        geometry.smooth(5);
        let (min1, max1) = geometry.bounding_box().unwrap();
        // Laplacian smoothing shrinks each component.
        assert!(min1.x >= min0.x - 1e-6);
        assert!(max1.x <= max0.x + 1e-6);
    }

    #[test]
    fn test_smooth_zero_iterations_noop() {
        let mut geometry = two_region_surface();
        let before = geometry.positions.clone();
        geometry.smooth(0);
        assert_eq!(geometry.positions, before);
    }

    #[test]
    fn test_write_ply() {
        let geometry = two_region_surface();
        let path = std::env::temp_dir().join(format!(
            "voxview_geometry_{}_surface.ply",
            std::process::id()
        ));
        geometry.write_ply(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"ply"));
        let header = String::from_utf8_lossy(&bytes[..bytes.len().min(400)]).to_string();
        assert!(header.contains("element vertex 7"));
        assert!(header.contains("element face 3"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_clear() {
        let mut geometry = two_region_surface();
        geometry.clear();
        assert!(geometry.is_empty());
        assert!(geometry.bounding_box().is_none());
    }
}
