//! Live-wire (minimum-cost path) extraction on volume slices.
//!
//! Boundary-following in the intelligent-scissors style: a per-pixel local
//! cost derived from the inverted gradient magnitude makes strong edges cheap,
//! and Dijkstra over the 8-connected pixel graph finds the cheapest path
//! between two seed points.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec3;

use crate::error::Result;
use crate::volume::{ScalarVolume, SlicePlane, VolumeSlice};

/// Weight of the static gradient term in the local cost. The remainder is a
/// constant floor so path length still matters on flat images.
const GRADIENT_WEIGHT: f32 = 0.95;

const SQRT_2: f32 = std::f32::consts::SQRT_2;

/// Per-pixel local cost for one slice.
#[derive(Debug, Clone)]
pub struct CostMap {
    dims: [u32; 2],
    costs: Vec<f32>,
}

impl CostMap {
    /// Builds the cost map of a slice: gradient magnitude by central
    /// differences, inverted and normalized so the strongest edge costs the
    /// floor and flat regions cost 1.
    #[must_use]
    pub fn from_slice(slice: &VolumeSlice) -> Self {
        let [nu, nv] = slice.dims();
        let mut gradients = Vec::with_capacity(nu as usize * nv as usize);
        let sample = |u: i64, v: i64| -> f32 {
            let u = u.clamp(0, i64::from(nu) - 1) as u32;
            let v = v.clamp(0, i64::from(nv) - 1) as u32;
            slice.value(u, v)
        };
        let mut g_max = 0.0_f32;
        for v in 0..nv {
            for u in 0..nu {
                let (u, v) = (i64::from(u), i64::from(v));
                let gu = (sample(u + 1, v) - sample(u - 1, v)) * 0.5;
                let gv = (sample(u, v + 1) - sample(u, v - 1)) * 0.5;
                let g = (gu * gu + gv * gv).sqrt();
                g_max = g_max.max(g);
                gradients.push(g);
            }
        }

        let costs = gradients
            .into_iter()
            .map(|g| {
                if g_max > 0.0 {
                    1.0 - GRADIENT_WEIGHT * (g / g_max)
                } else {
                    1.0
                }
            })
            .collect();
        Self {
            dims: [nu, nv],
            costs,
        }
    }

    /// Returns the (u, v) pixel dimensions.
    #[must_use]
    pub fn dims(&self) -> [u32; 2] {
        self.dims
    }

    /// Returns the local cost at pixel (u, v).
    ///
    /// # Panics
    /// Panics if the pixel is out of range.
    #[must_use]
    pub fn cost(&self, u: u32, v: u32) -> f32 {
        self.costs[u as usize + v as usize * self.dims[0] as usize]
    }

    /// Finds the cheapest 8-connected pixel path between two pixels.
    /// Diagonal steps are weighted by sqrt 2. Returns start-to-end order;
    /// equal endpoints give a single-pixel path.
    #[must_use]
    pub fn shortest_path(&self, start: [u32; 2], end: [u32; 2]) -> Vec<[u32; 2]> {
        if start == end {
            return vec![start];
        }
        let nu = self.dims[0] as usize;
        let nv = self.dims[1] as usize;
        let index = |p: [u32; 2]| p[0] as usize + p[1] as usize * nu;

        let mut dist = vec![f32::INFINITY; nu * nv];
        let mut prev = vec![u32::MAX; nu * nv];
        let mut done = vec![false; nu * nv];
        let mut queue = BinaryHeap::new();
        dist[index(start)] = 0.0;
        queue.push(QueueEntry {
            cost: 0.0,
            pixel: index(start) as u32,
        });

        let target = index(end);
        while let Some(QueueEntry { cost, pixel }) = queue.pop() {
            let pixel = pixel as usize;
            if done[pixel] {
                continue;
            }
            done[pixel] = true;
            if pixel == target {
                break;
            }

            let u = (pixel % nu) as i64;
            let v = (pixel / nu) as i64;
            for dv in -1_i64..=1 {
                for du in -1_i64..=1 {
                    if du == 0 && dv == 0 {
                        continue;
                    }
                    let (qu, qv) = (u + du, v + dv);
                    if qu < 0 || qv < 0 || qu >= nu as i64 || qv >= nv as i64 {
                        continue;
                    }
                    let q = qu as usize + qv as usize * nu;
                    let step = if du != 0 && dv != 0 { SQRT_2 } else { 1.0 };
                    let next_cost = cost + self.costs[q] * step;
                    if next_cost < dist[q] {
                        dist[q] = next_cost;
                        prev[q] = pixel as u32;
                        queue.push(QueueEntry {
                            cost: next_cost,
                            pixel: q as u32,
                        });
                    }
                }
            }
        }

        let mut path = Vec::new();
        let mut at = target;
        while at != index(start) {
            path.push([(at % nu) as u32, (at / nu) as u32]);
            if prev[at] == u32::MAX {
                // Unreachable target; cannot happen on a connected grid.
                return Vec::new();
            }
            at = prev[at] as usize;
        }
        path.push(start);
        path.reverse();
        path
    }
}

/// Min-queue entry ordered by accumulated path cost.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cost: f32,
    pixel: u32,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap pops the cheapest entry first.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.pixel.cmp(&self.pixel))
    }
}

/// Computes a live-wire path across one slice of a volume.
///
/// The endpoints are world-space positions; they are projected into the slice
/// and clamped to its bounds. The returned polyline is in world space,
/// ordered from start to end. Equal endpoints (after pixel snapping) yield a
/// single point.
///
/// # Errors
/// Returns [`crate::error::VoxviewError::SliceOutOfRange`] when `slice_index`
/// exceeds the plane axis, and [`crate::error::VoxviewError::EmptyVolume`]
/// for an empty volume.
pub fn livewire_path(
    volume: &ScalarVolume,
    plane: SlicePlane,
    slice_index: u32,
    start_world: Vec3,
    end_world: Vec3,
) -> Result<Vec<Vec3>> {
    let slice = volume.slice(plane, slice_index)?;
    let cost_map = CostMap::from_slice(&slice);

    let snap = |world: Vec3| -> [u32; 2] {
        let (u, v) = slice.world_to_slice(world);
        let [nu, nv] = slice.dims();
        [
            (u.round().clamp(0.0, (nu - 1) as f32)) as u32,
            (v.round().clamp(0.0, (nv - 1) as f32)) as u32,
        ]
    };
    let start = snap(start_world);
    let end = snap(end_world);

    let pixels = cost_map.shortest_path(start, end);
    log::debug!(
        "livewire: {:?} slice {} from {:?} to {:?}: {} points",
        plane,
        slice_index,
        start,
        end,
        pixels.len()
    );
    Ok(pixels
        .into_iter()
        .map(|[u, v]| slice.slice_to_world(u as f32, v as f32))
        .collect())
}
