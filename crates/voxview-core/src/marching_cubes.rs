//! Iso-surface extraction from a thresholded volume.
//!
//! The volume is binarized against a threshold band and the 0.5-level surface
//! of the binary field is extracted with marching cubes (classic 256-entry
//! configuration table, ported from the public-domain `MarchingCubeCpp`
//! tables). Shared edge vertices are reused through a two-slab cache so the
//! output is watertight over interior cells.

#![allow(
    clippy::unreadable_literal,
    clippy::too_many_lines,
    clippy::too_many_arguments,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use glam::Vec3;

use crate::geometry::SurfaceGeometry;
use crate::volume::{ScalarVolume, VolumeExtent};

/// Extracts the surface bounding the region where the volume value lies in
/// `[lower, upper]`, restricted to `extent`.
///
/// Output vertices are in world space: binarized-grid vertices are offset by
/// the extent origin and mapped through the volume's spacing and origin.
/// Degenerate extents (fewer than 2 nodes along any axis after clamping to
/// the volume) yield empty geometry.
#[must_use]
pub fn extract_threshold_surface(
    volume: &ScalarVolume,
    lower: f32,
    upper: f32,
    extent: &VolumeExtent,
) -> SurfaceGeometry {
    if volume.is_empty() {
        return SurfaceGeometry::default();
    }
    let extent = extent.clamped_to(volume);
    let dims = extent.node_dims();
    if dims.x < 2 || dims.y < 2 || dims.z < 2 {
        return SurfaceGeometry::default();
    }

    // Signed binary field: negative inside the band, positive outside. The
    // extracted surface then sits at the midpoint of every crossing edge.
    let mut field = Vec::with_capacity(dims.x as usize * dims.y as usize * dims.z as usize);
    for k in 0..dims.z {
        for j in 0..dims.y {
            for i in 0..dims.x {
                let v = volume.value(extent.min.x + i, extent.min.y + j, extent.min.z + k);
                field.push(if v >= lower && v <= upper { -0.5 } else { 0.5 });
            }
        }
    }

    let mut extractor = Extractor {
        size: [dims.x, dims.y, dims.z],
        field: &field,
        slab: vec![[0; 3]; dims.x as usize * dims.y as usize * 2],
        geometry: SurfaceGeometry::default(),
    };
    extractor.run();
    let mut geometry = extractor.geometry;

    let offset = extent.min.as_vec3();
    for p in &mut geometry.positions {
        *p = volume.voxel_to_world(*p + offset);
    }
    geometry.recompute_normals();
    geometry
}

/// Marching-cubes driver over a signed scalar field in x-fastest layout.
///
/// Edge vertices are cached per axis in a two-slab ring (indexed by `z % 2`)
/// so each crossing edge produces exactly one vertex.
struct Extractor<'a> {
    size: [u32; 3],
    field: &'a [f32],
    slab: Vec<[u32; 3]>,
    geometry: SurfaceGeometry,
}

impl Extractor<'_> {
    #[inline]
    fn node_index(&self, i: u32, j: u32, k: u32) -> usize {
        i as usize
            + j as usize * self.size[0] as usize
            + k as usize * self.size[0] as usize * self.size[1] as usize
    }

    #[inline]
    fn slab_index(&self, i: u32, j: u32, k: u32) -> usize {
        self.size[0] as usize * self.size[1] as usize * (k as usize % 2)
            + j as usize * self.size[0] as usize
            + i as usize
    }

    /// Emits the interpolated vertex for a crossing edge starting at
    /// (x, y, z) along `axis`, caching its index in the slab ring.
    #[inline]
    fn edge_vertex(&mut self, va: f32, vb: f32, axis: usize, x: u32, y: u32, z: u32) {
        if (va < 0.0) == (vb < 0.0) {
            return;
        }
        let mut v = Vec3::new(x as f32, y as f32, z as f32);
        v[axis] += va / (va - vb);
        let idx = self.geometry.positions.len() as u32;
        let slab_idx = self.slab_index(x, y, z);
        self.slab[slab_idx][axis] = idx;
        self.geometry.positions.push(v);
    }

    fn run(&mut self) {
        let [nx, ny, nz] = self.size;
        let mut vs = [0.0_f32; 8];
        let mut edge_indices = [0_u32; 12];

        for z in 0..nz - 1 {
            for y in 0..ny - 1 {
                for x in 0..nx - 1 {
                    vs[0] = self.field[self.node_index(x, y, z)];
                    vs[1] = self.field[self.node_index(x + 1, y, z)];
                    vs[2] = self.field[self.node_index(x, y + 1, z)];
                    vs[3] = self.field[self.node_index(x + 1, y + 1, z)];
                    vs[4] = self.field[self.node_index(x, y, z + 1)];
                    vs[5] = self.field[self.node_index(x + 1, y, z + 1)];
                    vs[6] = self.field[self.node_index(x, y + 1, z + 1)];
                    vs[7] = self.field[self.node_index(x + 1, y + 1, z + 1)];

                    let config_n = (i32::from(vs[0] < 0.0))
                        | (i32::from(vs[1] < 0.0) << 1)
                        | (i32::from(vs[2] < 0.0) << 2)
                        | (i32::from(vs[3] < 0.0) << 3)
                        | (i32::from(vs[4] < 0.0) << 4)
                        | (i32::from(vs[5] < 0.0) << 5)
                        | (i32::from(vs[6] < 0.0) << 6)
                        | (i32::from(vs[7] < 0.0) << 7);

                    if config_n == 0 || config_n == 255 {
                        continue;
                    }

                    // X-axis edges. Interior edges were already emitted by the
                    // preceding cell; only boundary edges are new.
                    if y == 0 && z == 0 {
                        self.edge_vertex(vs[0], vs[1], 0, x, y, z);
                    }
                    if z == 0 {
                        self.edge_vertex(vs[2], vs[3], 0, x, y + 1, z);
                    }
                    if y == 0 {
                        self.edge_vertex(vs[4], vs[5], 0, x, y, z + 1);
                    }
                    self.edge_vertex(vs[6], vs[7], 0, x, y + 1, z + 1);

                    // Y-axis edges.
                    if x == 0 && z == 0 {
                        self.edge_vertex(vs[0], vs[2], 1, x, y, z);
                    }
                    if z == 0 {
                        self.edge_vertex(vs[1], vs[3], 1, x + 1, y, z);
                    }
                    if x == 0 {
                        self.edge_vertex(vs[4], vs[6], 1, x, y, z + 1);
                    }
                    self.edge_vertex(vs[5], vs[7], 1, x + 1, y, z + 1);

                    // Z-axis edges.
                    if x == 0 && y == 0 {
                        self.edge_vertex(vs[0], vs[4], 2, x, y, z);
                    }
                    if y == 0 {
                        self.edge_vertex(vs[1], vs[5], 2, x + 1, y, z);
                    }
                    if x == 0 {
                        self.edge_vertex(vs[2], vs[6], 2, x, y + 1, z);
                    }
                    self.edge_vertex(vs[3], vs[7], 2, x + 1, y + 1, z);

                    edge_indices[0] = self.slab[self.slab_index(x, y, z)][0];
                    edge_indices[1] = self.slab[self.slab_index(x, y + 1, z)][0];
                    edge_indices[2] = self.slab[self.slab_index(x, y, z + 1)][0];
                    edge_indices[3] = self.slab[self.slab_index(x, y + 1, z + 1)][0];
                    edge_indices[4] = self.slab[self.slab_index(x, y, z)][1];
                    edge_indices[5] = self.slab[self.slab_index(x + 1, y, z)][1];
                    edge_indices[6] = self.slab[self.slab_index(x, y, z + 1)][1];
                    edge_indices[7] = self.slab[self.slab_index(x + 1, y, z + 1)][1];
                    edge_indices[8] = self.slab[self.slab_index(x, y, z)][2];
                    edge_indices[9] = self.slab[self.slab_index(x + 1, y, z)][2];
                    edge_indices[10] = self.slab[self.slab_index(x, y + 1, z)][2];
                    edge_indices[11] = self.slab[self.slab_index(x + 1, y + 1, z)][2];

                    let config = MC_TRIS[config_n as usize];
                    let n_indices = (config & 0xF) as usize * 3;
                    let mut offset = 4;
                    for _ in 0..n_indices {
                        let edge = ((config >> offset) & 0xF) as usize;
                        self.geometry.indices.push(edge_indices[edge]);
                        offset += 4;
                    }
                }
            }
        }
    }
}

/// Triangle configuration look-up table (256 entries, one per cube
/// configuration).
///
/// Each entry is a `u64` encoding:
/// - Bits `[3:0]`: number of triangles (0-5)
/// - Bits `[7:4]`, `[11:8]`, ...: edge indices (0-11) for each triangle
///   vertex, 4 bits each
///
/// Ported from `MarchingCubeCpp` (public domain).
#[rustfmt::skip]
static MC_TRIS: [u64; 256] = [
    0, 33793, 36945, 159668546,
    18961, 144771090, 5851666, 595283255635,
    20913, 67640146, 193993474, 655980856339,
    88782242, 736732689667, 797430812739, 194554754,
    26657, 104867330, 136709522, 298069416227,
    109224258, 8877909667, 318136408323, 1567994331701604,
    189884450, 350847647843, 559958167731, 3256298596865604,
    447393122899, 651646838401572, 2538311371089956, 737032694307,
    29329, 43484162, 91358498, 374810899075,
    158485010, 178117478419, 88675058979, 433581536604804,
    158486962, 649105605635, 4866906995, 3220959471609924,
    649165714851, 3184943915608436, 570691368417972, 595804498035,
    124295042, 431498018963, 508238522371, 91518530,
    318240155763, 291789778348404, 1830001131721892, 375363605923,
    777781811075, 1136111028516116, 3097834205243396, 508001629971,
    2663607373704004, 680242583802939237, 333380770766129845, 179746658,
    42545, 138437538, 93365810, 713842853011,
    73602098, 69575510115, 23964357683, 868078761575828,
    28681778, 713778574611, 250912709379, 2323825233181284,
    302080811955, 3184439127991172, 1694042660682596, 796909779811,
    176306722, 150327278147, 619854856867, 1005252473234484,
    211025400963, 36712706, 360743481544788, 150627258963,
    117482600995, 1024968212107700, 2535169275963444, 4734473194086550421,
    628107696687956, 9399128243, 5198438490361643573, 194220594,
    104474994, 566996932387, 427920028243, 2014821863433780,
    492093858627, 147361150235284, 2005882975110676, 9671606099636618005,
    777701008947, 3185463219618820, 482784926917540, 2900953068249785909,
    1754182023747364, 4274848857537943333, 13198752741767688709, 2015093490989156,
    591272318771, 2659758091419812, 1531044293118596, 298306479155,
    408509245114388, 210504348563, 9248164405801223541, 91321106,
    2660352816454484, 680170263324308757, 8333659837799955077, 482966828984116,
    4274926723105633605, 3184439197724820, 192104450, 15217,
    45937, 129205250, 129208402, 529245952323,
    169097138, 770695537027, 382310500883, 2838550742137652,
    122763026, 277045793139, 81608128403, 1991870397907988,
    362778151475, 2059003085103236, 2132572377842852, 655681091891,
    58419234, 239280858627, 529092143139, 1568257451898804,
    447235128115, 679678845236084, 2167161349491220, 1554184567314086709,
    165479003923, 1428768988226596, 977710670185060, 10550024711307499077,
    1305410032576132, 11779770265620358997, 333446212255967269, 978168444447012,
    162736434, 35596216627, 138295313843, 891861543990356,
    692616541075, 3151866750863876, 100103641866564, 6572336607016932133,
    215036012883, 726936420696196, 52433666, 82160664963,
    2588613720361524, 5802089162353039525, 214799000387, 144876322,
    668013605731, 110616894681956, 1601657732871812, 430945547955,
    3156382366321172, 7644494644932993285, 3928124806469601813, 3155990846772900,
    339991010498708, 10743689387941597493, 5103845475, 105070898,
    3928064910068824213, 156265010, 1305138421793636, 27185,
    195459938, 567044449971, 382447549283, 2175279159592324,
    443529919251, 195059004769796, 2165424908404116, 1554158691063110021,
    504228368803, 1436350466655236, 27584723588724, 1900945754488837749,
    122971970, 443829749251, 302601798803, 108558722,
    724700725875, 43570095105972, 2295263717447940, 2860446751369014181,
    2165106202149444, 69275726195, 2860543885641537797, 2165106320445780,
    2280890014640004, 11820349930268368933, 8721082628082003989, 127050770,
    503707084675, 122834978, 2538193642857604, 10129,
    801441490467, 2923200302876740, 1443359556281892, 2901063790822564949,
    2728339631923524, 7103874718248233397, 12775311047932294245, 95520290,
    2623783208098404, 1900908618382410757, 137742672547, 2323440239468964,
    362478212387, 727199575803140, 73425410, 34337,
    163101314, 668566030659, 801204361987, 73030562,
    591509145619, 162574594, 100608342969108, 5553,
    724147968595, 1436604830452292, 176259090, 42001,
    143955266, 2385, 18433, 0,
];
